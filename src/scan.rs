use std::future::Future;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ScanOptions;
use crate::error::{FieldError, PipelineError, Result, RowError, RowErrors};

/// Summary of a completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Data rows handed to the handler (header and blank lines excluded)
    pub rows: usize,
}

/// Bounded fan-out over the data lines of a headered, line-oriented stream
///
/// Lines are grouped in chunks of `options.chunk_size`; each chunk runs as its
/// own task and at most `options.workers` chunks are in flight. The handler is
/// called with the row index (header is row 0) and the owned line. Invalid UTF-8
/// reaches the handler as U+FFFD, so only a row whose needed fields are damaged
/// fails, and it fails tagged with its row.
///
/// The first failing row raises an abort flag: chunks not yet started are never
/// spawned and running chunks stop at their next line. Every error produced
/// before the stop is returned together in [`PipelineError::Rows`].
pub async fn fan_out_lines<R, F, Fut>(
    reader: R,
    options: ScanOptions,
    handler: F,
) -> Result<ScanStats>
where
    R: BufRead,
    F: Fn(usize, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), FieldError>> + Send + 'static,
{
    let handler = Arc::new(handler);
    let abort = Arc::new(AtomicBool::new(false));
    let permits = Arc::new(Semaphore::new(options.workers));

    let mut handles = Vec::new();
    let mut chunk: Vec<(usize, String)> = Vec::with_capacity(options.chunk_size);
    let mut stats = ScanStats::default();

    for line in numbered_lines(reader) {
        let (row, line) = line?;
        if row == 0 || line.trim().is_empty() {
            continue;
        }
        if abort.load(Ordering::Acquire) {
            break;
        }

        stats.rows += 1;
        chunk.push((row, line));

        if chunk.len() >= options.chunk_size {
            let batch = std::mem::replace(&mut chunk, Vec::with_capacity(options.chunk_size));
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))?;
            handles.push(tokio::spawn(run_chunk(
                batch,
                handler.clone(),
                abort.clone(),
                permit,
            )));
        }
    }

    if !chunk.is_empty() && !abort.load(Ordering::Acquire) {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))?;
        handles.push(tokio::spawn(run_chunk(chunk, handler.clone(), abort.clone(), permit)));
    }

    debug!(tasks = handles.len(), rows = stats.rows, "waiting for scan workers");

    let mut errors = Vec::new();
    for joined in futures::future::join_all(handles).await {
        let chunk_errors = joined.map_err(|e| PipelineError::Worker(e.to_string()))?;
        errors.extend(chunk_errors);
    }

    if errors.is_empty() {
        Ok(stats)
    } else {
        errors.sort_by_key(|e| e.row);
        Err(PipelineError::Rows(RowErrors(errors)))
    }
}

/// Every line of a stream paired with its row index, the first line being row 0
///
/// Lines are split on `\n` as raw bytes and a trailing `\r` is dropped. Bytes
/// that are not UTF-8 are replaced rather than failing the whole stream.
pub fn numbered_lines<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = io::Result<(usize, String)>> {
    reader
        .split(b'\n')
        .enumerate()
        .map(|(row, bytes)| bytes.map(|bytes| (row, decode_line(bytes))))
}

fn decode_line(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

async fn run_chunk<F, Fut>(
    chunk: Vec<(usize, String)>,
    handler: Arc<F>,
    abort: Arc<AtomicBool>,
    _permit: tokio::sync::OwnedSemaphorePermit,
) -> Vec<RowError>
where
    F: Fn(usize, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), FieldError>> + Send + 'static,
{
    let mut errors = Vec::new();
    for (row, line) in chunk {
        if abort.load(Ordering::Acquire) {
            break;
        }
        if let Err(kind) = handler(row, line).await {
            abort.store(true, Ordering::Release);
            errors.push(RowError { row, kind });
        }
    }
    errors
}
