use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

pub const USERS_FILE: &str = "users.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const ROLLING_OUTPUT_FILE: &str = "want.csv";

const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Report ordering by sum_amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn is_descending(self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// Width and granularity of the line fan-out used by the roster and transaction scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum number of chunks processed concurrently
    pub workers: usize,
    /// Lines handed to a single task
    pub chunk_size: usize,
}

impl ScanOptions {
    pub fn new(workers: usize, chunk_size: usize) -> Self {
        Self {
            workers: workers.max(1),
            chunk_size: chunk_size.max(1),
        }
    }

    /// One worker, one line per chunk: rows are handled strictly in order
    pub fn sequential() -> Self {
        Self::new(1, 1)
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(workers, DEFAULT_CHUNK_SIZE)
    }
}

/// Run configuration resolved from the environment
///
/// | variable     | required | meaning                                   |
/// |--------------|----------|-------------------------------------------|
/// | `BASE_DIR`   | yes      | directory holding the input/output files  |
/// | `WORKERS`    | no       | fan-out width, defaults to the core count |
/// | `CHUNK_SIZE` | no       | lines per task, defaults to 1024          |
/// | `SORT_ORDER` | no       | `desc` (default) or `asc`                 |
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub scan: ScanOptions,
    pub sort_order: SortOrder,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup
    ///
    /// ```
    /// use category_report::config::Config;
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "BASE_DIR" => Some("/data/".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.users_path(), std::path::Path::new("/data/users.csv"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = lookup("BASE_DIR")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                PipelineError::Config("BASE_DIR env variable must be specified".to_string())
            })?;

        let defaults = ScanOptions::default();
        let workers = parse_optional(&lookup, "WORKERS")?.unwrap_or(defaults.workers);
        let chunk_size = parse_optional(&lookup, "CHUNK_SIZE")?.unwrap_or(defaults.chunk_size);

        let sort_order = match lookup("SORT_ORDER").as_deref().map(str::trim) {
            None | Some("") => SortOrder::Descending,
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Descending,
            Some(v) if v.eq_ignore_ascii_case("asc") => SortOrder::Ascending,
            Some(other) => {
                return Err(PipelineError::Config(format!(
                    "SORT_ORDER must be 'asc' or 'desc', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            base_dir: normalize_base_dir(&base_dir),
            scan: ScanOptions::new(workers, chunk_size),
            sort_order,
        })
    }

    pub fn users_path(&self) -> PathBuf {
        self.base_dir.join(USERS_FILE)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.base_dir.join(TRANSACTIONS_FILE)
    }

    pub fn rolling_output_path(&self) -> PathBuf {
        self.base_dir.join(ROLLING_OUTPUT_FILE)
    }
}

/// Strip a single trailing separator, keeping a bare root intact
fn normalize_base_dir(raw: &str) -> PathBuf {
    let trimmed = match raw.strip_suffix(std::path::MAIN_SEPARATOR) {
        Some(rest) if !rest.is_empty() => rest,
        _ => raw,
    };
    Path::new(trimmed).to_path_buf()
}

fn parse_optional<F>(lookup: &F, key: &str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => v.trim().parse::<usize>().map(Some).map_err(|e| {
            PipelineError::Config(format!("{} must be a positive integer: {}", key, e))
        }),
    }
}
