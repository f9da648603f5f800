use std::fmt;

use thiserror::Error;

/// A single field that could not be extracted from an input line
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("missing field {0}")]
    Missing(&'static str),

    #[error("cannot parse {field}: {source}")]
    InvalidUuid {
        field: &'static str,
        #[source]
        source: uuid::Error,
    },

    #[error("cannot parse date: {0}")]
    InvalidDate(#[from] chrono::ParseError),

    #[error("cannot parse {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("malformed record: {0}")]
    Record(#[from] csv::Error),
}

/// A field failure tagged with the row it came from (the header is row 0)
#[derive(Error, Debug)]
#[error("[{row}] {kind}")]
pub struct RowError {
    pub row: usize,
    pub kind: FieldError,
}

/// Every row failure collected by a parallel scan, ordered by row
#[derive(Debug, Default)]
pub struct RowErrors(pub Vec<RowError>);

impl RowErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> Vec<usize> {
        self.0.iter().map(|e| e.row).collect()
    }
}

impl fmt::Display for RowErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} malformed row(s)", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Errors that can abort a pipeline run
/// None of them are recoverable: the batch either completes or fails as a whole
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(#[from] RowError),

    #[error("parse error: {0}")]
    Rows(RowErrors),

    /// Not raised yet; kept for stricter join validation
    #[error("join integrity violation: {0}")]
    JoinIntegrity(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
