use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] gmdb_core::StoreError),

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("report window of {0} days reaches before the start of the calendar")]
    WindowOutOfRange(u32),
}
