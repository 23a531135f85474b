use thiserror::Error;

/// Failures while loading the serialized artifacts at process start.
/// Any of these puts the server into degraded mode: the form is never
/// rendered and every route shows the files-not-found page.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid pipeline artifact")]
    BadPipeline {
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid reference dataset")]
    BadDataset {
        #[source]
        source: serde_json::Error,
    },
    #[error("pipeline probe failed")]
    Probe(#[source] PredictError),
}

/// Anything that can go wrong between raw request fields and a price.
/// All of these are recovered at the /predict boundary and shown to the
/// user as one generic message; the request is discarded.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("bad resolution string {0:?}: expected WxH with positive integers")]
    BadResolution(String),
    #[error("row has {got} columns, pipeline expects {expected}")]
    ColumnMismatch { got: usize, expected: usize },
    #[error("column {column} got a value of the wrong kind")]
    CellKind { column: String },
    #[error("unseen {column} value {value:?}")]
    UnseenCategory { column: String, value: String },
    #[error("encoded {got} features, pipeline has {expected} coefficients")]
    WidthMismatch { got: usize, expected: usize },
}
