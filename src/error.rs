use thiserror::Error;

/// Problems the engine notices and absorbs. None of these abort a frame;
/// callers that want to surface them get the value back from the fallible
/// helpers, the engine itself only logs them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown physics mode `{0}`")]
    UnknownMode(String),

    #[error("unknown boundary behavior `{0}`")]
    UnknownBoundary(String),

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("value {value} for `{param}` outside {min}..={max}")]
    ValueOutOfRange {
        param: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("non-finite value for `{0}`")]
    NonFiniteValue(&'static str),

    #[error("expected {expected} audio bands, got {got}")]
    BandCount { expected: usize, got: usize },

    #[error("report i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("report json: {0}")]
    Json(#[from] serde_json::Error),
}
