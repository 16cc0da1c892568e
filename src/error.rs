use thiserror::Error;

#[derive(Debug, Error)]
pub enum SodError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("field `{field}` length mismatch: base has {base} points, target has {target}")]
    ShapeMismatch {
        field: &'static str,
        base: usize,
        target: usize,
    },

    #[error("star pressure iteration did not converge after {0} iterations")]
    NoConvergence(usize),

    #[error("initial states generate vacuum (pressure positivity condition violated)")]
    Vacuum,

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, SodError>;
