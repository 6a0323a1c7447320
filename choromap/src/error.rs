use std::path::PathBuf;
use thiserror::Error;

/// Input checks that run before any file is read or written
#[derive(Debug, Error)]
pub enum PreconditionError {
    /// A string argument (path, column name, label) was empty
    #[error("argument '{0}' must not be empty")]
    EmptyArgument(&'static str),

    /// The value mapping has no entries
    #[error("value mapping must not be empty")]
    EmptyValueMapping,

    /// The mapping source is not a key/value object
    #[error("value mapping must be a key/value object, got {0}")]
    InvalidValueMapping(String),

    /// A mapping value could not be read as a number
    #[error("value for key '{key}' is not numeric: {found}")]
    NonNumericValue { key: String, found: String },

    /// A mapping value is NaN or infinite
    #[error("value for key '{key}' is not a finite number: {value}")]
    NonFiniteValue { key: String, value: f64 },

    /// The same key appears twice in a mapping source
    #[error("duplicate key '{0}' in value mapping")]
    DuplicateKey(String),

    /// The geometry input file does not exist
    #[error("input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Render configuration is out of range
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),
}

/// Errors returned by a render call
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// A feature has no attribute with the join column name
    #[error("feature {feature_index} has no '{column}' attribute to join on")]
    JoinKeyNotFound { column: String, feature_index: usize },

    /// A feature is missing an attribute and the overlay policy is `fail`
    #[error("feature {feature_index} is missing a value for '{column}'")]
    MissingAttribute { column: String, feature_index: usize },

    /// A configured tooltip field is not a column of the overlay data
    #[error("tooltip field '{0}' is not available in the overlay data")]
    UnknownTooltipField(String),

    /// Anything surfaced by the geometry, projection or filesystem stack
    #[error(transparent)]
    Library(#[from] anyhow::Error),
}

impl RenderError {
    /// True for errors raised by the up-front input checks
    pub fn is_precondition(&self) -> bool {
        matches!(self, RenderError::Precondition(_))
    }
}

/// Type alias for Results using RenderError
pub type Result<T> = std::result::Result<T, RenderError>;
