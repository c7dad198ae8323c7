use cosmo_units::UnitError;
use thiserror::Error;

/// Errors building a cosmology or converting it from a mapping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The named class is not in the registry.
    #[error("unknown cosmology class '{0}'")]
    UnknownClass(String),

    /// Neither the mapping nor the caller named a class.
    #[error("no cosmology class given: mapping has no 'cosmology' key and none was passed")]
    MissingClass,

    /// A required parameter has no value and no default.
    #[error("{class}: missing required parameter '{field}'")]
    MissingField {
        /// Class being built.
        class: String,
        /// Parameter name.
        field: String,
    },

    /// A key that is neither a parameter, `name` nor `meta`.
    #[error("{class}: unexpected argument '{field}'")]
    UnexpectedField {
        /// Class being built.
        class: String,
        /// Offending key.
        field: String,
    },

    /// The short name is already held by a class.
    #[error("cosmology class '{0}' is already registered")]
    DuplicateClass(String),

    /// A value of the wrong kind, or a `meta` that is not a mapping.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Parameter or key name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Unit parse, resolution or conversion failure.
    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl CoreError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
