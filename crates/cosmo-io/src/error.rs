use cosmo_core::CoreError;
use thiserror::Error;

/// Errors from the YAML engine and the format registry.
///
/// Failures coming from the mapping transform, unit resolution or the YAML
/// parser pass through unchanged.
#[derive(Debug, Error)]
pub enum IoError {
    /// A document tag with no constructor bound to it.
    #[error("no constructor registered for tag '{0}'")]
    UnknownTag(String),

    /// The tag is already bound under the `reject` policy.
    #[error("tag '{0}' is already registered")]
    DuplicateTag(String),

    /// Tags must be a `!` followed by a non-empty name.
    #[error("invalid tag '{0}'")]
    InvalidTag(String),

    /// The cosmology's class has no representer bound to it.
    #[error("no representer registered for class '{0}'")]
    NoRepresenter(String),

    /// A node has the wrong shape for its tag, e.g. a sequence body.
    #[error("malformed node: {0}")]
    MalformedNode(String),

    /// No reader, writer or identifier for the key.
    #[error("no {direction} registered for format '{format}' and family '{family}'")]
    UnknownFormat {
        /// `reader`, `writer` or `identifier`.
        direction: &'static str,
        /// Requested format name.
        format: String,
        /// Object family, e.g. `Cosmology`.
        family: String,
    },

    /// The key is already taken under the `reject` policy.
    #[error("{direction} for format '{format}' and family '{family}' is already registered")]
    DuplicateFormat {
        /// `reader`, `writer` or `identifier`.
        direction: &'static str,
        /// Format name being registered.
        format: String,
        /// Object family being registered.
        family: String,
    },

    /// Reading without a format and no identifier accepted the input.
    #[error("could not identify a format for the input")]
    NoFormatIdentified,

    /// Reading without a format and more than one identifier accepted the input.
    #[error("input matches several formats: {}", .0.join(", "))]
    AmbiguousFormat(Vec<String>),

    /// The payload variant does not fit the format.
    #[error("format '{format}' expects {expected} input")]
    PayloadMismatch {
        /// Format that rejected the payload.
        format: String,
        /// Payload kind the format accepts, e.g. `text`.
        expected: &'static str,
    },

    /// Mapping transform or unit failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// YAML parse or emit failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl IoError {
    /// True for the unknown-subtype family: unregistered tags and classes.
    pub fn is_unknown_subtype(&self) -> bool {
        matches!(
            self,
            Self::UnknownTag(_) | Self::Core(CoreError::UnknownClass(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_ambiguous_format() {
        let e = IoError::AmbiguousFormat(vec!["mapping".into(), "yaml".into()]);
        assert_eq!(e.to_string(), "input matches several formats: mapping, yaml");
    }

    #[test]
    fn display_core_error_is_unchanged() {
        let inner = CoreError::UnknownClass("Nonexistent".into());
        let expected = inner.to_string();
        assert_eq!(IoError::from(inner).to_string(), expected);
    }

    #[test]
    fn unknown_subtype_family() {
        assert!(IoError::UnknownTag("!x.Y".into()).is_unknown_subtype());
        assert!(IoError::Core(CoreError::UnknownClass("Y".into())).is_unknown_subtype());
        assert!(!IoError::NoFormatIdentified.is_unknown_subtype());
    }
}
