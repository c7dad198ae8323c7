use thiserror::Error;

/// Failures while parsing, resolving or converting units.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The unit expression could not be parsed.
    #[error("cannot parse unit '{input}': {reason}")]
    Parse {
        /// Expression as given.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A unit symbol is not known to the active registry or scope.
    #[error("'{0}' did not parse as a known unit")]
    UnknownUnit(String),

    /// Two units have different physical dimensions.
    #[error("'{from}' and '{to}' are not convertible")]
    Incompatible {
        /// Source unit.
        from: String,
        /// Target unit.
        to: String,
    },

    /// A unit power or dimension exponent is out of range, e.g. `m256`.
    #[error("exponent out of range in '{0}'")]
    ExponentOverflow(String),

    /// A serialized quantity does not have the `{value, unit}` shape.
    #[error("malformed quantity: {0}")]
    MalformedQuantity(String),
}

impl UnitError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_unit() {
        let e = UnitError::UnknownUnit("parsec_typo".into());
        assert_eq!(e.to_string(), "'parsec_typo' did not parse as a known unit");
    }

    #[test]
    fn display_incompatible() {
        let e = UnitError::Incompatible {
            from: "K".into(),
            to: "eV".into(),
        };
        assert_eq!(e.to_string(), "'K' and 'eV' are not convertible");
    }
}
