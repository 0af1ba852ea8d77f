use thiserror::Error;

use crate::value::Span;

pub type Result<T> = std::result::Result<T, Error>;

/// A failed match. Spans are zero-width at the failure point, except for
/// labeled failures which cover the attempt that was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unexpected end of input at {span}, expected {expected}")]
    EndOfInput { expected: String, span: Span },

    #[error("expected {expected} at {span}, found {found:?}")]
    Mismatch {
        expected: String,
        found: char,
        span: Span,
    },

    #[error("{message} at {span}")]
    Predicate { message: String, span: Span },

    #[error("{label} at {span}{}", .rule.as_ref().map(|r| format!(" in rule {r}")).unwrap_or_default())]
    Labeled {
        label: String,
        rule: Option<String>,
        span: Span,
    },
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::EndOfInput { span, .. }
            | Error::Mismatch { span, .. }
            | Error::Predicate { span, .. }
            | Error::Labeled { span, .. } => *span,
        }
    }

    /// Offset where matching gave up.
    pub fn position(&self) -> usize {
        self.span().end
    }

    /// What the parser was looking for: the expectation of a primitive, or
    /// the label of a labeled failure.
    pub fn expected(&self) -> Option<&str> {
        match self {
            Error::EndOfInput { expected, .. } | Error::Mismatch { expected, .. } => Some(expected),
            Error::Labeled { label, .. } => Some(label),
            Error::Predicate { .. } => None,
        }
    }

    pub fn is_labeled(&self) -> bool {
        matches!(self, Error::Labeled { .. })
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Error::Labeled { label, .. } => Some(label),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_display_names_rule() {
        let err = Error::Labeled {
            label: "missing_b".into(),
            rule: Some("S".into()),
            span: Span::new(1, 2),
        };
        assert_eq!(err.to_string(), "missing_b at 1..2 in rule S");
        assert_eq!(err.expected(), Some("missing_b"));
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_mismatch_display() {
        let err = Error::Mismatch {
            expected: "'b'".into(),
            found: 'c',
            span: Span::at(1),
        };
        assert_eq!(err.to_string(), "expected 'b' at 1..1, found 'c'");
        assert!(!err.is_labeled());
    }
}
