use std::path::PathBuf;

use thiserror::Error;

use crate::model::Span;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between grammar text and generated code.
#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    #[error("duplicate definition of `{name}` at {second} (first defined at {first})")]
    DuplicateDefinition {
        name: String,
        first: Span,
        second: Span,
    },

    #[error("unresolved identifier `{name}` at {span}")]
    UnresolvedIdentifier { name: String, span: Span },

    #[error("`{name}` is not defined in \"{path}\" (imported at {span})")]
    MissingImport {
        name: String,
        path: String,
        span: Span,
    },

    #[error("conflicting definitions of `{name}` from {first_origin} and {second_origin}")]
    ConflictingDefinition {
        name: String,
        first_origin: String,
        second_origin: String,
        span: Span,
    },

    #[error("import cycle: {}", .chain.join(" -> "))]
    ImportCycle { chain: Vec<String> },

    #[error("cannot resolve import \"{path}\": {reason}")]
    ImportNotFound { path: String, reason: String },

    #[error("failed to read grammar file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("choice without alternatives at {span}")]
    EmptyChoice { span: Span },

    #[error("import of \"{path}\" at {span} must be assembled before generation")]
    UnassembledImport { path: String, span: Span },

    #[error("invalid value {value:?} for option `{option}`")]
    InvalidOption { option: &'static str, value: String },
}

impl Error {
    /// Location in the grammar text this error points at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Syntax { span, .. }
            | Error::UnresolvedIdentifier { span, .. }
            | Error::MissingImport { span, .. }
            | Error::ConflictingDefinition { span, .. }
            | Error::EmptyChoice { span }
            | Error::UnassembledImport { span, .. } => Some(*span),
            Error::DuplicateDefinition { second, .. } => Some(*second),
            Error::ImportCycle { .. }
            | Error::ImportNotFound { .. }
            | Error::Io { .. }
            | Error::InvalidOption { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = Error::ImportCycle {
            chain: vec!["a.peg".into(), "b.peg".into(), "a.peg".into()],
        };
        assert_eq!(err.to_string(), "import cycle: a.peg -> b.peg -> a.peg");
        assert!(err.span().is_none());
    }

    #[test]
    fn test_duplicate_points_at_second_definition() {
        let err = Error::DuplicateDefinition {
            name: "S".into(),
            first: Span::new(0, 8),
            second: Span::new(9, 17),
        };
        assert_eq!(err.span(), Some(Span::new(9, 17)));
        assert!(err.to_string().contains("`S`"));
    }
}
