use crate::analysis;
use crate::error::{Error, Result};
use crate::is_builtin;
use crate::model::*;

/// Checks a resolved grammar: every identifier names a definition or a
/// built-in rule, and no choice or class is empty.
pub fn validate(grammar: &Grammar) -> Result<()> {
    if let Some(import) = grammar.imports().first() {
        return Err(Error::UnassembledImport {
            path: import.path().to_string(),
            span: import.span(),
        });
    }

    for def in grammar.definitions() {
        let usage = analysis::usage(def.expr());

        for reference in usage.references {
            if grammar.definition(&reference.name).is_none() && !is_builtin(&reference.name) {
                return Err(Error::UnresolvedIdentifier {
                    name: reference.name,
                    span: reference.span,
                });
            }
        }

        if let Some(&span) = usage.empty_choices.first() {
            return Err(Error::EmptyChoice { span });
        }
    }

    Ok(())
}
