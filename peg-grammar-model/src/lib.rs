//! # peg-grammar-model
//!
//! Shared logic for parsing, assembling, validating and compiling PEG grammars.
//! Used by the `peg!` procedural macro and by the file-based `Generator`.
//!
//! ## Pipeline
//!
//! 1. **[parser]**: Parse grammar text into an [`AstNode`](model::AstNode) tree.
//! 2. **[assembler]**: Merge imported grammars into one resolved [`Grammar`].
//! 3. **[validator]**: Check that every reference resolves.
//! 4. **[codegen]**: Walk the resolved grammar and emit a parser for a target.

pub mod analysis;
pub mod assembler;
pub mod codegen;
pub mod error;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod validator;

pub use assembler::Assembler;
pub use codegen::{generate, GenOptions, Target};
pub use error::{Error, Result};
pub use model::{AstNode, Definition, Grammar, Import, Span, Visitor};
pub use parser::{parse_expression, parse_grammar};
pub use resolver::{FileResolver, ImportResolver};

/// Rule names every runtime provides. A grammar may reference them without
/// defining them, and may override them by defining a rule of the same name.
pub const BUILTIN_RULES: &[&str] = &[SPACING_RULE, EOF_RULE];

pub const SPACING_RULE: &str = "Spacing";
pub const EOF_RULE: &str = "EOF";

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_RULES.contains(&name)
}

/// Reusable pipeline: parses grammar text, resolves its imports and validates
/// the result.
pub fn load_grammar<R: ImportResolver + ?Sized>(source: &str, resolver: &R) -> Result<Grammar> {
    // 1. Parsing: grammar text to AST
    let grammar = parse_grammar(source)?;

    // 2. Assembly + 3. Validation
    Assembler::new(resolver).assemble(&grammar)
}
