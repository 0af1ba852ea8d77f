//! # peg-grammar
//!
//! A PEG compiler. Grammars written in PEG surface syntax are parsed,
//! merged with their imports and compiled into backtracking
//! recursive-descent parsers, either at build time through [`peg!`] or as
//! source text for Rust or Go through [`Generator`].
//!
//! ```rust,ignore
//! use peg_grammar::peg;
//!
//! peg! {
//!     grammar calc = "
//!         Sum    <- Number ('+' Number)*
//!         Number <- #([0-9]+)
//!     ";
//! }
//!
//! let mut p = calc::Parser::new("1 + 22");
//! assert!(p.parse_Sum().is_ok());
//! ```

use std::path::Path;

extern crate self as peg_grammar;

pub use peg_grammar_macros::peg;
pub use peg_grammar_model::codegen::{self, GenOptions, Target};
pub use peg_grammar_model::{
    load_grammar, model, parse_grammar, Assembler, AstNode, Error, FileResolver, Grammar,
    ImportResolver, Result,
};

/// Runtime used by generated Rust parsers.
pub use peg_kit as kit;

#[cfg(feature = "testing")]
pub use peg_kit::testing;

/// Compiles grammar files from a base directory.
pub struct Generator {
    resolver: FileResolver,
    options: GenOptions,
}

impl Generator {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            resolver: FileResolver::new(base_dir),
            options: GenOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads `root_file` and merges everything it imports.
    pub fn grammar(&self, root_file: &str) -> Result<Grammar> {
        let root = self.resolver.load(root_file)?;
        Assembler::new(&self.resolver)
            .with_root_path(root_file)
            .assemble(&root)
    }

    /// Generates parser source for `root_file`.
    pub fn generate(&self, root_file: &str, target: Target) -> Result<String> {
        let grammar = self.grammar(root_file)?;
        log::debug!("generating {:?} parser for {}", target, root_file);
        codegen::generate(&grammar, target, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn normalize(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_generator_resolves_imports_from_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lexical.peg"), "Digit <- [0-9]\nLetter <- [a-z]").unwrap();
        fs::write(
            dir.path().join("main.peg"),
            "import Digit from \"lexical.peg\"\nNumber <- #(Digit+)",
        )
        .unwrap();

        let generator = Generator::new(dir.path());
        let grammar = generator.grammar("main.peg").unwrap();
        assert!(grammar.definition("Digit").is_some());
        assert!(grammar.definition("Letter").is_none());

        let code = normalize(&generator.generate("main.peg", Target::Rust).unwrap());
        assert!(code.contains("pubfnparse_Number"));
        assert!(code.contains("pubfnparse_Digit"));
        assert!(code.contains("::peg_kit::one_or_more"));
    }

    #[test]
    fn test_generator_options_apply_to_go() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("g.peg"), "S <- 'a' / 'b'").unwrap();

        let generator = Generator::new(dir.path()).with_options(GenOptions {
            module_name: "letters".into(),
            type_suffix: "Letters".into(),
            runtime_path: None,
        });
        let code = generator.generate("g.peg", Target::Go).unwrap();
        assert!(code.contains("package letters"));
        assert!(code.contains("func (p *ParserLetters) ParseS() (parsing.Value, error)"));
    }

    #[test]
    fn test_generator_reports_self_import() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loop.peg"), "import * from \"loop.peg\"\nS <- 'a'").unwrap();
        let err = Generator::new(dir.path()).generate("loop.peg", Target::Rust).unwrap_err();
        assert!(matches!(err, Error::ImportCycle { .. }));
    }
}
