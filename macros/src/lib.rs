extern crate proc_macro;

use std::path::PathBuf;

use derive_syn_parse::Parse;
use peg_grammar_model::codegen::{rust, GenOptions};
use peg_grammar_model::{parse_grammar, Assembler, FileResolver};
use proc_macro::TokenStream;
use proc_macro_error::{abort, proc_macro_error};
use syn::{parse_macro_input, Ident, LitStr, Token};

mod kw {
    syn::custom_keyword!(grammar);
}

/// `grammar <name> = "<PEG text>";`
#[derive(Parse)]
struct PegInput {
    _grammar: kw::grammar,
    name: Ident,
    _eq: Token![=],
    source: LitStr,
    _semi: Option<Token![;]>,
}

/// Compiles an inline PEG grammar into a parser module.
///
/// Imports are resolved relative to the directory of the crate being built
/// (`CARGO_MANIFEST_DIR`). Grammar errors are reported at the grammar literal.
///
/// # Example
///
/// ```rust,ignore
/// use peg_grammar::peg;
/// use peg_grammar::testing::Testable;
///
/// peg! {
///     grammar greeting = "
///         Greeting <- 'hello' Name
///         Name     <- #([a-z]+)
///     ";
/// }
///
/// let mut p = greeting::Parser::new("hello world");
/// p.parse_Greeting().test().assert_matches("hello world");
/// ```
#[proc_macro_error]
#[proc_macro]
pub fn peg(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as PegInput);
    let span = input.source.span();

    // 1. Parsing: grammar text to AST
    let grammar = match parse_grammar(&input.source.value()) {
        Ok(grammar) => grammar,
        Err(e) => abort!(span, "invalid grammar: {}", e),
    };

    // 2. Assembly + validation: merge imports, resolve every reference
    let base_dir = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default();
    let resolver = FileResolver::new(base_dir);
    let grammar = match Assembler::new(&resolver).assemble(&grammar) {
        Ok(grammar) => grammar,
        Err(e) => abort!(span, "{}", e),
    };

    // 3. Code generation against the runtime re-exported by the facade crate
    let options = GenOptions {
        module_name: input.name.to_string(),
        type_suffix: String::new(),
        runtime_path: Some("::peg_grammar::kit".to_string()),
    };
    match rust::generate_tokens(&grammar, &options) {
        Ok(stream) => stream.into(),
        Err(e) => syn::Error::new(input.name.span(), e).to_compile_error().into(),
    }
}
