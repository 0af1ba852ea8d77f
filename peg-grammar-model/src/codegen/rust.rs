//! Rust backend: emits a module containing a parser struct built on `peg-kit`.
//!
//! Every fragment is an expression of type `Result<Option<Value>>` evaluated
//! with `p: &mut Self` in scope. Combinator closures are annotated with that
//! type, so call sites never need narrowing.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Path};

use super::{Builtin, CallSite, Emitter, Engine, GenOptions, Lookahead, Repetition};
use crate::error::{Error, Result};
use crate::model::Grammar;

pub const DEFAULT_RUNTIME_PATH: &str = "::peg_kit";

/// Generates the parser module as a token stream.
pub fn generate_tokens(grammar: &Grammar, options: &GenOptions) -> Result<TokenStream> {
    let emitter = RustEmitter::new(options)?;
    Engine::new(grammar, emitter).run()
}

pub struct RustEmitter {
    module: Ident,
    parser: Ident,
    rt: Path,
}

impl RustEmitter {
    pub fn new(options: &GenOptions) -> Result<Self> {
        let module = syn::parse_str::<Ident>(&options.module_name).map_err(|_| {
            Error::InvalidOption {
                option: "module_name",
                value: options.module_name.clone(),
            }
        })?;
        let parser_type = options.parser_type();
        let parser = syn::parse_str::<Ident>(&parser_type).map_err(|_| Error::InvalidOption {
            option: "type_suffix",
            value: options.type_suffix.clone(),
        })?;
        let runtime = options.runtime_path.as_deref().unwrap_or(DEFAULT_RUNTIME_PATH);
        let rt = syn::parse_str::<Path>(runtime).map_err(|_| Error::InvalidOption {
            option: "runtime_path",
            value: runtime.to_string(),
        })?;
        Ok(Self { module, parser, rt })
    }

    fn output_type(&self) -> TokenStream {
        let rt = &self.rt;
        quote! { #rt::Result<::core::option::Option<#rt::Value>> }
    }

    fn closure(&self, body: TokenStream) -> TokenStream {
        let output = self.output_type();
        quote! { |p: &mut Self| -> #output { #body } }
    }
}

impl Emitter for RustEmitter {
    type Code = TokenStream;

    fn rule(&mut self, name: &str, body: TokenStream) -> TokenStream {
        let rt = &self.rt;
        let output = self.output_type();
        let fn_name = format_ident!("parse_{}", name);
        let doc = format!(" Parses `{name}` at the current position.");
        let traced = self.closure(body);
        quote! {
            #[doc = #doc]
            pub fn #fn_name(&mut self) -> #output {
                #rt::Parser::traced(self, #name, #traced)
            }
        }
    }

    fn sequence(&mut self, steps: Vec<TokenStream>) -> TokenStream {
        let rt = &self.rt;
        quote! {{
            let start = p.location();
            let mut items = ::std::vec::Vec::new();
            #(
                if let ::core::option::Option::Some(item) = (#steps)? {
                    items.push(item);
                }
            )*
            ::core::result::Result::Ok(::core::option::Option::Some(
                #rt::Value::sequence(items, #rt::Span::new(start, p.location()))
            ))
        }}
    }

    fn choice(&mut self, alternatives: Vec<TokenStream>) -> TokenStream {
        let rt = &self.rt;
        let closures = alternatives.into_iter().map(|alt| self.closure(alt));
        quote! {
            #rt::choice::<Self, ::core::option::Option<#rt::Value>>(p, &[#(&#closures),*])
        }
    }

    fn empty(&mut self) -> TokenStream {
        quote! { ::core::result::Result::Ok(::core::option::Option::None) }
    }

    fn repetition(&mut self, kind: Repetition, body: TokenStream) -> TokenStream {
        let rt = &self.rt;
        let combinator = match kind {
            Repetition::ZeroOrMore => format_ident!("zero_or_more"),
            Repetition::OneOrMore => format_ident!("one_or_more"),
        };
        let closure = self.closure(body);
        quote! {{
            let start = p.location();
            let items = #rt::#combinator(p, #closure)?;
            ::core::result::Result::Ok(::core::option::Option::Some(#rt::Value::sequence(
                items.into_iter().flatten().collect(),
                #rt::Span::new(start, p.location()),
            )))
        }}
    }

    fn lookahead(&mut self, kind: Lookahead, body: TokenStream) -> TokenStream {
        let rt = &self.rt;
        let combinator = match kind {
            Lookahead::And => format_ident!("and"),
            Lookahead::Not => format_ident!("not"),
        };
        let closure = self.closure(body);
        quote! {{
            #rt::#combinator(p, #closure)?;
            ::core::result::Result::Ok(::core::option::Option::None)
        }}
    }

    fn labeled(&mut self, choice: TokenStream) -> TokenStream {
        quote! {{
            let start = p.location();
            #choice
        }}
    }

    fn throw(&mut self, label: &str, _site: CallSite) -> TokenStream {
        quote! { ::core::result::Result::Err(p.throw(#label, start)) }
    }

    fn call(&mut self, rule: &str, _site: CallSite) -> TokenStream {
        let fn_name = format_ident!("parse_{}", rule);
        quote! { p.#fn_name() }
    }

    fn builtin(&mut self, builtin: Builtin, _site: CallSite) -> TokenStream {
        match builtin {
            Builtin::Spacing => quote! { p.spacing() },
            Builtin::Eof => quote! { p.eof() },
        }
    }

    fn literal(&mut self, value: &str, _site: CallSite) -> TokenStream {
        quote! { p.literal(#value) }
    }

    fn range(&mut self, lo: char, hi: char, _site: CallSite) -> TokenStream {
        quote! { p.range(#lo, #hi) }
    }

    fn any(&mut self, _site: CallSite) -> TokenStream {
        quote! { p.any() }
    }

    fn finish(&mut self, names: &[&str], rules: Vec<TokenStream>) -> TokenStream {
        let module = &self.module;
        let parser = &self.parser;
        let rt = &self.rt;
        quote! {
            pub mod #module {
                #![allow(non_snake_case, unused_variables, unused_mut, unused_braces, dead_code)]

                use #rt::Parser as _;

                /// Rules of the grammar, in definition order.
                pub const GRAMMAR_RULES: &[&str] = &[#(#names),*];

                pub struct #parser {
                    state: #rt::State,
                }

                impl #parser {
                    pub fn new(input: &str) -> Self {
                        Self { state: #rt::State::new(input) }
                    }

                    pub fn with_label_policy(mut self, policy: #rt::LabelPolicy) -> Self {
                        self.state.set_label_policy(policy);
                        self
                    }

                    #(#rules)*
                }

                impl #rt::Parser for #parser {
                    fn state(&self) -> &#rt::State {
                        &self.state
                    }

                    fn state_mut(&mut self) -> &mut #rt::State {
                        &mut self.state
                    }
                }
            }
        }
    }
}
