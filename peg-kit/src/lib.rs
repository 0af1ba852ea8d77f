//! # peg-kit
//!
//! Runtime support for parsers generated by `peg-grammar`.
//!
//! A generated parser owns a [`State`] and implements [`Parser`]; its rule
//! procedures are compositions of the primitives on [`Parser`] and the free
//! combinators in this crate ([`choice`], [`and`], [`not`], [`optional`],
//! [`zero_or_more`], [`one_or_more`]).

mod combinators;
mod error;
mod parser;
mod state;
mod value;

#[cfg(feature = "testing")]
pub mod testing;

pub use combinators::{and, choice, not, one_or_more, optional, zero_or_more};
pub use error::{Error, Result};
pub use parser::Parser;
pub use state::{LabelPolicy, State, TraceSpan};
pub use value::{Span, Value};
