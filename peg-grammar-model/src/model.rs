//! The grammar AST.
//!
//! Nodes are immutable once built. [`AstNode::text`] renders a node back to
//! PEG surface syntax, [`AstNode::is_syntactic`] classifies it for whitespace
//! injection and [`AstNode::accept`] dispatches to a [`Visitor`].

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;

use crate::error::{Error, Result};

mod types;
mod visit;

pub use types::Span;
pub use visit::Visitor;

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Any(Span),
    Literal { value: String, span: Span },
    Identifier { name: String, span: Span },
    Range { lo: char, hi: char, span: Span },
    Class(Vec<AstNode>, Span),
    Optional(Box<AstNode>, Span),
    ZeroOrMore(Box<AstNode>, Span),
    OneOrMore(Box<AstNode>, Span),
    And(Box<AstNode>, Span),
    Not(Box<AstNode>, Span),
    Lex(Box<AstNode>, Span),
    Labeled {
        label: String,
        expr: Box<AstNode>,
        span: Span,
    },
    Sequence(Vec<AstNode>, Span),
    Choice(Vec<AstNode>, Span),
    Definition(Definition),
    Import(Import),
    Grammar(Grammar),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    name: String,
    expr: Box<AstNode>,
    span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    path: String,
    names: Vec<String>,
    span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    imports: Vec<Import>,
    definitions: Vec<Definition>,
    defs_by_name: HashMap<String, usize>,
    span: Span,
}

/// Binding strength of the surface syntax, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Choice,
    Sequence,
    Prefix,
    Labeled,
    Suffix,
    Primary,
}

impl AstNode {
    pub fn span(&self) -> Span {
        match self {
            AstNode::Any(span)
            | AstNode::Literal { span, .. }
            | AstNode::Identifier { span, .. }
            | AstNode::Range { span, .. }
            | AstNode::Class(_, span)
            | AstNode::Optional(_, span)
            | AstNode::ZeroOrMore(_, span)
            | AstNode::OneOrMore(_, span)
            | AstNode::And(_, span)
            | AstNode::Not(_, span)
            | AstNode::Lex(_, span)
            | AstNode::Labeled { span, .. }
            | AstNode::Sequence(_, span)
            | AstNode::Choice(_, span) => *span,
            AstNode::Definition(def) => def.span,
            AstNode::Import(import) => import.span,
            AstNode::Grammar(grammar) => grammar.span,
        }
    }

    /// Whether the node matches purely at the character level, i.e. whether
    /// a sequence made of such nodes is exempt from whitespace injection.
    pub fn is_syntactic(&self) -> bool {
        match self {
            AstNode::Any(_)
            | AstNode::Literal { .. }
            | AstNode::Range { .. }
            | AstNode::Class(..)
            | AstNode::And(..)
            | AstNode::Not(..)
            | AstNode::Lex(..) => true,
            AstNode::Optional(expr, _)
            | AstNode::ZeroOrMore(expr, _)
            | AstNode::OneOrMore(expr, _)
            | AstNode::Labeled { expr, .. } => expr.is_syntactic(),
            AstNode::Sequence(items, _) | AstNode::Choice(items, _) => {
                items.iter().all(AstNode::is_syntactic)
            }
            AstNode::Definition(def) => def.expr.is_syntactic(),
            AstNode::Identifier { .. } | AstNode::Import(_) | AstNode::Grammar(_) => false,
        }
    }

    /// Renders the node as PEG surface syntax. Parsing the result yields an
    /// equivalent tree.
    pub fn text(&self) -> String {
        match self {
            AstNode::Any(_) => ".".to_string(),
            AstNode::Literal { value, .. } => format!("'{}'", escape_literal(value)),
            AstNode::Identifier { name, .. } => name.clone(),
            AstNode::Range { lo, hi, .. } => {
                format!("[{}-{}]", escape_class_char(*lo), escape_class_char(*hi))
            }
            AstNode::Class(items, _) => {
                format!("[{}]", items.iter().map(class_member_text).join(""))
            }
            AstNode::Optional(expr, _) => format!("{}?", expr.text_at(Precedence::Primary)),
            AstNode::ZeroOrMore(expr, _) => format!("{}*", expr.text_at(Precedence::Primary)),
            AstNode::OneOrMore(expr, _) => format!("{}+", expr.text_at(Precedence::Primary)),
            AstNode::And(expr, _) => format!("&{}", expr.text_at(Precedence::Labeled)),
            AstNode::Not(expr, _) => format!("!{}", expr.text_at(Precedence::Labeled)),
            AstNode::Lex(expr, _) => format!("#{}", expr.text_at(Precedence::Labeled)),
            AstNode::Labeled { label, expr, .. } => {
                format!("{}^{}", expr.text_at(Precedence::Suffix), label)
            }
            AstNode::Sequence(items, _) => items
                .iter()
                .map(|item| item.text_at(Precedence::Prefix))
                .join(" "),
            AstNode::Choice(items, _) => items
                .iter()
                .map(|item| item.text_at(Precedence::Sequence))
                .join(" / "),
            AstNode::Definition(def) => def.text(),
            AstNode::Import(import) => import.text(),
            AstNode::Grammar(grammar) => grammar.text(),
        }
    }

    fn precedence(&self) -> Precedence {
        match self {
            AstNode::Choice(items, _) if items.len() != 1 => Precedence::Choice,
            AstNode::Sequence(items, _) if items.len() != 1 => Precedence::Sequence,
            AstNode::Choice(items, _) | AstNode::Sequence(items, _) => items[0].precedence(),
            AstNode::And(..) | AstNode::Not(..) | AstNode::Lex(..) => Precedence::Prefix,
            AstNode::Labeled { .. } => Precedence::Labeled,
            AstNode::Optional(..) | AstNode::ZeroOrMore(..) | AstNode::OneOrMore(..) => {
                Precedence::Suffix
            }
            _ => Precedence::Primary,
        }
    }

    /// Text of `self` placed where at least `min` binding strength is required.
    fn text_at(&self, min: Precedence) -> String {
        if self.precedence() < min {
            format!("({})", self.text())
        } else {
            self.text()
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AstNode::Any(_) => "Any",
            AstNode::Literal { .. } => "Literal",
            AstNode::Identifier { .. } => "Identifier",
            AstNode::Range { .. } => "Range",
            AstNode::Class(..) => "Class",
            AstNode::Optional(..) => "Optional",
            AstNode::ZeroOrMore(..) => "ZeroOrMore",
            AstNode::OneOrMore(..) => "OneOrMore",
            AstNode::And(..) => "And",
            AstNode::Not(..) => "Not",
            AstNode::Lex(..) => "Lex",
            AstNode::Labeled { .. } => "Labeled",
            AstNode::Sequence(..) => "Sequence",
            AstNode::Choice(..) => "Choice",
            AstNode::Definition(_) => "Definition",
            AstNode::Import(_) => "Import",
            AstNode::Grammar(_) => "Grammar",
        }
    }
}

/// Debug rendering: node name, constructor data and span, e.g.
/// `Literal(ab) @ 3..7`.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            AstNode::Any(span) => write!(f, "{name} @ {span}"),
            AstNode::Literal { value, span } => write!(f, "{name}({value}) @ {span}"),
            AstNode::Identifier { name: id, span } => write!(f, "{name}({id}) @ {span}"),
            AstNode::Range { lo, hi, span } => write!(f, "{name}({lo}, {hi}) @ {span}"),
            AstNode::Class(items, span)
            | AstNode::Sequence(items, span)
            | AstNode::Choice(items, span) => {
                write!(f, "{name}({}) @ {span}", items.iter().join(", "))
            }
            AstNode::Optional(expr, span)
            | AstNode::ZeroOrMore(expr, span)
            | AstNode::OneOrMore(expr, span)
            | AstNode::And(expr, span)
            | AstNode::Not(expr, span)
            | AstNode::Lex(expr, span) => write!(f, "{name}({expr}) @ {span}"),
            AstNode::Labeled { label, expr, span } => {
                write!(f, "{name}({label}, {expr}) @ {span}")
            }
            AstNode::Definition(def) => {
                write!(f, "{name}({}, {}) @ {}", def.name, def.expr, def.span)
            }
            AstNode::Import(import) => write!(
                f,
                "{name}({}, [{}]) @ {}",
                import.path,
                import.names.join(", "),
                import.span
            ),
            AstNode::Grammar(grammar) => write!(
                f,
                "{name}([{}], [{}]) @ {}",
                grammar
                    .imports
                    .iter()
                    .map(|i| AstNode::Import(i.clone()))
                    .join(", "),
                grammar
                    .definitions
                    .iter()
                    .map(|d| AstNode::Definition(d.clone()))
                    .join(", "),
                grammar.span
            ),
        }
    }
}

impl Definition {
    pub fn new(name: impl Into<String>, expr: AstNode, span: Span) -> Self {
        Self {
            name: name.into(),
            expr: Box::new(expr),
            span,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &AstNode {
        &self.expr
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> String {
        format!("{} <- {}", self.name, self.expr.text())
    }
}

impl Import {
    /// An empty `names` list imports every definition of `path`.
    pub fn new(path: impl Into<String>, names: Vec<String>, span: Span) -> Self {
        Self {
            path: path.into(),
            names,
            span,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn imports_all(&self) -> bool {
        self.names.is_empty()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> String {
        let names = if self.names.is_empty() {
            "*".to_string()
        } else {
            self.names.join(", ")
        };
        format!("import {} from \"{}\"", names, escape_string(&self.path))
    }
}

impl Grammar {
    /// Builds a grammar, indexing definitions by name. Fails on the first
    /// name defined twice.
    pub fn new(imports: Vec<Import>, definitions: Vec<Definition>, span: Span) -> Result<Self> {
        let mut defs_by_name = HashMap::with_capacity(definitions.len());
        for (index, def) in definitions.iter().enumerate() {
            if let Some(&first) = defs_by_name.get(&def.name) {
                let first: &Definition = &definitions[first];
                return Err(Error::DuplicateDefinition {
                    name: def.name.clone(),
                    first: first.span,
                    second: def.span,
                });
            }
            defs_by_name.insert(def.name.clone(), index);
        }
        Ok(Self {
            imports,
            definitions,
            defs_by_name,
            span,
        })
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.defs_by_name.get(name).map(|&index| &self.definitions[index])
    }

    pub fn defs_by_name(&self) -> &HashMap<String, usize> {
        &self.defs_by_name
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> String {
        self.imports
            .iter()
            .map(Import::text)
            .chain(self.definitions.iter().map(Definition::text))
            .join("\n")
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_class_char(c: char) -> String {
    match c {
        ']' => "\\]".to_string(),
        '\\' => "\\\\".to_string(),
        '-' => "\\-".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Class members are rendered raw: `a-z` rather than `[a-z]`.
fn class_member_text(node: &AstNode) -> String {
    match node {
        AstNode::Range { lo, hi, .. } => {
            format!("{}-{}", escape_class_char(*lo), escape_class_char(*hi))
        }
        AstNode::Literal { value, .. } => value.chars().map(escape_class_char).collect(),
        AstNode::Any(_) => ".".to_string(),
        other => other.text(),
    }
}
