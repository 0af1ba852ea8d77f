//! Code generation.
//!
//! [`Engine`] walks a resolved grammar once and decides, per node, what the
//! generated parser has to do: where spacing is injected, which alternatives
//! become closures, how labeled failures are raised. Backends only spell those
//! decisions out in their target language through the [`Emitter`] trait.

mod go;
pub mod rust;

use std::collections::HashSet;

use crate::analysis;
use crate::error::{Error, Result};
use crate::model::*;
use crate::{EOF_RULE, SPACING_RULE};

pub use go::GoEmitter;
pub use rust::RustEmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Rust,
    Go,
}

/// Knobs shared by all backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenOptions {
    /// Rust module or Go package the parser is emitted into.
    pub module_name: String,
    /// Appended to the generated parser type name: `Parser<suffix>`.
    pub type_suffix: String,
    /// Path of the runtime the generated code depends on. `None` selects the
    /// backend default.
    pub runtime_path: Option<String>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            module_name: "parser".to_string(),
            type_suffix: String::new(),
            runtime_path: None,
        }
    }
}

impl GenOptions {
    pub fn parser_type(&self) -> String {
        format!("Parser{}", self.type_suffix)
    }
}

/// Where a call is emitted relative to the rule procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// Directly in the rule body, where the concrete parser type is known.
    Rule,
    /// Inside a closure handed to a runtime combinator.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    And,
    Not,
}

/// Rules the runtime provides when the grammar does not define them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Spacing,
    Eof,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            SPACING_RULE => Some(Builtin::Spacing),
            EOF_RULE => Some(Builtin::Eof),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Spacing => SPACING_RULE,
            Builtin::Eof => EOF_RULE,
        }
    }
}

/// Target-language spelling of the engine's decisions.
///
/// Every method returns a fragment evaluating to the runtime's result type
/// (a possibly empty value, or a failure). Fragments handed back in through
/// `alternatives`/`body` are placed inside closures by the emitter.
pub trait Emitter {
    type Code;

    /// Procedure for one definition; `body` runs inside a trace span.
    fn rule(&mut self, name: &str, body: Self::Code) -> Self::Code;
    /// Runs `steps` in order, collecting their non-empty values.
    fn sequence(&mut self, steps: Vec<Self::Code>) -> Self::Code;
    /// Ordered choice over at least two alternatives.
    fn choice(&mut self, alternatives: Vec<Self::Code>) -> Self::Code;
    /// Succeeds with no value and consumes nothing.
    fn empty(&mut self) -> Self::Code;
    fn repetition(&mut self, kind: Repetition, body: Self::Code) -> Self::Code;
    fn lookahead(&mut self, kind: Lookahead, body: Self::Code) -> Self::Code;
    /// Records the start position and evaluates `choice`, whose last
    /// alternative is a [`throw`](Emitter::throw).
    fn labeled(&mut self, choice: Self::Code) -> Self::Code;
    fn throw(&mut self, label: &str, site: CallSite) -> Self::Code;
    fn call(&mut self, rule: &str, site: CallSite) -> Self::Code;
    fn builtin(&mut self, builtin: Builtin, site: CallSite) -> Self::Code;
    fn literal(&mut self, value: &str, site: CallSite) -> Self::Code;
    fn range(&mut self, lo: char, hi: char, site: CallSite) -> Self::Code;
    fn any(&mut self, site: CallSite) -> Self::Code;
    /// Complete output around the rule procedures, in definition order.
    fn finish(&mut self, names: &[&str], rules: Vec<Self::Code>) -> Self::Code;
}

/// Generates a parser for an assembled grammar.
pub fn generate(grammar: &Grammar, target: Target, options: &GenOptions) -> Result<String> {
    match target {
        Target::Rust => Ok(rust::generate_tokens(grammar, options)?.to_string()),
        Target::Go => go::generate(grammar, options),
    }
}

/// Structural recursion over a grammar, driving an [`Emitter`].
pub struct Engine<'g, E: Emitter> {
    grammar: &'g Grammar,
    emitter: E,
    /// 0 outside definitions, 1 inside a rule body.
    depth: usize,
    /// Closures opened since the rule body started.
    closures: usize,
    /// Enclosing `Lex` nodes.
    lexical: usize,
    /// The grammar's own `Spacing` rule and every rule it reaches. Their
    /// bodies never get spacing injected.
    spacing_rules: HashSet<&'g str>,
    /// Inside one of `spacing_rules`.
    in_spacing_rule: bool,
}

impl<'g, E: Emitter> Engine<'g, E> {
    pub fn new(grammar: &'g Grammar, emitter: E) -> Self {
        Self {
            grammar,
            emitter,
            depth: 0,
            closures: 0,
            lexical: 0,
            spacing_rules: analysis::reachable(grammar, &[SPACING_RULE]),
            in_spacing_rule: false,
        }
    }

    pub fn run(mut self) -> Result<E::Code> {
        let grammar = self.grammar;
        self.visit_grammar(grammar)
    }

    fn site(&self) -> CallSite {
        if self.closures == 0 {
            CallSite::Rule
        } else {
            CallSite::Nested
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.closures += 1;
        let out = f(self);
        self.closures -= 1;
        out
    }

    fn spacing(&mut self) -> E::Code {
        let site = self.site();
        if self.grammar.definition(SPACING_RULE).is_some() {
            self.emitter.call(SPACING_RULE, site)
        } else {
            self.emitter.builtin(Builtin::Spacing, site)
        }
    }

    fn injects_spacing(&self, items: &[AstNode]) -> bool {
        self.depth >= 1
            && self.lexical == 0
            && !self.in_spacing_rule
            && !items.iter().all(AstNode::is_syntactic)
    }

    fn alternatives(&mut self, items: &[AstNode], span: Span) -> Result<E::Code> {
        match items {
            [] => Err(Error::EmptyChoice { span }),
            [only] => only.accept(self),
            _ => {
                let alternatives = self.nested(|this| {
                    items
                        .iter()
                        .map(|item| item.accept(this))
                        .collect::<Result<Vec<_>>>()
                })?;
                Ok(self.emitter.choice(alternatives))
            }
        }
    }

    fn repetition(&mut self, kind: Repetition, expr: &AstNode) -> Result<E::Code> {
        let body = self.nested(|this| expr.accept(this))?;
        Ok(self.emitter.repetition(kind, body))
    }

    fn lookahead(&mut self, kind: Lookahead, expr: &AstNode) -> Result<E::Code> {
        let body = self.nested(|this| expr.accept(this))?;
        Ok(self.emitter.lookahead(kind, body))
    }
}

impl<E: Emitter> Visitor for Engine<'_, E> {
    type Output = Result<E::Code>;

    fn visit_any(&mut self, _span: Span) -> Self::Output {
        let site = self.site();
        Ok(self.emitter.any(site))
    }

    fn visit_literal(&mut self, value: &str, _span: Span) -> Self::Output {
        let site = self.site();
        Ok(self.emitter.literal(value, site))
    }

    fn visit_identifier(&mut self, name: &str, span: Span) -> Self::Output {
        let site = self.site();
        if self.grammar.definition(name).is_some() {
            Ok(self.emitter.call(name, site))
        } else if let Some(builtin) = Builtin::from_name(name) {
            Ok(self.emitter.builtin(builtin, site))
        } else {
            Err(Error::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            })
        }
    }

    fn visit_range(&mut self, lo: char, hi: char, _span: Span) -> Self::Output {
        let site = self.site();
        Ok(self.emitter.range(lo, hi, site))
    }

    fn visit_class(&mut self, items: &[AstNode], span: Span) -> Self::Output {
        self.alternatives(items, span)
    }

    fn visit_optional(&mut self, expr: &AstNode, _span: Span) -> Self::Output {
        let alternatives = self.nested(|this| -> Result<Vec<E::Code>> {
            Ok(vec![expr.accept(this)?, this.emitter.empty()])
        })?;
        Ok(self.emitter.choice(alternatives))
    }

    fn visit_zero_or_more(&mut self, expr: &AstNode, _span: Span) -> Self::Output {
        self.repetition(Repetition::ZeroOrMore, expr)
    }

    fn visit_one_or_more(&mut self, expr: &AstNode, _span: Span) -> Self::Output {
        self.repetition(Repetition::OneOrMore, expr)
    }

    fn visit_and(&mut self, expr: &AstNode, _span: Span) -> Self::Output {
        self.lookahead(Lookahead::And, expr)
    }

    fn visit_not(&mut self, expr: &AstNode, _span: Span) -> Self::Output {
        self.lookahead(Lookahead::Not, expr)
    }

    fn visit_lex(&mut self, expr: &AstNode, _span: Span) -> Self::Output {
        self.lexical += 1;
        let code = expr.accept(self);
        self.lexical -= 1;
        code
    }

    fn visit_labeled(&mut self, label: &str, expr: &AstNode, _span: Span) -> Self::Output {
        let alternatives = self.nested(|this| -> Result<Vec<E::Code>> {
            let attempt = expr.accept(this)?;
            let site = this.site();
            Ok(vec![attempt, this.emitter.throw(label, site)])
        })?;
        let choice = self.emitter.choice(alternatives);
        Ok(self.emitter.labeled(choice))
    }

    fn visit_sequence(&mut self, items: &[AstNode], _span: Span) -> Self::Output {
        let inject = self.injects_spacing(items);
        let steps = self.nested(|this| -> Result<Vec<E::Code>> {
            let mut steps = Vec::with_capacity(if inject { items.len() * 2 } else { items.len() });
            for item in items {
                if inject {
                    steps.push(this.spacing());
                }
                steps.push(item.accept(this)?);
            }
            Ok(steps)
        })?;
        Ok(self.emitter.sequence(steps))
    }

    fn visit_choice(&mut self, items: &[AstNode], span: Span) -> Self::Output {
        self.alternatives(items, span)
    }

    fn visit_definition(&mut self, def: &Definition) -> Self::Output {
        log::debug!("generating rule {}", def.name());
        self.depth += 1;
        self.closures = 0;
        self.in_spacing_rule = self.spacing_rules.contains(def.name());
        let body = def.expr().accept(self);
        self.in_spacing_rule = false;
        self.depth -= 1;
        Ok(self.emitter.rule(def.name(), body?))
    }

    fn visit_import(&mut self, import: &Import) -> Self::Output {
        Err(Error::UnassembledImport {
            path: import.path().to_string(),
            span: import.span(),
        })
    }

    fn visit_grammar(&mut self, grammar: &Grammar) -> Self::Output {
        for import in grammar.imports() {
            self.visit_import(import)?;
        }
        let rules = grammar
            .definitions()
            .iter()
            .map(|def| self.visit_definition(def))
            .collect::<Result<Vec<_>>>()?;
        let names: Vec<&str> = grammar.definitions().iter().map(Definition::name).collect();
        Ok(self.emitter.finish(&names, rules))
    }
}
