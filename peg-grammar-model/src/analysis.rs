use std::collections::{HashSet, VecDeque};

use crate::model::*;

/// A rule name used inside an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub span: Span,
}

/// What a walk over an expression found.
#[derive(Debug, Default)]
pub struct Usage {
    pub references: Vec<Reference>,
    /// Spans of choices or classes without alternatives.
    pub empty_choices: Vec<Span>,
}

/// Collects every identifier and every empty choice below `node`.
pub fn usage(node: &AstNode) -> Usage {
    let mut collector = Usage::default();
    node.accept(&mut collector);
    collector
}

/// Names `node` refers to, in first-use order, without duplicates.
pub fn referenced_names(node: &AstNode) -> Vec<String> {
    let mut seen = HashSet::new();
    usage(node)
        .references
        .into_iter()
        .filter(|r| seen.insert(r.name.clone()))
        .map(|r| r.name)
        .collect()
}

/// Definitions reachable from `roots` inside `grammar`, roots included.
/// Names without a definition (built-ins, or references the grammar leaves
/// open) are skipped.
pub fn reachable<'a>(grammar: &'a Grammar, roots: &[&str]) -> HashSet<&'a str> {
    let mut found = HashSet::new();
    let mut queue: VecDeque<&Definition> = roots.iter().filter_map(|n| grammar.definition(n)).collect();
    while let Some(def) = queue.pop_front() {
        if !found.insert(def.name()) {
            continue;
        }
        for name in referenced_names(def.expr()) {
            if let Some(next) = grammar.definition(&name) {
                queue.push_back(next);
            }
        }
    }
    found
}

impl Usage {
    fn walk(&mut self, items: &[AstNode]) {
        for item in items {
            item.accept(self);
        }
    }
}

impl Visitor for Usage {
    type Output = ();

    fn visit_any(&mut self, _span: Span) {}

    fn visit_literal(&mut self, _value: &str, _span: Span) {}

    fn visit_identifier(&mut self, name: &str, span: Span) {
        self.references.push(Reference {
            name: name.to_string(),
            span,
        });
    }

    fn visit_range(&mut self, _lo: char, _hi: char, _span: Span) {}

    fn visit_class(&mut self, items: &[AstNode], span: Span) {
        if items.is_empty() {
            self.empty_choices.push(span);
        }
        self.walk(items);
    }

    fn visit_optional(&mut self, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_zero_or_more(&mut self, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_one_or_more(&mut self, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_and(&mut self, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_not(&mut self, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_lex(&mut self, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_labeled(&mut self, _label: &str, expr: &AstNode, _span: Span) {
        expr.accept(self)
    }

    fn visit_sequence(&mut self, items: &[AstNode], _span: Span) {
        self.walk(items);
    }

    fn visit_choice(&mut self, items: &[AstNode], span: Span) {
        if items.is_empty() {
            self.empty_choices.push(span);
        }
        self.walk(items);
    }

    fn visit_definition(&mut self, def: &Definition) {
        def.expr().accept(self)
    }

    fn visit_import(&mut self, _import: &Import) {}

    fn visit_grammar(&mut self, grammar: &Grammar) {
        for def in grammar.definitions() {
            self.visit_definition(def);
        }
    }
}
