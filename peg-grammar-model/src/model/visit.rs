use super::{AstNode, Definition, Grammar, Import, Span};

/// One handler per [`AstNode`] variant.
///
/// [`AstNode::accept`] performs a single dispatch; walking into children is
/// up to the implementor, which keeps full control over traversal order and
/// over any state it threads through the recursion.
pub trait Visitor {
    type Output;

    fn visit_any(&mut self, span: Span) -> Self::Output;
    fn visit_literal(&mut self, value: &str, span: Span) -> Self::Output;
    fn visit_identifier(&mut self, name: &str, span: Span) -> Self::Output;
    fn visit_range(&mut self, lo: char, hi: char, span: Span) -> Self::Output;
    fn visit_class(&mut self, items: &[AstNode], span: Span) -> Self::Output;
    fn visit_optional(&mut self, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_zero_or_more(&mut self, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_one_or_more(&mut self, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_and(&mut self, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_not(&mut self, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_lex(&mut self, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_labeled(&mut self, label: &str, expr: &AstNode, span: Span) -> Self::Output;
    fn visit_sequence(&mut self, items: &[AstNode], span: Span) -> Self::Output;
    fn visit_choice(&mut self, items: &[AstNode], span: Span) -> Self::Output;
    fn visit_definition(&mut self, def: &Definition) -> Self::Output;
    fn visit_import(&mut self, import: &Import) -> Self::Output;
    fn visit_grammar(&mut self, grammar: &Grammar) -> Self::Output;
}

impl AstNode {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            AstNode::Any(span) => visitor.visit_any(*span),
            AstNode::Literal { value, span } => visitor.visit_literal(value, *span),
            AstNode::Identifier { name, span } => visitor.visit_identifier(name, *span),
            AstNode::Range { lo, hi, span } => visitor.visit_range(*lo, *hi, *span),
            AstNode::Class(items, span) => visitor.visit_class(items, *span),
            AstNode::Optional(expr, span) => visitor.visit_optional(expr, *span),
            AstNode::ZeroOrMore(expr, span) => visitor.visit_zero_or_more(expr, *span),
            AstNode::OneOrMore(expr, span) => visitor.visit_one_or_more(expr, *span),
            AstNode::And(expr, span) => visitor.visit_and(expr, *span),
            AstNode::Not(expr, span) => visitor.visit_not(expr, *span),
            AstNode::Lex(expr, span) => visitor.visit_lex(expr, *span),
            AstNode::Labeled { label, expr, span } => visitor.visit_labeled(label, expr, *span),
            AstNode::Sequence(items, span) => visitor.visit_sequence(items, *span),
            AstNode::Choice(items, span) => visitor.visit_choice(items, *span),
            AstNode::Definition(def) => visitor.visit_definition(def),
            AstNode::Import(import) => visitor.visit_import(import),
            AstNode::Grammar(grammar) => visitor.visit_grammar(grammar),
        }
    }
}
