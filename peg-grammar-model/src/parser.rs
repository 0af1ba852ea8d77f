//! Grammar text to AST.
//!
//! The surface syntax lives in `grammar.pest`. Single-element sequences and
//! choices collapse to their element, so `A <- 'a'` yields a bare literal body.

use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::error::{Error, Result};
use crate::model::{AstNode, Definition, Grammar, Import, Span};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct PegParser;

/// Parses a complete grammar: imports followed by at least one definition.
pub fn parse_grammar(source: &str) -> Result<Grammar> {
    let mut pairs = PegParser::parse(Rule::grammar, source).map_err(convert_parse_error)?;
    let root = expect_next(&mut pairs, Span::new(0, source.len()), "grammar")?;
    let span = Span::from(root.as_span());

    let mut imports = Vec::new();
    let mut definitions = Vec::new();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::import => imports.push(build_import(pair)?),
            Rule::definition => definitions.push(build_definition(pair)?),
            Rule::EOI => {}
            _ => return Err(malformed(&pair)),
        }
    }
    Grammar::new(imports, definitions, span)
}

/// Parses a single expression, e.g. the right-hand side of a definition.
pub fn parse_expression(source: &str) -> Result<AstNode> {
    let mut pairs =
        PegParser::parse(Rule::expression_only, source).map_err(convert_parse_error)?;
    let root = expect_next(&mut pairs, Span::new(0, source.len()), "expression")?;
    let span = Span::from(root.as_span());
    let mut inner = root.into_inner();
    build_expression(expect_next(&mut inner, span, "expression")?)
}

fn build_import(pair: Pair<Rule>) -> Result<Import> {
    let span = Span::from(pair.as_span());
    let mut names = Vec::new();
    let mut path = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::kw_import | Rule::kw_from => {}
            Rule::import_names => {
                names = part
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::identifier)
                    .map(|p| p.as_str().to_string())
                    .collect();
            }
            Rule::string => {
                let mut inner = part.into_inner();
                path = Some(unescape(expect_next(&mut inner, span, "import path")?.as_str()));
            }
            _ => return Err(malformed(&part)),
        }
    }
    let path = path.ok_or_else(|| Error::Syntax {
        message: "import without a path".to_string(),
        span,
    })?;
    Ok(Import::new(path, names, span))
}

fn build_definition(pair: Pair<Rule>) -> Result<Definition> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let name = expect_next(&mut inner, span, "rule name")?.as_str().to_string();
    let expr = build_expression(expect_next(&mut inner, span, "rule body")?)?;
    Ok(Definition::new(name, expr, span))
}

fn build_expression(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let items = pair
        .into_inner()
        .map(build_sequence)
        .collect::<Result<Vec<_>>>()?;
    Ok(collapse(items, span, AstNode::Choice))
}

fn build_sequence(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let items = pair
        .into_inner()
        .map(build_prefix)
        .collect::<Result<Vec<_>>>()?;
    Ok(collapse(items, span, AstNode::Sequence))
}

fn build_prefix(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let mut op = None;
    let mut expr = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::prefix_op => op = Some(part.as_str().to_string()),
            Rule::labeled => expr = Some(build_labeled(part)?),
            _ => return Err(malformed(&part)),
        }
    }
    let expr = expr.ok_or_else(|| missing("expression after prefix operator", span))?;
    Ok(match op.as_deref() {
        Some("&") => AstNode::And(Box::new(expr), span),
        Some("!") => AstNode::Not(Box::new(expr), span),
        Some("#") => AstNode::Lex(Box::new(expr), span),
        _ => expr,
    })
}

fn build_labeled(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let expr = build_suffix(expect_next(&mut inner, span, "labeled expression")?)?;
    Ok(match inner.next() {
        Some(label) => AstNode::Labeled {
            label: label.as_str().to_string(),
            expr: Box::new(expr),
            span,
        },
        None => expr,
    })
}

fn build_suffix(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let expr = build_primary(expect_next(&mut inner, span, "primary expression")?)?;
    Ok(match inner.next().as_ref().map(Pair::as_str) {
        Some("?") => AstNode::Optional(Box::new(expr), span),
        Some("*") => AstNode::ZeroOrMore(Box::new(expr), span),
        Some("+") => AstNode::OneOrMore(Box::new(expr), span),
        _ => expr,
    })
}

fn build_primary(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let item = expect_next(&mut inner, span, "primary expression")?;
    let item_span = Span::from(item.as_span());
    match item.as_rule() {
        Rule::identifier => Ok(AstNode::Identifier {
            name: item.as_str().to_string(),
            span: item_span,
        }),
        Rule::expression => build_expression(item),
        Rule::literal => {
            let mut parts = item.into_inner();
            let raw = expect_next(&mut parts, item_span, "literal text")?;
            Ok(AstNode::Literal {
                value: unescape(raw.as_str()),
                span: item_span,
            })
        }
        Rule::class => {
            let items = item
                .into_inner()
                .map(build_class_item)
                .collect::<Result<Vec<_>>>()?;
            Ok(AstNode::Class(items, item_span))
        }
        Rule::any => Ok(AstNode::Any(item_span)),
        _ => Err(malformed(&item)),
    }
}

fn build_class_item(pair: Pair<Rule>) -> Result<AstNode> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let member = expect_next(&mut inner, span, "class member")?;
    match member.as_rule() {
        Rule::class_range => {
            let mut bounds = member.into_inner();
            let lo = class_char(expect_next(&mut bounds, span, "range start")?)?;
            let hi = class_char(expect_next(&mut bounds, span, "range end")?)?;
            Ok(AstNode::Range { lo, hi, span })
        }
        Rule::class_char => Ok(AstNode::Literal {
            value: class_char(member)?.to_string(),
            span,
        }),
        _ => Err(malformed(&member)),
    }
}

fn class_char(pair: Pair<Rule>) -> Result<char> {
    let span = Span::from(pair.as_span());
    unescape(pair.as_str())
        .chars()
        .next()
        .ok_or_else(|| missing("class character", span))
}

/// Resolves backslash escapes. Unknown escapes stand for the escaped
/// character itself (`\]` is `]`).
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn collapse(
    mut items: Vec<AstNode>,
    span: Span,
    build: impl FnOnce(Vec<AstNode>, Span) -> AstNode,
) -> AstNode {
    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return only;
        }
    }
    build(items, span)
}

fn expect_next<'i>(pairs: &mut Pairs<'i, Rule>, span: Span, what: &str) -> Result<Pair<'i, Rule>> {
    pairs.next().ok_or_else(|| missing(what, span))
}

fn missing(what: &str, span: Span) -> Error {
    Error::Syntax {
        message: format!("missing {what}"),
        span,
    }
}

fn malformed(pair: &Pair<Rule>) -> Error {
    Error::Syntax {
        message: format!("unexpected {:?}", pair.as_rule()),
        span: Span::from(pair.as_span()),
    }
}

fn convert_parse_error(error: pest::error::Error<Rule>) -> Error {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    Error::Syntax {
        message: error.variant.message().into_owned(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_single_item_groups() {
        let node = parse_expression("'a'").unwrap();
        assert!(matches!(node, AstNode::Literal { ref value, .. } if value == "a"));

        let node = parse_expression("('a')").unwrap();
        assert!(matches!(node, AstNode::Literal { .. }));
    }

    #[test]
    fn test_operator_structure() {
        let node = parse_expression("!'a' .").unwrap();
        match node {
            AstNode::Sequence(items, span) => {
                assert_eq!(span, Span::new(0, 6));
                assert!(matches!(items[0], AstNode::Not(..)));
                assert!(matches!(items[1], AstNode::Any(_)));
            }
            other => panic!("expected sequence, got {other}"),
        }

        let node = parse_expression("A^label?").unwrap_err();
        assert!(matches!(node, Error::Syntax { .. }));

        let node = parse_expression("A?^label").unwrap();
        match node {
            AstNode::Labeled { label, expr, .. } => {
                assert_eq!(label, "label");
                assert!(matches!(*expr, AstNode::Optional(..)));
            }
            other => panic!("expected labeled, got {other}"),
        }
    }

    #[test]
    fn test_class_members() {
        match parse_expression(r"[a-z_\]]").unwrap() {
            AstNode::Class(items, _) => {
                assert_eq!(items.len(), 3);
                assert!(matches!(items[0], AstNode::Range { lo: 'a', hi: 'z', .. }));
                assert!(matches!(items[1], AstNode::Literal { ref value, .. } if value == "_"));
                assert!(matches!(items[2], AstNode::Literal { ref value, .. } if value == "]"));
            }
            other => panic!("expected class, got {other}"),
        }
    }

    #[test]
    fn test_grammar_with_imports_and_comments() {
        let source = r#"
            // shared lexical rules
            import Digit, Letter from "lexical.peg"
            import * from "base.peg"

            Number <- #(Digit+)   // no spacing inside
            Word   <- Letter+
        "#;
        let grammar = parse_grammar(source).unwrap();
        assert_eq!(grammar.imports().len(), 2);
        assert_eq!(grammar.imports()[0].path(), "lexical.peg");
        assert_eq!(grammar.imports()[0].names(), ["Digit", "Letter"]);
        assert!(grammar.imports()[1].imports_all());
        assert_eq!(grammar.definitions().len(), 2);
        assert!(grammar.definition("Word").is_some());
        assert!(matches!(grammar.definition("Number").unwrap().expr(), AstNode::Lex(..)));
    }

    #[test]
    fn test_definitions_split_on_arrow() {
        let grammar = parse_grammar("S <- A B\nA <- 'a'\nB <- 'b'").unwrap();
        let names: Vec<_> = grammar.definitions().iter().map(Definition::name).collect();
        assert_eq!(names, ["S", "A", "B"]);
        assert_eq!(grammar.definition("S").unwrap().expr().text(), "A B");
    }

    #[test]
    fn test_syntax_error_has_position() {
        match parse_grammar("S <- 'a' /") {
            Err(Error::Syntax { span, .. }) => assert!(span.start >= 9, "{span}"),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_definition_is_rejected() {
        let err = parse_grammar("S <- 'a'\nS <- 'b'").unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition { ref name, .. } if name == "S"));
    }
}
