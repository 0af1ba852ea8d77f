//! Go backend: emits source text for a parser built on the Go `parsing`
//! runtime package.
//!
//! Fragments are Go expressions of type `(parsing.Value, error)`. Multi-line
//! fragments are written as if they started at column zero; [`indent`] shifts
//! every continuation line when a fragment is nested.

use itertools::Itertools;

use super::{Builtin, CallSite, Emitter, Engine, GenOptions, Lookahead, Repetition};
use crate::error::{Error, Result};
use crate::model::Grammar;
use crate::{EOF_RULE, SPACING_RULE};

pub const DEFAULT_RUNTIME_PATH: &str = "github.com/clarete/langlang/go";

const CLOSURE_HEADER: &str = "func(p parsing.Parser) (parsing.Value, error) {";

pub fn generate(grammar: &Grammar, options: &GenOptions) -> Result<String> {
    let emitter = GoEmitter::new(options)?;
    Engine::new(grammar, emitter).run()
}

pub struct GoEmitter {
    package: String,
    parser: String,
    runtime: String,
}

impl GoEmitter {
    pub fn new(options: &GenOptions) -> Result<Self> {
        if !is_go_identifier(&options.module_name) {
            return Err(Error::InvalidOption {
                option: "module_name",
                value: options.module_name.clone(),
            });
        }
        let parser = options.parser_type();
        if !is_go_identifier(&parser) {
            return Err(Error::InvalidOption {
                option: "type_suffix",
                value: options.type_suffix.clone(),
            });
        }
        Ok(Self {
            package: options.module_name.clone(),
            parser,
            runtime: options
                .runtime_path
                .clone()
                .unwrap_or_else(|| DEFAULT_RUNTIME_PATH.to_string()),
        })
    }

    /// Method call on the parser. Inside closures `p` is the runtime's
    /// interface type and has to be narrowed to the concrete parser first.
    fn method(&self, name: &str, args: &str, site: CallSite) -> String {
        match site {
            CallSite::Rule => format!("p.{name}({args})"),
            CallSite::Nested => format!("p.(*{}).{name}({args})", self.parser),
        }
    }

    fn closure(&self, body: &str, levels: usize) -> String {
        let tabs = "\t".repeat(levels);
        format!(
            "{CLOSURE_HEADER}\n{tabs}\treturn {}\n{tabs}}}",
            indent(body, levels + 1)
        )
    }

    fn preamble(&self, names: &[&str]) -> String {
        let mut out = format!(
            "// Code generated by peg-grammar. DO NOT EDIT.\n\n\
             package {package}\n\n\
             import (\n\t\"{runtime}\"\n)\n\n\
             type {parser} struct {{\n\tparsing.BaseParser\n}}\n\n\
             func New{parser}(input string) *{parser} {{\n\
             \tp := &{parser}{{}}\n\
             \tp.SetInput([]rune(input))\n\
             \treturn p\n\
             }}\n\n\
             func (p *{parser}) ParseAny() (parsing.Value, error) {{\n\
             \tstart := p.Location()\n\
             \tr, err := p.Any()\n\
             \tif err != nil {{\n\t\treturn nil, err\n\t}}\n\
             \treturn parsing.NewValueString(string(r), parsing.NewSpan(start, p.Location())), nil\n\
             }}\n\n\
             func (p *{parser}) ParseRange(left, right rune) (parsing.Value, error) {{\n\
             \tstart := p.Location()\n\
             \tr, err := p.ExpectRange(left, right)\n\
             \tif err != nil {{\n\t\treturn nil, err\n\t}}\n\
             \treturn parsing.NewValueString(string(r), parsing.NewSpan(start, p.Location())), nil\n\
             }}\n\n\
             func (p *{parser}) ParseLiteral(literal string) (parsing.Value, error) {{\n\
             \tstart := p.Location()\n\
             \tr, err := p.ExpectLiteral(literal)\n\
             \tif err != nil {{\n\t\treturn nil, err\n\t}}\n\
             \treturn parsing.NewValueString(r, parsing.NewSpan(start, p.Location())), nil\n\
             }}\n",
            package = self.package,
            runtime = self.runtime,
            parser = self.parser,
        );
        if !names.contains(&SPACING_RULE) {
            out.push_str(&format!(
                "\nfunc (p *{parser}) ParseSpacing() (parsing.Value, error) {{\n\
                 \tstart := p.Location()\n\
                 \tv, err := parsing.ZeroOrMore(p, func(p parsing.Parser) (rune, error) {{\n\
                 \t\treturn parsing.ChoiceRune(p, []rune{{' ', '\\t', '\\r', '\\n'}})\n\
                 \t}})\n\
                 \tif err != nil || len(v) == 0 {{\n\t\treturn nil, err\n\t}}\n\
                 \treturn parsing.NewValueString(string(v), parsing.NewSpan(start, p.Location())), nil\n\
                 }}\n",
                parser = self.parser,
            ));
        }
        if !names.contains(&EOF_RULE) {
            out.push_str(&format!(
                "\nfunc (p *{parser}) ParseEOF() (parsing.Value, error) {{\n\
                 \treturn parsing.Not(p, func(p parsing.Parser) (parsing.Value, error) {{\n\
                 \t\treturn p.(*{parser}).ParseAny()\n\
                 \t}})\n\
                 }}\n",
                parser = self.parser,
            ));
        }
        out
    }
}

impl Emitter for GoEmitter {
    type Code = String;

    fn rule(&mut self, name: &str, body: String) -> String {
        format!(
            "func (p *{parser}) Parse{name}() (parsing.Value, error) {{\n\
             \tp.PushTraceSpan(parsing.TracerSpan{{Name: {label}}})\n\
             \tdefer p.PopTraceSpan()\n\
             \treturn {body}\n\
             }}",
            parser = self.parser,
            label = go_string(name),
            body = indent(&body, 1),
        )
    }

    fn sequence(&mut self, steps: Vec<String>) -> String {
        let mut out = format!(
            "({CLOSURE_HEADER}\n\
             \tvar (\n\
             \t\tstart = p.Location()\n\
             \t\titems []parsing.Value\n\
             \t\titem  parsing.Value\n\
             \t\terr   error\n\
             \t)\n"
        );
        for step in steps {
            out.push_str(&format!(
                "\titem, err = {}\n\
                 \tif err != nil {{\n\t\treturn nil, err\n\t}}\n\
                 \tif item != nil {{\n\t\titems = append(items, item)\n\t}}\n",
                indent(&step, 1)
            ));
        }
        out.push_str(
            "\treturn parsing.NewValueSequence(items, parsing.NewSpan(start, p.Location())), nil\n}(p))",
        );
        out
    }

    fn choice(&mut self, alternatives: Vec<String>) -> String {
        let branches = alternatives
            .iter()
            .map(|alt| format!("\t{},", self.closure(alt, 1)))
            .join("\n");
        format!("parsing.Choice(p, []parsing.ParserFn[parsing.Value]{{\n{branches}\n}})")
    }

    fn empty(&mut self) -> String {
        "nil, nil".to_string()
    }

    fn repetition(&mut self, kind: Repetition, body: String) -> String {
        let combinator = match kind {
            Repetition::ZeroOrMore => "ZeroOrMore",
            Repetition::OneOrMore => "OneOrMore",
        };
        format!(
            "({CLOSURE_HEADER}\n\
             \tstart := p.Location()\n\
             \titems, err := parsing.{combinator}(p, {closure})\n\
             \tif err != nil {{\n\t\treturn nil, err\n\t}}\n\
             \treturn parsing.NewValueSequence(items, parsing.NewSpan(start, p.Location())), nil\n\
             }}(p))",
            closure = self.closure(&body, 1),
        )
    }

    fn lookahead(&mut self, kind: Lookahead, body: String) -> String {
        let combinator = match kind {
            Lookahead::And => "And",
            Lookahead::Not => "Not",
        };
        format!("parsing.{combinator}(p, {})", self.closure(&body, 0))
    }

    fn labeled(&mut self, choice: String) -> String {
        format!(
            "({CLOSURE_HEADER}\n\
             \tstart := p.Location()\n\
             \treturn {}\n\
             }}(p))",
            indent(&choice, 1)
        )
    }

    /// The Go runtime has no failure position, so the span ends where the
    /// abandoned attempt left the cursor.
    fn throw(&mut self, label: &str, _site: CallSite) -> String {
        format!(
            "nil, p.Throw({}, parsing.NewSpan(start, p.Location()))",
            go_string(label)
        )
    }

    fn call(&mut self, rule: &str, site: CallSite) -> String {
        self.method(&format!("Parse{rule}"), "", site)
    }

    fn builtin(&mut self, builtin: Builtin, site: CallSite) -> String {
        self.method(&format!("Parse{}", builtin.name()), "", site)
    }

    fn literal(&mut self, value: &str, site: CallSite) -> String {
        self.method("ParseLiteral", &go_string(value), site)
    }

    fn range(&mut self, lo: char, hi: char, site: CallSite) -> String {
        self.method("ParseRange", &format!("{}, {}", go_rune(lo), go_rune(hi)), site)
    }

    fn any(&mut self, site: CallSite) -> String {
        self.method("ParseAny", "", site)
    }

    fn finish(&mut self, names: &[&str], rules: Vec<String>) -> String {
        let mut out = self.preamble(names);
        for rule in rules {
            out.push('\n');
            out.push_str(&rule);
            out.push('\n');
        }
        out
    }
}

/// Shifts every line after the first by `levels` tabs.
fn indent(code: &str, levels: usize) -> String {
    code.replace('\n', &format!("\n{}", "\t".repeat(levels)))
}

fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn go_escape(c: char, quote: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\0' => "\\x00".to_string(),
        c if c == quote => format!("\\{c}"),
        c => c.to_string(),
    }
}

fn go_string(value: &str) -> String {
    let body: String = value.chars().map(|c| go_escape(c, '"')).collect();
    format!("\"{body}\"")
}

fn go_rune(c: char) -> String {
    format!("'{}'", go_escape(c, '\''))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;

    fn generate_go(source: &str) -> String {
        let grammar = parse_grammar(source).unwrap();
        generate(&grammar, &GenOptions::default()).unwrap()
    }

    #[test]
    fn test_preamble_and_rule_shape() {
        let code = generate_go("S <- 'a'");
        assert!(code.starts_with("// Code generated by peg-grammar. DO NOT EDIT.\n\npackage parser\n"));
        assert!(code.contains("\t\"github.com/clarete/langlang/go\"\n"));
        assert!(code.contains("func NewParser(input string) *Parser {"));
        assert!(code.contains(
            "func (p *Parser) ParseS() (parsing.Value, error) {\n\
             \tp.PushTraceSpan(parsing.TracerSpan{Name: \"S\"})\n\
             \tdefer p.PopTraceSpan()\n\
             \treturn p.ParseLiteral(\"a\")\n}"
        ));
    }

    #[test]
    fn test_nested_calls_are_narrowed() {
        let code = generate_go("S <- A / 'b'\nA <- 'a'");
        assert!(code.contains("return p.(*Parser).ParseA()"));
        assert!(code.contains("return p.(*Parser).ParseLiteral(\"b\")"));
        assert!(code.contains("\treturn p.ParseLiteral(\"a\")\n"));
    }

    #[test]
    fn test_sequence_interleaves_spacing() {
        let code = generate_go("S <- A 'b'\nA <- 'a'");
        let spacing = code.matches("item, err = p.(*Parser).ParseSpacing()").count();
        assert_eq!(spacing, 2);

        let lexical = generate_go("S <- #(A 'b')\nA <- 'a'");
        assert!(!lexical.contains("item, err = p.(*Parser).ParseSpacing()"));
    }

    #[test]
    fn test_grammar_rules_replace_builtins() {
        let code = generate_go("S <- A\nA <- 'a'\nSpacing <- ' '*");
        assert_eq!(code.matches("func (p *Parser) ParseSpacing()").count(), 1);
        assert!(code.contains("func (p *Parser) ParseEOF()"));
    }

    #[test]
    fn test_labeled_and_escaping() {
        let code = generate_go("S <- 'a' '\"'^quote [\\]-\\\\]");
        assert!(code.contains("nil, p.Throw(\"quote\", parsing.NewSpan(start, p.Location()))"));
        assert!(!code.contains("FailureLocation"));
        assert!(code.contains("ParseLiteral(\"\\\"\")"));
        assert!(code.contains("ParseRange(']', '\\\\')"));
    }

    #[test]
    fn test_suffix_applies_to_type() {
        let grammar = parse_grammar("S <- 'a' / 'b'").unwrap();
        let options = GenOptions {
            module_name: "calc".into(),
            type_suffix: "Calc".into(),
            runtime_path: None,
        };
        let code = generate(&grammar, &options).unwrap();
        assert!(code.contains("package calc\n"));
        assert!(code.contains("type ParserCalc struct {"));
        assert!(code.contains("p.(*ParserCalc).ParseLiteral(\"b\")"));
    }

    #[test]
    fn test_indent_shifts_continuation_lines() {
        assert_eq!(indent("a\nb\n\tc", 1), "a\n\tb\n\t\tc");
    }
}
