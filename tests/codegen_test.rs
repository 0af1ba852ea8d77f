mod common;

use std::thread;

use common::TestEnv;
use peg_grammar::{codegen, parse_grammar, peg, Error, GenOptions, Target};

const CALC: &str = "
    Expr   <- Term (('+' / '-') Term)*
    Term   <- Factor (('*' / '/') Factor)*
    Factor <- Number / '(' Expr ')'^unclosed
    Number <- #([0-9]+)
";

#[test]
fn test_generation_is_deterministic() {
    let grammar = parse_grammar(CALC).unwrap();
    let options = GenOptions::default();
    for target in [Target::Rust, Target::Go] {
        let first = codegen::generate(&grammar, target, &options).unwrap();
        let second = codegen::generate(&grammar, target, &options).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_backends_run_concurrently_over_one_grammar() {
    let grammar = parse_grammar(CALC).unwrap();
    let options = GenOptions::default();

    let (rust, go) = thread::scope(|s| {
        let rust = s.spawn(|| codegen::generate(&grammar, Target::Rust, &options));
        let go = s.spawn(|| codegen::generate(&grammar, Target::Go, &options));
        (rust.join().unwrap(), go.join().unwrap())
    });

    assert_eq!(rust.unwrap(), codegen::generate(&grammar, Target::Rust, &options).unwrap());
    assert_eq!(go.unwrap(), codegen::generate(&grammar, Target::Go, &options).unwrap());
}

#[test]
fn test_generated_parsers_are_independent() {
    peg! {
        grammar arith = "
            Expr   <- Term (('+' / '-') Term)*
            Term   <- Factor (('*' / '/') Factor)*
            Factor <- Number / '(' Expr ')'^unclosed
            Number <- #([0-9]+)
        ";
    }

    let inputs = ["1 + 2 * 3", "(4 - 5) / 6", "7 * (8 + 9)", "10"];
    thread::scope(|s| {
        for input in inputs {
            s.spawn(move || {
                let value = arith::Parser::new(input).parse_Expr().unwrap().unwrap();
                assert_eq!(value.text(), input);
            });
        }
    });

    let err = arith::Parser::new("(1 + 2").parse_Expr().unwrap_err();
    assert_eq!(err.label(), Some("unclosed"));
}

#[test]
fn test_generator_go_output_for_files() {
    let env = TestEnv::new(&[
        ("lexical.peg", "Digit <- [0-9]\nSpace <- ' '"),
        ("calc.peg", "import Digit from \"lexical.peg\"\nNumber <- #(Digit+)"),
    ]);
    let code = env
        .generator()
        .generate("calc.peg", Target::Go)
        .unwrap();
    assert!(code.contains("func (p *Parser) ParseNumber() (parsing.Value, error) {"));
    assert!(code.contains("func (p *Parser) ParseDigit() (parsing.Value, error) {"));
    assert!(!code.contains("ParseSpace"));
    assert!(code.contains("parsing.OneOrMore(p, func(p parsing.Parser) (parsing.Value, error) {"));
    assert!(code.contains("return p.(*Parser).ParseDigit()"));
}

#[test]
fn test_generator_reports_errors() {
    let env = TestEnv::new(&[
        ("broken.peg", "S <- 'a' /"),
        ("missing.peg", "import Z from \"lib.peg\"\nS <- Z"),
        ("lib.peg", "A <- 'a'"),
        ("conflict.peg", "import * from \"x.peg\"\nimport * from \"y.peg\"\nS <- A"),
        ("x.peg", "A <- 'x'"),
        ("y.peg", "A <- 'y'"),
    ]);
    let generator = env.generator();

    assert!(matches!(
        generator.generate("broken.peg", Target::Rust),
        Err(Error::Syntax { .. })
    ));
    assert!(matches!(
        generator.generate("missing.peg", Target::Rust),
        Err(Error::MissingImport { .. })
    ));
    assert!(matches!(
        generator.generate("conflict.peg", Target::Go),
        Err(Error::ConflictingDefinition { .. })
    ));
    assert!(matches!(
        generator.generate("nowhere.peg", Target::Rust),
        Err(Error::Io { .. })
    ));
}
