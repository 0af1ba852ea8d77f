use peg_grammar::peg;
use peg_grammar::testing::Testable;

peg! {
    grammar assignment = "
        import Ident from \"tests/fixtures/lexical.peg\"
        import * from \"tests/fixtures/numbers.peg\"

        Assign <- Ident '=' Number
    ";
}

#[test]
fn test_imported_rules_are_generated() {
    assignment::Parser::new("x1 = 3.14")
        .parse_Assign()
        .test()
        .assert_matches("x1 = 3.14");
    assignment::Parser::new("x1 = ")
        .parse_Assign()
        .test()
        .assert_failure();
}

#[test]
fn test_only_selected_rules_and_dependencies_are_merged() {
    let mut rules = assignment::GRAMMAR_RULES.to_vec();
    rules.sort_unstable();
    assert_eq!(rules, ["Assign", "Digit", "Ident", "Letter", "Number"]);
}
