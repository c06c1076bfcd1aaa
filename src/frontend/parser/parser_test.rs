use crate::frontend::{
    error_codes::{EXPECTED_EXPRESSION, INVALID_NAMED_PAIR, INVALID_PARAMETER, UNEXPECTED_TOKEN},
    expression::Expression,
    lexer::Lexer,
    parser::{Parser, parse},
    program::Program,
    statement::Statement,
};

fn parse_ok(input: &str) -> Program {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    assert!(
        parser.errors.is_empty(),
        "parser errors: {:?}",
        parser.errors
    );
    program
}

fn first_error_code(input: &str) -> String {
    let errors = parse(input).expect_err("expected a parse error");
    errors[0].code.clone().unwrap_or_default()
}

fn expression_text(input: &str) -> String {
    let program = parse_ok(input);
    match &program.statements[0] {
        Statement::Expression { expression } => expression.to_string(),
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn parses_required_declarations_in_order() {
    let program = parse_ok("@required A;\n@required B;\nA + B");
    assert_eq!(program.statements.len(), 3);
    match (&program.statements[0], &program.statements[1]) {
        (Statement::Required { name: a, .. }, Statement::Required { name: b, .. }) => {
            assert_eq!((a.as_str(), b.as_str()), ("A", "B"));
        }
        other => panic!("expected required declarations, got {:?}", other),
    }
}

#[test]
fn let_is_an_ordinary_identifier() {
    let program = parse_ok("@required let; let(1)");
    assert!(matches!(
        &program.statements[1],
        Statement::Expression {
            expression: Expression::Call { .. }
        }
    ));
}

#[test]
fn parses_define_and_assign() {
    let program = parse_ok("x := 1; x = x + 1;");
    assert!(matches!(&program.statements[0], Statement::Define { name, .. } if name == "x"));
    assert!(matches!(&program.statements[1], Statement::Assign { name, .. } if name == "x"));
}

#[test]
fn operator_precedence() {
    assert_eq!(expression_text("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(expression_text("-a * b"), "((-a) * b)");
    assert_eq!(expression_text("a or b and c"), "(a || (b && c))");
    assert_eq!(expression_text("not a == b"), "((!a) == b)");
    assert_eq!(expression_text("0..n + 1"), "(0 .. (n + 1))");
    assert_eq!(expression_text("a < b == c > d"), "((a < b) == (c > d))");
}

#[test]
fn named_pairs_are_right_associative_and_loosest() {
    assert_eq!(expression_text("a => b => 1 + 2"), "(a => (b => (1 + 2)))");
    assert_eq!(expression_text("\"k\" => 1"), "(k => 1)");
}

#[test]
fn tuples_and_grouping() {
    assert_eq!(expression_text("()"), "()");
    assert_eq!(expression_text("(1)"), "1");
    assert_eq!(expression_text("(1,)"), "(1,)");
    assert_eq!(expression_text("(1, 2, 3,)"), "(1, 2, 3)");
}

#[test]
fn postfix_chains() {
    assert_eq!(expression_text("f(1, x => 2)[0].name"), "(f(1, (x => 2))[0]).name");
}

#[test]
fn lambdas() {
    assert_eq!(expression_text("(a, b) -> a + b"), "(a, b) -> { (a + b) }");
    assert_eq!(expression_text("() -> { return 1; }"), "() -> { return 1; }");
    assert_eq!(expression_text("(n => 2) -> n"), "(n => 2) -> { n }");
    assert_eq!(expression_text("(x) -> x"), "(x) -> { x }");
}

#[test]
fn lambda_in_argument_list() {
    assert_eq!(expression_text("map((x) -> x * 2, t)"), "map((x) -> { (x * 2) }, t)");
}

#[test]
fn while_and_if_else_chains() {
    let program = parse_ok(
        "while i < 10 { i = i + 1; if i == 5 { break; } else if i == 6 { continue } else { x } }",
    );
    let Statement::While { body, .. } = &program.statements[0] else {
        panic!("expected while");
    };
    let Statement::If { alternative, .. } = &body.statements[1] else {
        panic!("expected if");
    };
    let alternative = alternative.as_ref().expect("else branch");
    assert!(matches!(alternative.statements[0], Statement::If { .. }));
}

#[test]
fn trailing_semicolon_is_optional() {
    assert_eq!(parse_ok("1; 2").statements.len(), 2);
    assert_eq!(parse_ok("1; 2;").statements.len(), 2);
}

#[test]
fn missing_semicolon_is_reported() {
    assert_eq!(first_error_code("x := 1 y := 2"), UNEXPECTED_TOKEN.code);
}

#[test]
fn dangling_operator_is_reported() {
    assert_eq!(first_error_code("1 +"), EXPECTED_EXPRESSION.code);
}

#[test]
fn invalid_named_pair_is_reported() {
    assert_eq!(first_error_code("1 => 2"), INVALID_NAMED_PAIR.code);
}

#[test]
fn invalid_parameter_is_reported() {
    assert_eq!(first_error_code("(a + b) -> a"), INVALID_PARAMETER.code);
    assert_eq!(first_error_code("(a => b) -> a"), INVALID_PARAMETER.code);
}

#[test]
fn unterminated_block_is_reported() {
    assert_eq!(first_error_code("while x { x"), UNEXPECTED_TOKEN.code);
}

#[test]
fn error_positions_are_recorded() {
    let errors = parse("x := ;").unwrap_err();
    let position = errors[0].position.expect("position");
    assert_eq!((position.line, position.column), (1, 5));
}
