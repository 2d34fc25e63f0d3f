#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use arbor_diagnostic::ErrorCode;
use arbor_ir::NodeKind;
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> (NodeArena, NodeId) {
    let mut arena = NodeArena::new();
    let module = parse(source, &mut arena).expect("source should parse");
    (arena, module)
}

fn statement_kinds(source: &str) -> Vec<NodeKind> {
    let (arena, module) = parse_ok(source);
    let root = arena.handle(module).unwrap();
    root.statements().iter().map(|&s| arena.kind(s).unwrap()).collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let mut arena = NodeArena::new();
    parse(source, &mut arena)
        .expect_err("source should not parse")
        .into_iter()
        .map(|d| d.code)
        .collect()
}

#[test]
fn test_empty_program() {
    assert_eq!(statement_kinds(""), vec![]);
    assert_eq!(statement_kinds("  // nothing here\n"), vec![]);
}

#[test]
fn test_statement_kinds() {
    assert_eq!(
        statement_kinds(
            r#"
            import { X } from "./variable"
            export function f(a, b) { return a }
            class C { m() {} }
            const x = 1;
            let y
            { g() }
            print("hi")
            "#
        ),
        vec![
            NodeKind::ImportDeclaration,
            NodeKind::FunctionDeclaration,
            NodeKind::ClassDeclaration,
            NodeKind::VariableDeclaration,
            NodeKind::VariableDeclaration,
            NodeKind::Block,
            NodeKind::ExpressionStatement,
        ]
    );
}

#[test]
fn test_import_forms() {
    let (arena, module) = parse_ok(
        r#"
        import D, { a as b, c } from "./m"
        import * as ns from "./n"
        import type { T } from "./t"
        import "./side"
        "#,
    );
    let root = arena.handle(module).unwrap();
    let imports: Vec<_> = root.children().collect();
    assert_eq!(imports.len(), 4);

    let first: Vec<NodeKind> = imports[0]
        .children()
        .map(|c| c.kind())
        .collect();
    assert_eq!(
        first,
        vec![
            NodeKind::ImportDefaultSpecifier,
            NodeKind::ImportSpecifier,
            NodeKind::ImportSpecifier,
            NodeKind::StringLiteral,
        ]
    );

    let NodeData::ImportSpecifier { imported, local } = *imports[0].children().nth(1).unwrap().data()
    else {
        panic!("expected an import specifier");
    };
    assert_eq!(arena.text_of(imported), Some("a"));
    assert_eq!(arena.text_of(local), Some("b"));

    assert!(imports[1].children().next().unwrap().is_import_namespace_specifier());
    assert!(imports[2].flags().contains(NodeFlags::TYPE_ONLY));
    assert!(!imports[0].flags().contains(NodeFlags::TYPE_ONLY));
    assert_eq!(imports[3].children().count(), 1);
}

#[test]
fn test_default_import_named_type() {
    let (arena, module) = parse_ok(r#"import type from "./t""#);
    let import = arena.handle(module).unwrap().children().next().unwrap();
    assert!(!import.flags().contains(NodeFlags::TYPE_ONLY));
    assert!(import.children().next().unwrap().is_import_default_specifier());
}

#[test]
fn test_export_forms() {
    let (arena, module) = parse_ok(
        r#"
        export default class Main {}
        export const answer = 42
        export { a as b, c } from "./m"
        "#,
    );
    let root = arena.handle(module).unwrap();
    let stmts: Vec<_> = root.children().collect();
    assert_eq!(stmts[0].flags(), NodeFlags::EXPORT | NodeFlags::DEFAULT);
    assert_eq!(stmts[0].name(), Some("Main"));
    assert!(stmts[1].flags().contains(NodeFlags::EXPORT | NodeFlags::CONST));
    let NodeData::ExportNamedDeclaration { specifiers, source } = stmts[2].data() else {
        panic!("expected export declaration");
    };
    assert_eq!(specifiers.len(), 2);
    assert_eq!(source.and_then(|s| arena.text_of(s)), Some("./m"));
}

#[test]
fn test_call_and_member_chain() {
    let (arena, module) = parse_ok("a.b(c)(1).d");
    let stmt = arena.handle(module).unwrap().children().next().unwrap();
    let expr = stmt.children().next().unwrap();
    assert_eq!(expr.kind(), NodeKind::MemberExpression);
    let call = expr.children().next().unwrap();
    assert_eq!(call.kind(), NodeKind::CallExpression);
}

#[test]
fn test_new_without_arguments() {
    let (arena, module) = parse_ok("const p = new lib.Point");
    let decl = arena.handle(module).unwrap().children().next().unwrap();
    let init = decl.children().nth(1).unwrap();
    assert!(init.is_new_expression());
    assert!(init.children().next().unwrap().is_member_expression());
}

#[test]
fn test_spans_cover_statement() {
    let source = "function f() {}";
    let (arena, module) = parse_ok(source);
    let func = arena.handle(module).unwrap().children().next().unwrap();
    assert_eq!(func.span(), Span::new(0, 15));
}

#[test]
fn test_string_escapes_are_cooked() {
    let (arena, module) = parse_ok(r#"print("a\"b")"#);
    let literal = arena
        .handle(module)
        .unwrap()
        .descendants()
        .find(|n| n.is_string_literal())
        .unwrap();
    assert_eq!(literal.text(), Some("a\"b"));
}

#[test]
fn test_static_method_flag() {
    let (arena, module) = parse_ok("class C { static make() {} static() {} }");
    let methods: Vec<_> = arena
        .handle(module)
        .unwrap()
        .descendants()
        .filter(|n| n.is_method_definition())
        .collect();
    assert!(methods[0].flags().contains(NodeFlags::STATIC));
    assert_eq!(methods[1].name(), Some("static"));
    assert!(!methods[1].flags().contains(NodeFlags::STATIC));
}

#[test]
fn test_errors_recover_per_statement() {
    let codes = error_codes("import { from \"./x\"\nfunction ok() {}\nexport 5");
    assert_eq!(codes.len(), 2);
    assert!(codes.iter().all(ErrorCode::is_parser_error));
}

#[test]
fn test_lexer_errors_have_lexer_codes() {
    assert_eq!(error_codes("a # b"), vec![ErrorCode::E0002]);
    assert!(error_codes("import \"./x\nfoo").contains(&ErrorCode::E0001));
}

#[test]
fn test_unclosed_block() {
    assert!(error_codes("function f() { g()").contains(&ErrorCode::E1003));
}

#[test]
fn test_import_source_must_be_string() {
    assert!(error_codes("import { a } from b").contains(&ErrorCode::E1005));
}

#[test]
fn test_error_mentions_context() {
    let mut arena = NodeArena::new();
    let errors = parse("import { 1 } from \"./x\"", &mut arena).unwrap_err();
    assert!(errors[0]
        .notes
        .iter()
        .any(|n| n == "while parsing an import declaration"));
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
    let (arena, module) = parse_ok(&source);
    assert_eq!(arena.handle(module).unwrap().statements().len(), 1);
}

#[test]
fn test_declare_modifier() {
    let (arena, module) = parse_ok("declare function print(value) {}\ndeclare(1)");
    let stmts: Vec<_> = arena.handle(module).unwrap().children().collect();
    assert_eq!(stmts[0].flags(), NodeFlags::DECLARE);
    assert!(stmts[1].is_expression_statement());
}

#[test]
fn test_return_argument_must_share_the_line() {
    assert_eq!(
        statement_kinds("return\nf()"),
        vec![NodeKind::ReturnStatement, NodeKind::ExpressionStatement]
    );
    assert_eq!(statement_kinds("return f(\n1)"), vec![NodeKind::ReturnStatement]);

    let (arena, module) = parse_ok("function g() { return\n}");
    let body = arena
        .handle(module)
        .unwrap()
        .descendants()
        .find(|node| node.kind() == NodeKind::ReturnStatement)
        .unwrap();
    assert!(matches!(body.data(), NodeData::ReturnStatement { argument: None }));
}
