use super::*;
use crate::Slot;
use pretty_assertions::assert_eq;

#[test]
fn test_ids_are_scoped_to_their_arena() {
    let mut a = NodeArena::new();
    let b = NodeArena::new();
    assert_ne!(a.generation(), b.generation());

    let id = a.identifier("x");
    assert!(a.contains(id));
    assert!(!b.contains(id));
    assert_eq!(b.try_get(id), Err(IrError::StaleHandle(id)));
    assert!(b.handle(id).is_err());
}

#[test]
fn test_alloc_rejects_wrong_slot_kind() {
    let mut arena = NodeArena::new();
    let source = arena.string_literal("./m");
    let not_a_specifier = arena.identifier("x");

    let result = arena.alloc(
        NodeData::ImportDeclaration {
            source,
            specifiers: vec![not_a_specifier],
        },
        Span::DUMMY,
        NodeFlags::empty(),
    );
    assert_eq!(
        result,
        Err(IrError::StructuralMismatch {
            expected: Slot::ImportSpecifier,
            found: NodeKind::Identifier,
        })
    );
}

#[test]
fn test_update_keeps_span_and_flags() {
    let mut arena = NodeArena::new();
    let name = arena.identifier("f");
    let body = arena
        .alloc(
            NodeData::Block {
                statements: Vec::new(),
            },
            Span::DUMMY,
            NodeFlags::empty(),
        )
        .unwrap();
    let function = arena
        .alloc(
            NodeData::FunctionDeclaration {
                name,
                params: Vec::new(),
                body,
            },
            Span::new(4, 20),
            NodeFlags::EXPORT,
        )
        .unwrap();

    let renamed = arena.identifier("g");
    let updated = arena
        .update(
            function,
            NodeData::FunctionDeclaration {
                name: renamed,
                params: Vec::new(),
                body,
            },
        )
        .unwrap();

    assert_ne!(updated, function);
    assert_eq!(arena.get(updated).span, Span::new(4, 20));
    assert_eq!(arena.get(updated).flags, NodeFlags::EXPORT);
    assert_eq!(arena.handle(updated).unwrap().name(), Some("g"));
    assert_eq!(arena.handle(function).unwrap().name(), Some("f"));
}

#[test]
fn test_import_declaration_builder() {
    let mut arena = NodeArena::new();
    let specifier = arena.import_specifier("X", "X");
    let import = arena.import_declaration("./variable", vec![specifier]).unwrap();

    let node = arena.handle(import).unwrap();
    assert!(node.is_import_declaration());
    let kinds: Vec<_> = node.children().map(|c| c.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::ImportSpecifier, NodeKind::StringLiteral]);
    assert_eq!(node.children().last().and_then(|c| c.text()), Some("./variable"));
}

#[test]
fn test_with_statements_requires_statement_list() {
    let mut arena = NodeArena::new();
    let ident = arena.identifier("x");
    assert!(matches!(
        arena.with_statements(ident, Vec::new()),
        Err(IrError::Rejected { .. })
    ));
}

#[test]
fn test_descendants_pre_order() {
    let mut arena = NodeArena::new();
    let callee = arena.identifier("f");
    let arg = arena.number_literal(1.0);
    let call = arena.call(callee, vec![arg]).unwrap();
    let stmt = arena.expression_statement(call).unwrap();

    let kinds: Vec<_> = arena
        .handle(stmt)
        .unwrap()
        .descendants()
        .map(|n| n.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::ExpressionStatement,
            NodeKind::CallExpression,
            NodeKind::Identifier,
            NodeKind::NumberLiteral,
        ]
    );
}
