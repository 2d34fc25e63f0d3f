use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_slot_fitting() {
    assert!(NodeKind::CallExpression.fits(Slot::Expression));
    assert!(NodeKind::Identifier.fits(Slot::Expression));
    assert!(NodeKind::Identifier.fits(Slot::Identifier));
    assert!(!NodeKind::CallExpression.fits(Slot::Identifier));
    assert!(!NodeKind::FunctionDeclaration.fits(Slot::Expression));
    assert!(NodeKind::ImportNamespaceSpecifier.fits(Slot::ImportSpecifier));
    assert!(!NodeKind::ExportSpecifier.fits(Slot::ImportSpecifier));
    assert!(!NodeKind::Module.fits(Slot::Statement));
}

#[test]
fn test_statement_and_expression_are_disjoint() {
    let kinds = [
        NodeKind::Module,
        NodeKind::ImportDeclaration,
        NodeKind::FunctionDeclaration,
        NodeKind::Block,
        NodeKind::CallExpression,
        NodeKind::Identifier,
        NodeKind::BooleanLiteral,
    ];
    for kind in kinds {
        assert!(
            !(kind.is_statement() && kind.is_expression()),
            "{kind} is both"
        );
    }
}

#[test]
fn test_children_order_matches_source_order() {
    let id = |i| NodeId::new(i, 1);
    let data = NodeData::FunctionDeclaration {
        name: id(0),
        params: vec![id(1), id(2)],
        body: id(3),
    };
    let children: Vec<_> = data.children().into_iter().collect();
    assert_eq!(
        children,
        vec![
            (id(0), Slot::Identifier),
            (id(1), Slot::Parameter),
            (id(2), Slot::Parameter),
            (id(3), Slot::Block),
        ]
    );
}

#[test]
fn test_try_map_children_preserves_shape() {
    let id = |i| NodeId::new(i, 1);
    let data = NodeData::VariableDeclaration {
        name: id(0),
        init: None,
    };
    let mapped = data
        .try_map_children::<()>(|child, _| Ok(NodeId::new(child.index() as u32 + 10, 1)))
        .unwrap();
    assert_eq!(
        mapped,
        NodeData::VariableDeclaration {
            name: id(10),
            init: None,
        }
    );
}

#[test]
fn test_try_map_children_stops_at_first_error() {
    let id = |i| NodeId::new(i, 1);
    let data = NodeData::CallExpression {
        callee: id(0),
        arguments: vec![id(1), id(2)],
    };
    let mut seen = Vec::new();
    let result = data.try_map_children(|child, _| {
        seen.push(child);
        if child == id(1) {
            Err("stop")
        } else {
            Ok(child)
        }
    });
    assert_eq!(result, Err("stop"));
    assert_eq!(seen, vec![id(0), id(1)]);
}

#[test]
fn test_flags_roundtrip_through_bits() {
    let flags = NodeFlags::EXPORT | NodeFlags::DEFAULT;
    assert!(flags.contains(NodeFlags::EXPORT));
    assert!(!flags.contains(NodeFlags::TYPE_ONLY));
    assert_eq!(NodeFlags::from_bits_truncate(flags.bits()), flags);
}
