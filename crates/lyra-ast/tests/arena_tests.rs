use lyra_ast::{AstArena, Element, JumpKind, SymbolId};
use lyra_common::ByteSpan;

#[test]
fn alloc_returns_sequential_ids() {
    let mut arena = AstArena::new();
    let a = arena.const_expr(ByteSpan::ZERO);
    let b = arena.access(SymbolId(1), ByteSpan::ZERO);
    assert_eq!(a.0, 0);
    assert_eq!(b.0, 1);
    assert_eq!(arena.len(), 2);
}

#[test]
fn get_out_of_range_is_none() {
    let arena = AstArena::new();
    assert!(arena.get(lyra_ast::ElementId(0)).is_none());
    assert!(arena.is_empty());
}

#[test]
fn if_else_desugars_to_when() {
    let mut arena = AstArena::new();
    let cond = arena.null_test(SymbolId(0), true, ByteSpan::ZERO);
    let then_body = arena.block(vec![], ByteSpan::ZERO);
    let else_body = arena.block(vec![], ByteSpan::ZERO);
    let stmt = arena.if_else(cond, then_body, Some(else_body), ByteSpan::ZERO);

    match arena.get(stmt) {
        Some(Element::When {
            branches,
            is_exhaustive,
            ..
        }) => {
            assert_eq!(branches.len(), 2);
            assert!(branches[0].condition.is_some());
            assert!(branches[1].condition.is_none());
            assert!(!is_exhaustive);
        }
        other => panic!("expected When, got {other:?}"),
    }
}

#[test]
fn jump_constructors_set_kind() {
    let mut arena = AstArena::new();
    let ret = arena.ret(None, ByteSpan::ZERO);
    let brk = arena.brk(None, ByteSpan::ZERO);
    match (arena.get(ret), arena.get(brk)) {
        (
            Some(Element::Jump {
                kind: JumpKind::Return,
                ..
            }),
            Some(Element::Jump {
                kind: JumpKind::Break,
                ..
            }),
        ) => {}
        other => panic!("unexpected elements {other:?}"),
    }
}

#[test]
fn spans_are_preserved() {
    let mut arena = AstArena::new();
    let span = ByteSpan::new(12, 7);
    let id = arena.const_expr(span);
    assert_eq!(arena.get(id).map(|e| e.span()), Some(span));
}
