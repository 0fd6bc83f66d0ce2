//! Narrowing scenarios for the nullness analysis.

use lyra_ast::{AstArena, ElementId, SymbolId};
use lyra_cfg::{CfgBuilder, CfgNodeId, ControlFlowGraph};
use lyra_common::ByteSpan;
use lyra_flow::nullness::NullnessAnalysis;
use lyra_flow::{PerNodeFacts, run};

const SP: ByteSpan = ByteSpan::ZERO;

const X: SymbolId = SymbolId(1);
const Y: SymbolId = SymbolId(2);

fn build(arena: &AstArena, function: ElementId) -> ControlFlowGraph {
    CfgBuilder::new(arena)
        .build(function)
        .expect("construction should succeed")
}

fn node_for(graph: &ControlFlowGraph, element: ElementId) -> CfgNodeId {
    graph
        .iter()
        .find(|(_, n)| n.element == Some(element))
        .map(|(id, _)| id)
        .expect("element should have a node")
}

fn analyze(
    arena: &AstArena,
    function: ElementId,
) -> (
    ControlFlowGraph,
    PerNodeFacts<lyra_flow::NullnessFacts>,
) {
    let graph = build(arena, function);
    let facts = run(&graph, &NullnessAnalysis::new(arena)).unwrap();
    (graph, facts)
}

#[test]
fn positive_null_test_narrows_the_then_branch_only() {
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, true, SP);
    let then_read = arena.access(X, SP);
    let then_body = arena.block(vec![then_read], SP);
    let else_read = arena.access(X, SP);
    let else_body = arena.block(vec![else_read], SP);
    let stmt = arena.if_else(cond, then_body, Some(else_body), SP);
    let body = arena.block(vec![stmt], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    assert!(facts.at(node_for(&graph, then_read)).unwrap().is_non_null(X));
    assert!(!facts.at(node_for(&graph, else_read)).unwrap().is_non_null(X));
}

#[test]
fn join_drops_facts_not_proved_on_every_path() {
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, true, SP);
    let then_stmt = arena.const_expr(SP);
    let stmt = arena.if_else(cond, then_stmt, None, SP);
    let after_read = arena.access(X, SP);
    let body = arena.block(vec![stmt, after_read], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    // The false path reaches the join without the fact, so the
    // intersection discards it.
    assert!(!facts.at(node_for(&graph, after_read)).unwrap().is_non_null(X));
}

#[test]
fn fact_survives_the_join_when_the_other_path_terminates() {
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, false, SP); // x == null
    let ret = arena.ret(None, SP);
    let stmt = arena.if_else(cond, ret, None, SP);
    let after_read = arena.access(X, SP);
    let body = arena.block(vec![stmt, after_read], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    // Only the condition-false path (x is not null) falls through.
    assert!(facts.at(node_for(&graph, after_read)).unwrap().is_non_null(X));
}

#[test]
fn assignment_kills_the_fact() {
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, true, SP);
    let value = arena.const_expr(SP);
    let write = arena.assign(X, value, SP);
    let read = arena.access(X, SP);
    let then_body = arena.block(vec![write, read], SP);
    let stmt = arena.if_else(cond, then_body, None, SP);
    let body = arena.block(vec![stmt], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    // Narrowed before the write, not after.
    assert!(facts.at(node_for(&graph, write)).unwrap().is_non_null(X));
    assert!(!facts.at(node_for(&graph, read)).unwrap().is_non_null(X));
}

#[test]
fn conjunction_narrows_both_operands() {
    let mut arena = AstArena::new();
    let left = arena.null_test(X, true, SP);
    let right = arena.null_test(Y, true, SP);
    let cond = arena.and(left, right, SP);
    let read = arena.access(X, SP);
    let then_body = arena.block(vec![read], SP);
    let stmt = arena.if_else(cond, then_body, None, SP);
    let body = arena.block(vec![stmt], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    let at_read = facts.at(node_for(&graph, read)).unwrap();
    assert!(at_read.is_non_null(X));
    assert!(at_read.is_non_null(Y));
}

#[test]
fn failed_disjunction_of_null_tests_narrows_after_the_check() {
    // if (x == null || y == null) return; -- past the if, both are non-null.
    let mut arena = AstArena::new();
    let left = arena.null_test(X, false, SP);
    let right = arena.null_test(Y, false, SP);
    let cond = arena.or(left, right, SP);
    let ret = arena.ret(None, SP);
    let stmt = arena.if_else(cond, ret, None, SP);
    let read = arena.access(X, SP);
    let body = arena.block(vec![stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    let at_read = facts.at(node_for(&graph, read)).unwrap();
    assert!(at_read.is_non_null(X));
    assert!(at_read.is_non_null(Y));
}

#[test]
fn loop_condition_narrows_the_body() {
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, true, SP);
    let read = arena.access(X, SP);
    let loop_body = arena.block(vec![read], SP);
    let while_stmt = arena.while_loop(cond, loop_body, None, SP);
    let body = arena.block(vec![while_stmt], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    assert!(facts.at(node_for(&graph, read)).unwrap().is_non_null(X));
}

#[test]
fn exhausted_loop_condition_narrows_after_the_loop() {
    // while (x == null) {} -- the loop only exits once x is non-null.
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, false, SP);
    let loop_body = arena.block(vec![], SP);
    let while_stmt = arena.while_loop(cond, loop_body, None, SP);
    let read = arena.access(X, SP);
    let body = arena.block(vec![while_stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    assert!(facts.at(node_for(&graph, read)).unwrap().is_non_null(X));
}

#[test]
fn fact_dies_when_its_scope_closes() {
    // The narrowing happens inside a nested block; reads after the block
    // must not see it.
    let mut arena = AstArena::new();
    let cond = arena.null_test(X, false, SP);
    let empty = arena.block(vec![], SP);
    let while_stmt = arena.while_loop(cond, empty, None, SP);
    let inner_read = arena.access(X, SP);
    let inner = arena.block(vec![while_stmt, inner_read], SP);
    let outer_read = arena.access(X, SP);
    let body = arena.block(vec![inner, outer_read], SP);
    let f = arena.function(vec![], body, SP);

    let (graph, facts) = analyze(&arena, f);

    assert!(facts.at(node_for(&graph, inner_read)).unwrap().is_non_null(X));
    assert!(!facts.at(node_for(&graph, outer_read)).unwrap().is_non_null(X));
}
