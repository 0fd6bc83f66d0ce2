//! Definite-assignment scenarios.

use lyra_ast::{AstArena, ElementId, SymbolId};
use lyra_cfg::{CfgBuilder, ControlFlowGraph};
use lyra_common::ByteSpan;
use lyra_common::diagnostics::diagnostic_codes;
use lyra_flow::assignment::{AssignmentAnalysis, AssignmentState};
use lyra_flow::run;

const SP: ByteSpan = ByteSpan::ZERO;

const V: SymbolId = SymbolId(1);

fn build(arena: &AstArena, function: ElementId) -> ControlFlowGraph {
    CfgBuilder::new(arena)
        .build(function)
        .expect("construction should succeed")
}

fn check(arena: &AstArena, function: ElementId) -> Vec<lyra_common::diagnostics::Diagnostic> {
    let graph = build(arena, function);
    let analysis = AssignmentAnalysis::new(arena);
    let facts = run(&graph, &analysis).unwrap();
    analysis.check(&graph, &facts, "test.lyra")
}

#[test]
fn initialized_declaration_is_definitely_assigned() {
    let mut arena = AstArena::new();
    let init = arena.const_expr(SP);
    let decl = arena.var_decl(V, Some(init), SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, read], SP);
    let f = arena.function(vec![], body, SP);

    assert!(check(&arena, f).is_empty());
}

#[test]
fn read_before_any_assignment_is_an_error() {
    let mut arena = AstArena::new();
    let decl = arena.var_decl(V, None, SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, read], SP);
    let f = arena.function(vec![], body, SP);

    let diagnostics = check(&arena, f);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::USE_BEFORE_ASSIGNMENT);
    assert_eq!(
        diagnostics[0].message_text,
        "variable is used before being assigned"
    );
}

#[test]
fn assignment_in_only_one_branch_is_maybe_assigned() {
    let mut arena = AstArena::new();
    let decl = arena.var_decl(V, None, SP);
    let cond = arena.const_expr(SP);
    let value = arena.const_expr(SP);
    let write = arena.assign(V, value, SP);
    let stmt = arena.if_else(cond, write, None, SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    let diagnostics = check(&arena, f);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message_text,
        "variable may be used before being assigned"
    );
}

#[test]
fn assignment_in_both_branches_is_definite() {
    let mut arena = AstArena::new();
    let decl = arena.var_decl(V, None, SP);
    let cond = arena.const_expr(SP);
    let then_value = arena.const_expr(SP);
    let then_write = arena.assign(V, then_value, SP);
    let else_value = arena.const_expr(SP);
    let else_write = arena.assign(V, else_value, SP);
    let stmt = arena.if_else(cond, then_write, Some(else_write), SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    assert!(check(&arena, f).is_empty());
}

#[test]
fn assignment_inside_loop_body_stays_maybe_after_the_loop() {
    // The loop body may run zero times.
    let mut arena = AstArena::new();
    let decl = arena.var_decl(V, None, SP);
    let cond = arena.const_expr(SP);
    let value = arena.const_expr(SP);
    let write = arena.assign(V, value, SP);
    let loop_body = arena.block(vec![write], SP);
    let while_stmt = arena.while_loop(cond, loop_body, None, SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, while_stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    let diagnostics = check(&arena, f);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message_text,
        "variable may be used before being assigned"
    );
}

#[test]
fn do_while_body_always_runs_so_its_assignment_is_definite() {
    let mut arena = AstArena::new();
    let decl = arena.var_decl(V, None, SP);
    let cond = arena.const_expr(SP);
    let value = arena.const_expr(SP);
    let write = arena.assign(V, value, SP);
    let loop_body = arena.block(vec![write], SP);
    let do_stmt = arena.do_while(cond, loop_body, None, SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, do_stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    assert!(check(&arena, f).is_empty());
}

#[test]
fn state_lattice_joins_disagreement_to_maybe() {
    let mut arena = AstArena::new();
    let decl = arena.var_decl(V, None, SP);
    let cond = arena.const_expr(SP);
    let value = arena.const_expr(SP);
    let write = arena.assign(V, value, SP);
    let stmt = arena.if_else(cond, write, None, SP);
    let read = arena.access(V, SP);
    let body = arena.block(vec![decl, stmt, read], SP);
    let f = arena.function(vec![], body, SP);

    let graph = build(&arena, f);
    let analysis = AssignmentAnalysis::new(&arena);
    let facts = run(&graph, &analysis).unwrap();
    let read_node = graph
        .iter()
        .find(|(_, n)| n.element == Some(read))
        .unwrap()
        .0;
    assert_eq!(
        facts.at(read_node).unwrap().state_of(V),
        Some(AssignmentState::MaybeAssigned)
    );
}

#[test]
fn untracked_symbols_are_never_reported() {
    // Reads of parameters or captured symbols (never declared in this body)
    // are outside this analysis's scope.
    let mut arena = AstArena::new();
    let read = arena.access(SymbolId(42), SP);
    let body = arena.block(vec![read], SP);
    let f = arena.function(vec![], body, SP);

    assert!(check(&arena, f).is_empty());
}
