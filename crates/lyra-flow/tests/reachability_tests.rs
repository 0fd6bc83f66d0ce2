//! Unreachable-code diagnostics from the sealed graph.

use lyra_ast::{AstArena, ElementId};
use lyra_cfg::{CfgBuilder, ControlFlowGraph};
use lyra_common::ByteSpan;
use lyra_common::diagnostics::{DiagnosticCategory, diagnostic_codes};
use lyra_flow::ReachabilityReporter;

const SP: ByteSpan = ByteSpan::ZERO;

fn build(arena: &AstArena, function: ElementId) -> ControlFlowGraph {
    CfgBuilder::new(arena)
        .build(function)
        .expect("construction should succeed")
}

#[test]
fn a_run_of_dead_statements_yields_one_warning_covering_all_of_them() {
    let mut arena = AstArena::new();
    let ret = arena.ret(None, ByteSpan::new(0, 7));
    let dead_a = arena.const_expr(ByteSpan::new(10, 5));
    let dead_b = arena.const_expr(ByteSpan::new(20, 5));
    let body = arena.block(vec![ret, dead_a, dead_b], SP);
    let f = arena.function(vec![], body, SP);

    let graph = build(&arena, f);
    let reporter = ReachabilityReporter::new(&graph, &arena);
    let diagnostics = reporter.report("test.lyra");

    assert_eq!(diagnostics.len(), 1);
    let warning = &diagnostics[0];
    assert_eq!(warning.category, DiagnosticCategory::Warning);
    assert_eq!(warning.code, diagnostic_codes::UNREACHABLE_CODE);
    assert_eq!(warning.message_text, "unreachable code");
    // The region covers both dead statements.
    assert_eq!(warning.start, 10);
    assert_eq!(warning.length, 15);
}

#[test]
fn separate_dead_regions_yield_separate_warnings() {
    let mut arena = AstArena::new();

    let first_cond = arena.const_expr(SP);
    let first_brk = arena.brk(None, SP);
    let first_dead = arena.const_expr(ByteSpan::new(10, 5));
    let first_body = arena.block(vec![first_brk, first_dead], SP);
    let first_loop = arena.while_loop(first_cond, first_body, None, SP);

    let second_cond = arena.const_expr(SP);
    let second_brk = arena.brk(None, SP);
    let second_dead = arena.const_expr(ByteSpan::new(40, 5));
    let second_body = arena.block(vec![second_brk, second_dead], SP);
    let second_loop = arena.while_loop(second_cond, second_body, None, SP);

    let body = arena.block(vec![first_loop, second_loop], SP);
    let f = arena.function(vec![], body, SP);

    let graph = build(&arena, f);
    let reporter = ReachabilityReporter::new(&graph, &arena);
    let diagnostics = reporter.report("test.lyra");

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].start, 10);
    assert_eq!(diagnostics[1].start, 40);
}

#[test]
fn fully_live_code_yields_no_warnings() {
    let mut arena = AstArena::new();
    let cond = arena.const_expr(SP);
    let then_stmt = arena.const_expr(SP);
    let else_stmt = arena.const_expr(SP);
    let stmt = arena.if_else(cond, then_stmt, Some(else_stmt), SP);
    let body = arena.block(vec![stmt], SP);
    let f = arena.function(vec![], body, SP);

    let graph = build(&arena, f);
    let reporter = ReachabilityReporter::new(&graph, &arena);

    assert!(!reporter.has_unreachable_code());
    assert_eq!(reporter.unreachable_count(), 0);
    assert!(reporter.report("test.lyra").is_empty());
}

#[test]
fn reporter_exposes_per_node_reachability() {
    let mut arena = AstArena::new();
    let ret = arena.ret(None, SP);
    let dead = arena.const_expr(SP);
    let body = arena.block(vec![ret, dead], SP);
    let f = arena.function(vec![], body, SP);

    let graph = build(&arena, f);
    let reporter = ReachabilityReporter::new(&graph, &arena);

    let dead_node = graph
        .iter()
        .find(|(_, n)| n.element == Some(dead))
        .unwrap()
        .0;
    assert!(!reporter.is_reachable(dead_node));
    assert!(reporter.is_reachable(graph.enter_node()));
    assert!(reporter.has_unreachable_code());
}

#[test]
fn dead_code_after_a_non_returning_call_is_reported() {
    let mut arena = AstArena::new();
    let abort = arena.call_never(None, vec![], SP);
    let dead = arena.const_expr(ByteSpan::new(30, 4));
    let body = arena.block(vec![abort, dead], SP);
    let f = arena.function(vec![], body, SP);

    let graph = build(&arena, f);
    let reporter = ReachabilityReporter::new(&graph, &arena);
    let diagnostics = reporter.report("test.lyra");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].start, 30);
    assert_eq!(diagnostics[0].length, 4);
}
