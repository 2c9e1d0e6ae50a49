// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! End-to-end tests of the heuristic planner.

use std::sync::Arc;

use hep_optimizer::cost::{Cost, CostModel, MetadataQuery};
use hep_optimizer::expr::{BinaryOperator, ScalarExpr};
use hep_optimizer::heuristic::{HepConfig, HepError, HepPlanner, HepProgram, MatchOrder};
use hep_optimizer::plan_nodes::*;
use hep_optimizer::rules::*;
use hep_optimizer::traits::{Convention, Distribution, TraitSet};
use test_case::test_case;

mod common;
use common::*;

fn plan(
    program: HepProgram,
    config: HepConfig,
    rules: Vec<RuleRef>,
    root: PlanRef,
) -> anyhow::Result<(HepPlanner, PlanRef)> {
    init_logger();
    let mut planner = HepPlanner::with_config(program, config);
    for rule in rules {
        planner.add_rule(rule);
    }
    planner.set_root(root)?;
    let best = planner.find_best_exp()?;
    Ok((planner, best))
}

fn checked() -> HepConfig {
    HepConfig {
        check_consistency: true,
        ..HepConfig::default()
    }
}

fn limit_chain() -> PlanRef {
    let mut plan = scan("t", &["a", "b"], 1000);
    for n in [10, 20, 30, 40, 50] {
        plan = limit(0, n, plan);
    }
    plan
}

#[test]
fn leaf_then_singles_become_physical() -> anyhow::Result<()> {
    let root = filter(gt(1, 2), filter(gt(0, 1), scan("t", &["a", "b"], 100)));
    let program = HepProgram::builder()
        .add_match_order(MatchOrder::BottomUp)
        .add_rule_instance(Arc::new(ConverterRule::table_scan()))
        .add_converters(false)
        .build()?;
    let (planner, best) = plan(
        program,
        checked(),
        vec![Arc::new(ConverterRule::filter()) as RuleRef],
        root,
    )?;

    assert_eq!(
        best.explain_string(),
        "PhysicalFilter: expr ($1 > 2)\n  PhysicalFilter: expr ($0 > 1)\n    PhysicalTableScan: table t, columns [a, b]\n"
    );
    assert_eq!(planner.graph().len(), 3);
    Ok(())
}

#[test]
fn root_trait_request_drives_conversion() -> anyhow::Result<()> {
    init_logger();
    let root = filter(gt(1, 2), filter(gt(0, 1), scan("t", &["a", "b"], 100)));
    let program = HepProgram::builder().add_converters(false).build()?;
    let mut planner = HepPlanner::with_config(program, checked());
    planner.add_rule(Arc::new(ConverterRule::table_scan()));
    planner.add_rule(Arc::new(ConverterRule::filter()));
    planner.set_root(root)?;
    let root_ref = planner.root().unwrap();
    planner.change_traits(&root_ref, TraitSet::physical());

    let best = planner.find_best_exp()?;
    assert_eq!(
        best.explain_string(),
        "PhysicalFilter: expr ($1 > 2)\n  PhysicalFilter: expr ($0 > 1)\n    PhysicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

#[test]
fn unrequested_conversion_does_not_fire() -> anyhow::Result<()> {
    let root = filter(gt(0, 1), scan("t", &["a", "b"], 100));
    let program = HepProgram::builder().add_converters(false).build()?;
    let (_, best) = plan(
        program,
        checked(),
        ConverterRule::all_physical(),
        root.clone(),
    )?;
    assert_eq!(best.explain_string(), root.explain_string());
    Ok(())
}

#[test]
fn grouped_converters_fire_without_request() -> anyhow::Result<()> {
    let root = filter(gt(0, 1), scan("t", &["a", "b"], 100));
    let program = HepProgram::builder()
        .add_group_begin()
        .add_converters(false)
        .add_common_rel_sub_expr_instruction()
        .add_group_end()
        .build()?;
    let (_, best) = plan(program, checked(), ConverterRule::all_physical(), root)?;
    assert_eq!(
        best.explain_string(),
        "PhysicalFilter: expr ($0 > 1)\n  PhysicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

#[test]
fn converter_rewires_only_parents_asking_for_its_trait() -> anyhow::Result<()> {
    let shared = scan("t", &["a", "b"], 100);
    let physical =
        PhysicalFilter::new(LogicalFilter::new(gt(0, 1), shared.clone())).into_plan_ref();
    let logical = filter(gt(1, 2), shared);
    let root = LogicalJoin::new(physical, logical, JoinOperator::Inner, ScalarExpr::bool(true))
        .into_plan_ref();
    let program = HepProgram::builder().add_converters(false).build()?;
    let (planner, _) = plan(
        program,
        checked(),
        vec![Arc::new(ConverterRule::table_scan()) as RuleRef],
        root,
    )?;

    let graph = planner.graph();
    assert_eq!(graph.len(), 5);
    let join = graph.root().unwrap();
    let children = graph.children(join).to_vec();
    assert_eq!(children.len(), 2);
    let child_type = |v| {
        let grandchildren = graph.children(v);
        assert_eq!(grandchildren.len(), 1);
        graph.node(grandchildren[0]).unwrap().node_type()
    };
    assert_eq!(
        graph.node(children[0]).unwrap().node_type(),
        PlanNodeType::PhysicalFilter
    );
    assert_eq!(child_type(children[0]), PlanNodeType::PhysicalTableScan);
    assert_eq!(
        graph.node(children[1]).unwrap().node_type(),
        PlanNodeType::LogicalFilter
    );
    assert_eq!(child_type(children[1]), PlanNodeType::LogicalTableScan);
    Ok(())
}

#[test]
fn shared_child_has_one_vertex() -> anyhow::Result<()> {
    let left = filter(gt(0, 1), filter(gt(1, 2), scan("t", &["a", "b"], 100)));
    let right = filter(gt(0, 3), filter(gt(1, 4), scan("t", &["a", "b"], 100)));
    let root =
        LogicalJoin::new(left, right, JoinOperator::Inner, ScalarExpr::bool(true)).into_plan_ref();
    let program = HepProgram::builder()
        .add_rule_instance(Arc::new(FilterMergeRule::new()))
        .build()?;
    let (planner, best) = plan(program, checked(), vec![], root)?;

    let graph = planner.graph();
    let scans = graph
        .vertices()
        .filter(|v| v.node().node_type() == PlanNodeType::LogicalTableScan)
        .map(|v| v.id())
        .collect::<Vec<_>>();
    assert_eq!(scans.len(), 1);
    let scan_vertex = scans[0];
    assert_eq!(
        graph.lookup(&graph.node(scan_vertex).unwrap().digest()),
        Some(scan_vertex)
    );

    let join = graph.root().unwrap();
    let filters = graph.children(join).to_vec();
    assert_eq!(filters.len(), 2);
    for &f in &filters {
        assert_eq!(graph.children(f), &[scan_vertex]);
    }
    let mut parents = graph.parents(scan_vertex).to_vec();
    parents.sort();
    let mut expected = filters.clone();
    expected.sort();
    assert_eq!(parents, expected);

    assert_eq!(
        best.explain_string(),
        "LogicalJoin: op Inner, predicate true\n  LogicalFilter: expr (($1 > 2) and ($0 > 1))\n    LogicalTableScan: table t, columns [a, b]\n  LogicalFilter: expr (($1 > 4) and ($0 > 3))\n    LogicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

/// Proposes three limits in place of `limit 100`.
struct ProposeLimitsRule {
    operand: Operand,
}

impl ProposeLimitsRule {
    fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalLimit)
                .with_predicate(|node| node.as_logical_limit().map_or(false, |l| l.limit() == 100)),
        }
    }
}

impl Rule for ProposeLimitsRule {
    fn description(&self) -> &str {
        "ProposeLimitsRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let child = call.node(0).children()[0].clone();
        for (offset, n) in [(0, 5), (1, 2), (2, 2)] {
            call.transform_to(limit(offset, n, child.clone()));
        }
    }
}

/// Costs a limit by its limit, everything else is free.
struct LimitCostModel;

impl CostModel for LimitCostModel {
    fn non_cumulative_cost(&self, plan: &PlanRef, _mq: &MetadataQuery<'_>) -> Cost {
        match plan.as_logical_limit() {
            Some(l) => Cost::new(0.0, l.limit() as f64, 0.0),
            None => Cost::zero(),
        }
    }

    fn rows(&self, _plan: &PlanRef, _mq: &MetadataQuery<'_>) -> f64 {
        1.0
    }
}

#[test]
fn cheapest_result_wins_and_ties_go_first() -> anyhow::Result<()> {
    init_logger();
    let program = HepProgram::builder()
        .add_rule_instance(Arc::new(ProposeLimitsRule::new()))
        .build()?;
    let mut planner = HepPlanner::new(program).with_cost_model(Arc::new(LimitCostModel));
    planner.set_root(limit(0, 100, scan("t", &["a"], 10)))?;
    let best = planner.find_best_exp()?;
    assert_eq!(
        best.explain_string(),
        "LogicalLimit: offset 1, limit 2\n  LogicalTableScan: table t, columns [a]\n"
    );
    Ok(())
}

#[test]
fn match_limit_stops_after_one_firing() -> anyhow::Result<()> {
    init_logger();
    let log = EventLog::default();
    let program = HepProgram::builder()
        .add_match_limit(1)
        .add_rule_instance(Arc::new(LimitMergeRule::new()))
        .build()?;
    let mut planner = HepPlanner::new(program).with_listener(Box::new(log.clone()));
    planner.set_root(limit_chain())?;
    let best = planner.find_best_exp()?;

    assert_eq!(log.count("transform before"), 1);
    assert_eq!(log.count("transform after"), 1);
    assert_eq!(
        best.explain_string(),
        "LogicalLimit: offset 0, limit 40\n  LogicalLimit: offset 0, limit 30\n    LogicalLimit: offset 0, limit 20\n      LogicalLimit: offset 0, limit 10\n        LogicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

#[test_case(MatchOrder::Arbitrary)]
#[test_case(MatchOrder::DepthFirst)]
#[test_case(MatchOrder::TopDown)]
#[test_case(MatchOrder::BottomUp)]
fn limits_merge_to_fixpoint(order: MatchOrder) -> anyhow::Result<()> {
    let program = HepProgram::builder()
        .add_match_order(order)
        .add_rule_instance(Arc::new(LimitMergeRule::new()))
        .build()?;
    let (planner, best) = plan(program, checked(), vec![], limit_chain())?;
    assert_eq!(
        best.explain_string(),
        "LogicalLimit: offset 0, limit 10\n  LogicalTableScan: table t, columns [a, b]\n"
    );
    assert_eq!(planner.graph().len(), 2);
    Ok(())
}

#[test]
fn sub_program_runs_until_nothing_changes() -> anyhow::Result<()> {
    init_logger();
    let log = EventLog::default();
    let sub = HepProgram::builder()
        .add_match_limit(1)
        .add_rule_instance(Arc::new(LimitMergeRule::new()))
        .build()?;
    let program = HepProgram::builder().add_sub_program(sub).build()?;
    let mut planner = HepPlanner::new(program).with_listener(Box::new(log.clone()));
    planner.set_root(limit_chain())?;
    let best = planner.find_best_exp()?;

    assert_eq!(log.count("transform before"), 4);
    assert_eq!(
        best.explain_string(),
        "LogicalLimit: offset 0, limit 10\n  LogicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

#[test]
fn group_applies_rules_together() -> anyhow::Result<()> {
    let root = limit(
        0,
        10,
        limit(
            0,
            5,
            filter(
                ScalarExpr::bool(true),
                filter(ScalarExpr::bool(true), scan("t", &["a", "b"], 100)),
            ),
        ),
    );
    let program = HepProgram::builder()
        .add_group_begin()
        .add_rule_instance(Arc::new(FilterMergeRule::new()))
        .add_rule_instance(Arc::new(LimitMergeRule::new()))
        .add_group_end()
        .build()?;
    let (_, best) = plan(program, checked(), vec![], root)?;
    assert_eq!(
        best.explain_string(),
        "LogicalLimit: offset 0, limit 5\n  LogicalFilter: expr true\n    LogicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

#[test]
fn rules_by_description_and_class() -> anyhow::Result<()> {
    let root = limit(0, 10, limit(0, 5, scan("t", &["a"], 100)));
    let program = HepProgram::builder()
        .add_rule_by_description("FilterMergeRule")
        .add_rule_class::<LimitMergeRule>()
        .build()?;
    let (_, best) = plan(
        program,
        checked(),
        vec![
            Arc::new(FilterMergeRule::new()) as RuleRef,
            Arc::new(LimitMergeRule::new()),
        ],
        root,
    )?;
    assert_eq!(
        best.explain_string(),
        "LogicalLimit: offset 0, limit 5\n  LogicalTableScan: table t, columns [a]\n"
    );
    Ok(())
}

#[test]
fn unknown_rule_description_is_an_error() -> anyhow::Result<()> {
    init_logger();
    let program = HepProgram::builder()
        .add_rule_by_description("NoSuchRule")
        .build()?;
    let mut planner = HepPlanner::new(program);
    planner.set_root(scan("t", &["a"], 1))?;
    assert_eq!(
        planner.find_best_exp().unwrap_err(),
        HepError::RuleNotFound("NoSuchRule".into())
    );
    Ok(())
}

#[test]
fn root_must_be_set() {
    let mut planner = HepPlanner::new(HepProgram::default());
    assert_eq!(planner.find_best_exp().unwrap_err(), HepError::RootNotSet);
}

#[test]
fn rule_registration() {
    let mut planner = HepPlanner::new(HepProgram::default());
    assert!(planner.add_rule(Arc::new(FilterMergeRule::new())));
    assert!(!planner.add_rule(Arc::new(FilterMergeRule::new())));
    assert!(planner.add_rule(Arc::new(LimitMergeRule::new())));
    assert_eq!(planner.rules().len(), 2);
    assert!(planner.remove_rule("FilterMergeRule"));
    assert!(!planner.remove_rule("FilterMergeRule"));
    planner.clear();
    assert!(planner.rules().is_empty());
}

#[test]
fn identical_inputs_share_a_vertex_unless_no_dag() -> anyhow::Result<()> {
    init_logger();
    let join = || {
        LogicalJoin::new(
            scan("t", &["a"], 10),
            scan("t", &["a"], 10),
            JoinOperator::Inner,
            ScalarExpr::bool(true),
        )
        .into_plan_ref()
    };

    let mut dag = HepPlanner::new(HepProgram::default());
    dag.set_root(join())?;
    assert_eq!(dag.graph().len(), 2);
    let root = dag.graph().root().unwrap();
    assert_eq!(dag.graph().children(root).len(), 1);

    let config: HepConfig = serde_json::from_str(r#"{ "no_dag": true }"#)?;
    let mut tree = HepPlanner::with_config(HepProgram::default(), config);
    tree.set_root(join())?;
    assert_eq!(tree.graph().len(), 3);
    let root = tree.graph().root().unwrap();
    assert_eq!(tree.graph().children(root).len(), 2);

    assert_eq!(
        dag.find_best_exp()?.explain_string(),
        tree.find_best_exp()?.explain_string()
    );
    Ok(())
}

/// Turns a scan read by two or more consumers into a physical scan.
struct SharedScanRule {
    operand: Operand,
}

impl SharedScanRule {
    fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalTableScan),
        }
    }
}

impl Rule for SharedScanRule {
    fn description(&self) -> &str {
        "SharedScanRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        assert!(call.parents().map_or(0, |p| p.len()) >= 2);
        if let Some(scan) = call.node(0).as_logical_table_scan() {
            call.transform_to(PhysicalTableScan::new(scan.clone()).into_plan_ref());
        }
    }

    fn kind(&self) -> RuleKind {
        RuleKind::CommonSubExpr
    }
}

#[test_case(false => "LogicalJoin: op Inner, predicate true\n  PhysicalTableScan: table t, columns [a]\n  PhysicalTableScan: table t, columns [a]\n"; "dag")]
#[test_case(true => "LogicalJoin: op Inner, predicate true\n  LogicalTableScan: table t, columns [a]\n  LogicalTableScan: table t, columns [a]\n"; "tree")]
fn common_sub_expression_rules(no_dag: bool) -> String {
    let root = LogicalJoin::new(
        scan("t", &["a"], 10),
        scan("t", &["a"], 10),
        JoinOperator::Inner,
        ScalarExpr::bool(true),
    )
    .into_plan_ref();
    let program = HepProgram::builder()
        .add_common_rel_sub_expr_instruction()
        .build()
        .unwrap();
    let config = HepConfig {
        no_dag,
        ..checked()
    };
    let rules = vec![Arc::new(SharedScanRule::new()) as RuleRef];
    let (_, best) = plan(program, config, rules, root).unwrap();
    best.explain_string()
}

#[test]
fn garbage_is_collected() -> anyhow::Result<()> {
    let mut root = scan("t", &["a", "b"], 100);
    for i in 0..4 {
        root = filter(gt(0, i), root);
    }
    let program = HepProgram::builder()
        .add_rule_instance(Arc::new(FilterMergeRule::new()))
        .build()?;
    let (planner, best) = plan(program, checked(), vec![], root)?;

    let graph = planner.graph();
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.breadth_first().len(), graph.len());
    assert_eq!(graph.digest_index_len(), 2);
    graph.check_consistency(true)?;
    assert_eq!(best.explain_string().lines().count(), 2);
    Ok(())
}

#[test]
fn extraction_is_idempotent() -> anyhow::Result<()> {
    init_logger();
    let program = HepProgram::builder()
        .add_rule_instance(Arc::new(LimitMergeRule::new()))
        .build()?;
    let mut planner = HepPlanner::new(program);
    planner.set_root(limit_chain())?;
    let first = planner.find_best_exp()?;
    let transformations = planner.n_transformations();
    let second = planner.find_best_exp()?;
    assert_eq!(first.explain_string(), second.explain_string());
    assert_eq!(planner.n_transformations(), transformations);
    Ok(())
}

#[test]
fn filter_pushed_through_identity_projection() -> anyhow::Result<()> {
    let projection = LogicalProjection::new(
        vec![ScalarExpr::input_ref(0), ScalarExpr::input_ref(1)],
        scan("t", &["a", "b"], 100),
    )
    .into_plan_ref();
    let root = filter(gt(0, 1), projection);
    let program = HepProgram::builder()
        .add_rule_collection([
            Arc::new(FilterProjectTransposeRule::new()) as RuleRef,
            Arc::new(ProjectionRemoveRule::new()) as RuleRef,
        ])
        .build()?;
    let (_, best) = plan(program, checked(), vec![], root)?;
    assert_eq!(
        best.explain_string(),
        "LogicalFilter: expr ($0 > 1)\n  LogicalTableScan: table t, columns [a, b]\n"
    );
    Ok(())
}

#[test]
fn empty_union_inputs_are_pruned() -> anyhow::Result<()> {
    let values = LogicalValues::new(1, vec![vec![ScalarExpr::int(1)]; 2]).into_plan_ref();
    let empty = || LogicalValues::empty(1).into_plan_ref();
    let program = || {
        HepProgram::builder()
            .add_rule_instance(Arc::new(UnionPruneEmptyRule::new()))
            .build()
    };

    let inputs = vec![values, empty(), scan("t", &["a"], 10)];
    let root = LogicalUnion::new(inputs, true).into_plan_ref();
    let (_, best) = plan(program()?, checked(), vec![], root)?;
    let types = best.children().iter().map(|c| c.node_type()).collect::<Vec<_>>();
    assert_eq!(best.node_type(), PlanNodeType::LogicalUnion);
    assert_eq!(
        types,
        vec![PlanNodeType::LogicalValues, PlanNodeType::LogicalTableScan]
    );

    let root = LogicalUnion::new(vec![empty(), scan("t", &["a"], 10)], true).into_plan_ref();
    let (_, best) = plan(program()?, checked(), vec![], root)?;
    assert_eq!(
        best.explain_string(),
        "LogicalTableScan: table t, columns [a]\n"
    );
    Ok(())
}

#[test]
fn equi_join_converts_to_hash_join() -> anyhow::Result<()> {
    let condition = ScalarExpr::binary(
        BinaryOperator::Eq,
        ScalarExpr::input_ref(0),
        ScalarExpr::input_ref(2),
    );
    let root = LogicalJoin::new(
        scan("t", &["a", "b"], 100),
        scan("u", &["c", "d"], 100),
        JoinOperator::Inner,
        condition,
    )
    .into_plan_ref();
    let program = HepProgram::builder()
        .add_rule_instance(Arc::new(ConverterRule::join()))
        .build()?;
    let (_, best) = plan(program, checked(), vec![], root)?;
    assert_eq!(best.node_type(), PlanNodeType::PhysicalHashJoin);
    Ok(())
}

#[test]
fn exchange_added_for_requested_distribution() -> anyhow::Result<()> {
    init_logger();
    let physical = |table: &str| {
        let logical = LogicalTableScan::new(table, vec!["a".into(), "b".into()], 100);
        PhysicalTableScan::new(logical).into_plan_ref()
    };
    let program = || HepProgram::builder().add_converters(true).build();
    let rule = || Arc::new(ExchangeRule::new(Distribution::Single));

    let mut planner = HepPlanner::with_config(program()?, checked());
    planner.add_rule(rule());
    planner.set_root(physical("t"))?;
    let root = planner.root().unwrap();
    planner.change_traits(&root, TraitSet::new(Convention::Physical, Distribution::Single));
    let best = planner.find_best_exp()?;
    assert_eq!(
        best.explain_string(),
        "PhysicalExchange: distribution single\n  PhysicalTableScan: table t, columns [a, b]\n"
    );
    assert!(best
        .traits()
        .satisfies(&TraitSet::new(Convention::Physical, Distribution::Single)));

    let mut planner = HepPlanner::with_config(program()?, checked());
    planner.add_rule(rule());
    planner.set_root(physical("t"))?;
    let best = planner.find_best_exp()?;
    assert_eq!(best.node_type(), PlanNodeType::PhysicalTableScan);
    Ok(())
}

/// Wraps a scan into the filter that already consumes it.
struct RebuildParentRule {
    operand: Operand,
}

impl Rule for RebuildParentRule {
    fn description(&self) -> &str {
        "RebuildParentRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let scan = call.node(0).clone();
        call.transform_to(filter(ScalarExpr::bool(true), scan));
    }
}

#[test]
fn result_equal_to_parent_is_a_no_op() -> anyhow::Result<()> {
    let rule = RebuildParentRule {
        operand: Operand::of(PlanNodeType::LogicalTableScan),
    };
    let root = filter(ScalarExpr::bool(true), scan("t", &["a"], 10));
    let program = HepProgram::builder()
        .add_match_limit(3)
        .add_rule_instance(Arc::new(rule))
        .build()?;
    let (planner, best) = plan(program, checked(), vec![], root.clone())?;

    assert_eq!(best.explain_string(), root.explain_string());
    assert_eq!(planner.graph().len(), 2);
    // two vertices, then three firings
    assert_eq!(planner.n_transformations(), 5);
    Ok(())
}

#[test]
fn listener_sees_every_event() -> anyhow::Result<()> {
    init_logger();
    let log = EventLog::default();
    let program = HepProgram::builder()
        .add_rule_instance(Arc::new(FilterMergeRule::new()))
        .build()?;
    let mut planner = HepPlanner::new(program).with_listener(Box::new(log.clone()));
    planner.set_root(filter(
        gt(0, 1),
        filter(gt(1, 2), scan("t", &["a", "b"], 100)),
    ))?;
    planner.find_best_exp()?;

    assert_eq!(log.count("transform before FilterMergeRule"), 1);
    assert_eq!(log.count("transform after FilterMergeRule"), 1);
    assert_eq!(log.count("discard"), 2);
    assert_eq!(log.count("chosen"), 2);
    assert!(log.count("equivalence") >= 4);
    assert_eq!(
        log.events().last().map(String::as_str),
        Some("chosen LogicalTableScan: table t, columns [a, b]")
    );
    Ok(())
}

#[test]
fn shared_vertex_chosen_once() -> anyhow::Result<()> {
    init_logger();
    let log = EventLog::default();
    let mut planner =
        HepPlanner::new(HepProgram::default()).with_listener(Box::new(log.clone()));
    planner.set_root(
        LogicalJoin::new(
            scan("t", &["a"], 10),
            scan("t", &["a"], 10),
            JoinOperator::Inner,
            ScalarExpr::bool(true),
        )
        .into_plan_ref(),
    )?;
    planner.find_best_exp()?;
    assert_eq!(log.count("chosen"), 2);
    Ok(())
}
