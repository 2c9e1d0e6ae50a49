// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::plan_nodes::*;
use crate::traits::{Convention, Distribution, PlanTrait};

/// Builds the converted plans for a matched node.
pub type ConvertFn = fn(&PlanRef, &MetadataQuery<'_>) -> Vec<PlanRef>;

/// Converts a node into one or more nodes that differ only in `out_trait`.
pub struct ConverterRule {
    description: String,
    operand: Operand,
    out_trait: PlanTrait,
    guaranteed: bool,
    convert: ConvertFn,
}

impl ConverterRule {
    pub fn new(
        description: impl Into<String>,
        operand: Operand,
        out_trait: impl Into<PlanTrait>,
        guaranteed: bool,
        convert: ConvertFn,
    ) -> Self {
        Self {
            description: description.into(),
            operand,
            out_trait: out_trait.into(),
            guaranteed,
            convert,
        }
    }

    pub fn out_trait(&self) -> &PlanTrait {
        &self.out_trait
    }

    pub fn is_guaranteed(&self) -> bool {
        self.guaranteed
    }

    /// Logical table scan to physical.
    pub fn table_scan() -> Self {
        Self::physical(PlanNodeType::LogicalTableScan, |plan, _| {
            plan.as_logical_table_scan()
                .map(|scan| PhysicalTableScan::new(scan.clone()).into_plan_ref())
                .into_iter()
                .collect()
        })
    }

    pub fn values() -> Self {
        Self::physical(PlanNodeType::LogicalValues, |plan, _| {
            plan.as_logical_values()
                .map(|values| PhysicalValues::new(values.clone()).into_plan_ref())
                .into_iter()
                .collect()
        })
    }

    pub fn filter() -> Self {
        Self::physical(PlanNodeType::LogicalFilter, |plan, _| {
            plan.as_logical_filter()
                .map(|filter| PhysicalFilter::new(filter.clone()).into_plan_ref())
                .into_iter()
                .collect()
        })
    }

    pub fn projection() -> Self {
        Self::physical(PlanNodeType::LogicalProjection, |plan, _| {
            plan.as_logical_projection()
                .map(|proj| PhysicalProjection::new(proj.clone()).into_plan_ref())
                .into_iter()
                .collect()
        })
    }

    pub fn limit() -> Self {
        Self::physical(PlanNodeType::LogicalLimit, |plan, _| {
            plan.as_logical_limit()
                .map(|limit| PhysicalLimit::new(limit.clone()).into_plan_ref())
                .into_iter()
                .collect()
        })
    }

    pub fn union() -> Self {
        Self::physical(PlanNodeType::LogicalUnion, |plan, _| {
            plan.as_logical_union()
                .map(|union| PhysicalUnion::new(union.clone()).into_plan_ref())
                .into_iter()
                .collect()
        })
    }

    /// Proposes a nested loop join, and a hash join when the condition has an equality
    /// between the two sides. The planner keeps the cheaper one.
    pub fn join() -> Self {
        Self::physical(PlanNodeType::LogicalJoin, |plan, mq| {
            let join = match plan.as_logical_join() {
                Some(join) => join,
                None => return vec![],
            };
            let mut plans = vec![PhysicalNestedLoopJoin::new(join.clone()).into_plan_ref()];
            if join.has_equi_condition(mq.column_count(&join.left())) {
                plans.push(PhysicalHashJoin::new(join.clone()).into_plan_ref());
            }
            plans
        })
    }

    /// All logical to physical conversions.
    pub fn all_physical() -> Vec<RuleRef> {
        vec![
            Arc::new(Self::table_scan()),
            Arc::new(Self::values()),
            Arc::new(Self::filter()),
            Arc::new(Self::projection()),
            Arc::new(Self::join()),
            Arc::new(Self::limit()),
            Arc::new(Self::union()),
        ]
    }

    fn physical(node_type: PlanNodeType, convert: ConvertFn) -> Self {
        Self::new(
            format!("ConverterRule(in:{node_type:?},out:{})", Convention::Physical),
            Operand::of(node_type).with_trait(Convention::None),
            Convention::Physical,
            false,
            convert,
        )
    }
}

impl Rule for ConverterRule {
    fn description(&self) -> &str {
        &self.description
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let plans = (self.convert)(call.node(0), call.mq());
        for plan in plans {
            call.transform_to(plan);
        }
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Converter {
            out_trait: self.out_trait.clone(),
            guaranteed: self.guaranteed,
        }
    }
}

/// Puts a [`PhysicalExchange`] on top of a physical node that does not have the wanted
/// distribution.
pub struct ExchangeRule {
    description: String,
    operand: Operand,
    distribution: Distribution,
}

impl ExchangeRule {
    pub fn new(distribution: Distribution) -> Self {
        let target = distribution.clone();
        Self {
            description: format!("ExchangeRule(out:{distribution})"),
            operand: Operand::any()
                .with_trait(Convention::Physical)
                .with_predicate(move |node| node.traits().distribution() != &target),
            distribution,
        }
    }
}

impl Rule for ExchangeRule {
    fn description(&self) -> &str {
        &self.description
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let exchange = PhysicalExchange::new(self.distribution.clone(), call.node(0).clone());
        call.transform_to(exchange.into_plan_ref());
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Converter {
            out_trait: self.distribution.clone().into(),
            guaranteed: true,
        }
    }
}

/// Fires a converter on a node whose first input already has the converter's output trait,
/// so conversions spread from the leaves up.
pub struct TraitMatchingRule {
    description: String,
    operand: Operand,
    out_trait: PlanTrait,
    converter: RuleRef,
}

impl TraitMatchingRule {
    /// Returns `None` if `converter` is not a converter rule.
    pub fn new(converter: RuleRef) -> Option<Self> {
        let out_trait = converter.kind().out_trait()?.clone();
        let operand = converter
            .operand()
            .clone()
            .children(vec![Operand::any()]);
        Some(Self {
            description: format!("TraitMatchingRule: {}", converter.description()),
            operand,
            out_trait,
            converter,
        })
    }
}

impl Rule for TraitMatchingRule {
    fn description(&self) -> &str {
        &self.description
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        if call.node(1).traits().contains(&self.out_trait) {
            self.converter.on_match(call);
        }
    }
}
