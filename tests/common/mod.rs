// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use hep_optimizer::expr::{BinaryOperator, ScalarExpr};
use hep_optimizer::heuristic::{PlannerListener, VertexId};
use hep_optimizer::plan_nodes::*;
use tracing_subscriber::EnvFilter;

pub fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

pub fn scan(table: &str, columns: &[&str], rows: usize) -> PlanRef {
    LogicalTableScan::new(
        table,
        columns.iter().map(|c| c.to_string()).collect(),
        rows,
    )
    .into_plan_ref()
}

/// `$col > value`
pub fn gt(col: usize, value: i64) -> ScalarExpr {
    ScalarExpr::binary(
        BinaryOperator::Gt,
        ScalarExpr::input_ref(col),
        ScalarExpr::int(value),
    )
}

pub fn filter(expr: ScalarExpr, child: PlanRef) -> PlanRef {
    LogicalFilter::new(expr, child).into_plan_ref()
}

pub fn limit(offset: usize, limit: usize, child: PlanRef) -> PlanRef {
    LogicalLimit::new(offset, limit, child).into_plan_ref()
}

/// Records planner events as strings.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl PlannerListener for EventLog {
    fn on_discard(&self, node: &PlanRef) {
        self.push(format!("discard {}", node.to_string().trim_end()));
    }

    fn on_chosen(&self, node: &PlanRef) {
        self.push(format!("chosen {}", node.to_string().trim_end()));
    }

    fn on_equivalence(&self, node: &PlanRef, vertex: VertexId) {
        self.push(format!("equivalence #{vertex} {}", node.to_string().trim_end()));
    }

    fn on_transformation(&self, rule: &str, node: &PlanRef, before: bool) {
        let phase = if before { "before" } else { "after" };
        self.push(format!("transform {phase} {rule}: {}", node.to_string().trim_end()));
    }
}
