// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! A heuristic, program-driven plan rewriter.
//!
//! Plans are trees of [`plan_nodes`]. A [`HepPlanner`] registers a plan in a graph where
//! equal sub-plans share a vertex, then applies [`rules`] in the order given by a
//! [`HepProgram`] until the program is done, and returns the rewritten plan.
//!
//! ```
//! use std::sync::Arc;
//!
//! use hep_optimizer::expr::ScalarExpr;
//! use hep_optimizer::plan_nodes::*;
//! use hep_optimizer::rules::FilterMergeRule;
//! use hep_optimizer::{HepPlanner, HepProgram};
//!
//! let scan = LogicalTableScan::new("t", vec!["a".into()], 100).into_plan_ref();
//! let inner = LogicalFilter::new(ScalarExpr::bool(true), scan).into_plan_ref();
//! let outer = LogicalFilter::new(ScalarExpr::bool(true), inner).into_plan_ref();
//!
//! let program = HepProgram::builder()
//!     .add_rule_instance(Arc::new(FilterMergeRule::new()))
//!     .build()
//!     .unwrap();
//! let mut planner = HepPlanner::new(program);
//! planner.set_root(outer).unwrap();
//! let plan = planner.find_best_exp().unwrap();
//! assert_eq!(
//!     plan.explain_string(),
//!     "LogicalFilter: expr true\n  LogicalTableScan: table t, columns [a]\n"
//! );
//! ```

#![deny(unused_must_use)]

pub mod cost;
pub mod expr;
pub mod heuristic;
pub mod plan_nodes;
pub mod rules;
pub mod traits;

pub use self::heuristic::{
    HepConfig, HepError, HepPlanner, HepProgram, HepProgramBuilder, MatchOrder,
};
