// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Defines all plan nodes and provides tools to visit plan tree.
//!
//! This module contains a few macros to help generate code. If you want to add a new plan node,
//! copy an existing node of the same arity, then add its name to [`for_all_plan_nodes`].
//!
//! The `for_all_xxx` macros are a technique in Rust to generate a given pattern of code using a
//! input parameter. There are some articles about it:
//!
//! * [Callbacks](https://adventures.michaelfbryan.com/posts/non-trivial-macros/#callbacks)
//! * [Type Exercise in Rust (Day 4)](https://github.com/skyzh/type-exercise-in-rust/blob/master/archive/day4/src/macros.rs)

use std::fmt::{Debug, Display};
use std::sync::Arc;

use downcast_rs::{impl_downcast, Downcast};
use erased_serde::serialize_trait_object;
use itertools::Itertools;
use paste::paste;

use crate::cost::Cost;
use crate::traits::{TraitKind, TraitSet};

mod plan_tree_node;
pub use plan_tree_node::*;

/// The upcast trait for `PlanNode`.
pub trait IntoPlanRef {
    fn into_plan_ref(self) -> PlanRef;
    fn clone_as_plan_ref(&self) -> PlanRef;
}

/// The common trait over all plan nodes.
pub trait PlanNode:
    WithPlanNodeType
    + IntoPlanRef
    + PlanTreeNode
    + Debug
    + Display
    + Downcast
    + erased_serde::Serialize
    + Send
    + Sync
{
    /// Physical properties of the node.
    fn traits(&self) -> TraitSet {
        TraitSet::logical()
    }

    /// The trait kind this node converts, if it is a converter.
    ///
    /// A converter only changes one trait of its single input.
    fn converted_trait(&self) -> Option<TraitKind> {
        None
    }

    fn is_converter(&self) -> bool {
        self.converted_trait().is_some()
    }

    /// Number of output columns, given the column counts of the inputs.
    fn out_columns(&self, input_columns: &[usize]) -> usize {
        input_columns.first().copied().unwrap_or(0)
    }

    /// Estimated output rows, given the estimated rows of the inputs.
    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        input_rows.first().copied().unwrap_or(1.0)
    }

    /// Cost of this node alone, excluding its inputs.
    fn self_cost(&self, rows: f64, _input_rows: &[f64]) -> Cost {
        Cost::new(rows, rows, 0.0)
    }

    /// A structural signature of the node: its operator, parameters, traits and the
    /// digests of its inputs.
    ///
    /// Two nodes with equal digests compute the same result.
    fn digest(&self) -> String {
        format!(
            "{}.{}({})",
            self.to_string().trim_end(),
            self.traits(),
            self.children().iter().map(|c| c.digest()).join(", ")
        )
    }
}
impl_downcast!(PlanNode);

/// The type of reference to a plan node.
pub type PlanRef = Arc<dyn PlanNode>;

impl dyn PlanNode {
    /// Write explain string of the plan.
    pub fn explain(&self, level: usize, f: &mut dyn std::fmt::Write) -> std::fmt::Result {
        writeln!(f, "{}{}", " ".repeat(level * 2), self.to_string().trim_end())?;
        for child in self.children() {
            child.explain(level + 1, f)?;
        }
        Ok(())
    }

    /// Returns the explain string of the plan.
    pub fn explain_string(&self) -> String {
        let mut s = String::new();
        // writing to a `String` never fails
        let _ = self.explain(0, &mut s);
        s
    }
}

serialize_trait_object!(PlanNode);

/// All Plan nodes
///
/// You can use it as follows:
///
/// ```rust
/// macro_rules! use_plan {
///     ([], $($node_name:ty),*) => {};
/// }
/// hep_optimizer::for_all_plan_nodes! { use_plan }
/// ```
#[macro_export]
macro_rules! for_all_plan_nodes {
    ($macro:tt $(, $x:tt)*) => {
        $macro! {
            [$($x),*],
            VertexRef,
            LogicalTableScan,
            LogicalValues,
            LogicalFilter,
            LogicalProjection,
            LogicalJoin,
            LogicalLimit,
            LogicalUnion,
            PhysicalTableScan,
            PhysicalValues,
            PhysicalFilter,
            PhysicalProjection,
            PhysicalNestedLoopJoin,
            PhysicalHashJoin,
            PhysicalLimit,
            PhysicalUnion,
            PhysicalExchange
        }
    };
}

/// Define module for each node.
macro_rules! def_mod_and_use {
    ([], $($node_name:ty),*) => {
        $(paste! {
            mod [<$node_name:snake>];
            pub use [<$node_name:snake>]::*;
        })*
    }
}
for_all_plan_nodes! { def_mod_and_use }

pub trait WithPlanNodeType {
    fn node_type(&self) -> PlanNodeType;
}
macro_rules! enum_plan_node_type {
    ([], $($node_name:ident),*) => {
        /// each enum value represent a [`PlanNode`] struct type, help us to dispatch and downcast
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PlanNodeType {
            $( $node_name ),*
        }

        $(impl WithPlanNodeType for $node_name {
            fn node_type(&self) -> PlanNodeType {
                PlanNodeType::$node_name
            }
        })*
    }
}
for_all_plan_nodes! { enum_plan_node_type }

macro_rules! impl_downcast_utility {
    ([], $($node_name:ident),*) => {
        impl dyn PlanNode {
            $(
                paste! {
                    pub fn [<as_ $node_name:snake>] (&self) -> Option<&$node_name> {
                        self.downcast_ref::<$node_name>()
                    }
                }
            )*
        }
    }
}
for_all_plan_nodes! { impl_downcast_utility }

/// impl `IntoPlanRef` for each node.
macro_rules! impl_into_plan_ref {
    ([], $($node_name:ident),*) => {
        $(impl IntoPlanRef for $node_name {
            fn into_plan_ref(self) -> PlanRef {
                std::sync::Arc::new(self)
            }
            fn clone_as_plan_ref(&self) -> PlanRef {
                self.clone().into_plan_ref()
            }
        })*
    }
}
for_all_plan_nodes! { impl_into_plan_ref }
