// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use smallvec::SmallVec;

use super::PlanRef;

#[allow(rustdoc::private_intra_doc_links)]
/// The tree structure of a [`PlanNode`](super::PlanNode), as used by the optimizer.
///
/// [`PlanTreeNodeLeaf`], [`PlanTreeNodeUnary`] and [`PlanTreeNodeBinary`] are special
/// cases of [`PlanTreeNode`]. Implement one of them and derive [`PlanTreeNode`] with
/// [`impl_plan_tree_node_for_leaf`], [`impl_plan_tree_node_for_unary`] or
/// [`impl_plan_tree_node_for_binary`]. Since they are never used as `dyn`, they may return
/// `Self`, which is handy when writing rules. Only n-ary nodes implement [`PlanTreeNode`]
/// by hand.
pub trait PlanTreeNode {
    /// Get child nodes of the plan.
    fn children(&self) -> SmallVec<[PlanRef; 2]>;

    /// Clone the node with a list of new children.
    ///
    /// The result has the same operator and parameters; only the inputs differ.
    fn clone_with_children(&self, children: &[PlanRef]) -> PlanRef;
}

/// See [`PlanTreeNode`](super)
pub trait PlanTreeNodeLeaf: Clone {}
/// See [`PlanTreeNode`](super)
pub trait PlanTreeNodeUnary {
    fn child(&self) -> PlanRef;
    #[must_use]
    fn clone_with_child(&self, child: PlanRef) -> Self;
}
/// See [`PlanTreeNode`](super)
pub trait PlanTreeNodeBinary {
    fn left(&self) -> PlanRef;
    fn right(&self) -> PlanRef;

    #[must_use]
    fn clone_with_left_right(&self, left: PlanRef, right: PlanRef) -> Self;
}

macro_rules! impl_plan_tree_node_for_leaf {
    ($leaf_node_type:ident) => {
        impl crate::plan_nodes::PlanTreeNode for $leaf_node_type {
            fn children(&self) -> smallvec::SmallVec<[crate::plan_nodes::PlanRef; 2]> {
                smallvec::smallvec![]
            }

            fn clone_with_children(
                &self,
                children: &[crate::plan_nodes::PlanRef],
            ) -> crate::plan_nodes::PlanRef {
                assert_eq!(children.len(), 0);
                std::sync::Arc::new(self.clone())
            }
        }
    };
}

pub(crate) use impl_plan_tree_node_for_leaf;

macro_rules! impl_plan_tree_node_for_unary {
    ($unary_node_type:ident) => {
        impl crate::plan_nodes::PlanTreeNode for $unary_node_type {
            fn children(&self) -> smallvec::SmallVec<[crate::plan_nodes::PlanRef; 2]> {
                smallvec::smallvec![self.child()]
            }

            fn clone_with_children(
                &self,
                children: &[crate::plan_nodes::PlanRef],
            ) -> crate::plan_nodes::PlanRef {
                assert_eq!(children.len(), 1);
                std::sync::Arc::new(self.clone_with_child(children[0].clone()))
            }
        }
    };
}

pub(crate) use impl_plan_tree_node_for_unary;

macro_rules! impl_plan_tree_node_for_binary {
    ($binary_node_type:ident) => {
        impl crate::plan_nodes::PlanTreeNode for $binary_node_type {
            fn children(&self) -> smallvec::SmallVec<[crate::plan_nodes::PlanRef; 2]> {
                smallvec::smallvec![self.left(), self.right()]
            }
            fn clone_with_children(
                &self,
                children: &[crate::plan_nodes::PlanRef],
            ) -> crate::plan_nodes::PlanRef {
                assert_eq!(children.len(), 2);
                std::sync::Arc::new(
                    self.clone_with_left_right(children[0].clone(), children[1].clone()),
                )
            }
        }
    };
}

pub(crate) use impl_plan_tree_node_for_binary;
