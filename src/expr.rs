// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Scalar expressions carried by filter, projection and join nodes.

use std::fmt;

use bit_set::BitSet;
use serde::Serialize;

/// A constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int64(i64),
    String(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// A scalar expression over the input columns of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarExpr {
    /// Reference to the column at `index` of the input.
    InputRef(usize),
    Constant(ScalarValue),
    BinaryOp {
        op: BinaryOperator,
        left: Box<ScalarExpr>,
        right: Box<ScalarExpr>,
    },
}

impl ScalarExpr {
    pub fn input_ref(index: usize) -> Self {
        ScalarExpr::InputRef(index)
    }

    pub fn int(v: i64) -> Self {
        ScalarExpr::Constant(ScalarValue::Int64(v))
    }

    pub fn bool(v: bool) -> Self {
        ScalarExpr::Constant(ScalarValue::Bool(v))
    }

    pub fn binary(op: BinaryOperator, left: ScalarExpr, right: ScalarExpr) -> Self {
        ScalarExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, ScalarExpr::Constant(ScalarValue::Bool(true)))
    }
}

/// Splits a predicate into its top-level `AND` operands.
pub fn conjunctions(expr: ScalarExpr) -> Vec<ScalarExpr> {
    let mut rets = vec![];
    conjunctions_inner(expr, &mut rets);
    rets
}

fn conjunctions_inner(expr: ScalarExpr, rets: &mut Vec<ScalarExpr>) {
    match expr {
        ScalarExpr::BinaryOp {
            op: BinaryOperator::And,
            left,
            right,
        } => {
            conjunctions_inner(*left, rets);
            conjunctions_inner(*right, rets);
        }
        expr if expr.is_true() => {}
        expr => rets.push(expr),
    }
}

/// Joins predicates with `AND`, dropping `true` operands.
pub fn merge_conjunctions<I>(iter: I) -> ScalarExpr
where
    I: IntoIterator<Item = ScalarExpr>,
{
    iter.into_iter()
        .flat_map(conjunctions)
        .reduce(|acc, expr| ScalarExpr::binary(BinaryOperator::And, acc, expr))
        .unwrap_or_else(|| ScalarExpr::bool(true))
}

/// Returns the set of input columns referenced by the expression.
pub fn input_col_refs(expr: &ScalarExpr) -> BitSet {
    let mut set = BitSet::default();
    input_col_refs_inner(expr, &mut set);
    set
}

fn input_col_refs_inner(expr: &ScalarExpr, input_set: &mut BitSet) {
    match expr {
        ScalarExpr::InputRef(index) => {
            input_set.insert(*index);
        }
        ScalarExpr::Constant(_) => {}
        ScalarExpr::BinaryOp { left, right, .. } => {
            input_col_refs_inner(left, input_set);
            input_col_refs_inner(right, input_set);
        }
    }
}

/// Rewrites every input reference with `f`.
pub fn map_input_refs(expr: &mut ScalarExpr, f: &impl Fn(usize) -> usize) {
    match expr {
        ScalarExpr::InputRef(index) => *index = f(*index),
        ScalarExpr::Constant(_) => {}
        ScalarExpr::BinaryOp { left, right, .. } => {
            map_input_refs(left, f);
            map_input_refs(right, f);
        }
    }
}

/// Replaces each input reference `i` with `exprs[i]`.
///
/// Used to push a predicate through a projection. Returns `None` if a reference is out of
/// the range of `exprs`.
pub fn substitute_input_refs(expr: &ScalarExpr, exprs: &[ScalarExpr]) -> Option<ScalarExpr> {
    match expr {
        ScalarExpr::InputRef(index) => exprs.get(*index).cloned(),
        ScalarExpr::Constant(_) => Some(expr.clone()),
        ScalarExpr::BinaryOp { op, left, right } => Some(ScalarExpr::binary(
            *op,
            substitute_input_refs(left, exprs)?,
            substitute_input_refs(right, exprs)?,
        )),
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::String(v) => write!(f, "'{v}'"),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarExpr::InputRef(index) => write!(f, "${index}"),
            ScalarExpr::Constant(v) => write!(f, "{v}"),
            ScalarExpr::BinaryOp { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_and_split() {
        let a = ScalarExpr::binary(
            BinaryOperator::Gt,
            ScalarExpr::input_ref(0),
            ScalarExpr::int(1),
        );
        let b = ScalarExpr::binary(
            BinaryOperator::Lt,
            ScalarExpr::input_ref(1),
            ScalarExpr::int(9),
        );
        let merged = merge_conjunctions([ScalarExpr::bool(true), a.clone(), b.clone()]);
        assert_eq!(merged.to_string(), "(($0 > 1) and ($1 < 9))");
        assert_eq!(conjunctions(merged), vec![a, b]);
        assert!(merge_conjunctions(std::iter::empty()).is_true());
    }

    #[test]
    fn substitute_through_projection() {
        let pred = ScalarExpr::binary(
            BinaryOperator::Eq,
            ScalarExpr::input_ref(1),
            ScalarExpr::int(3),
        );
        let exprs = vec![
            ScalarExpr::input_ref(4),
            ScalarExpr::binary(
                BinaryOperator::Plus,
                ScalarExpr::input_ref(2),
                ScalarExpr::int(1),
            ),
        ];
        let pushed = substitute_input_refs(&pred, &exprs).unwrap();
        assert_eq!(pushed.to_string(), "(($2 + 1) = 3)");
        let cols = input_col_refs(&pushed);
        assert_eq!(cols.iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn substitute_out_of_range() {
        let pred = ScalarExpr::binary(
            BinaryOperator::Gt,
            ScalarExpr::input_ref(2),
            ScalarExpr::int(0),
        );
        assert_eq!(substitute_input_refs(&pred, &[ScalarExpr::input_ref(0)]), None);
    }

    #[test]
    fn shift_refs() {
        let mut expr = ScalarExpr::binary(
            BinaryOperator::Eq,
            ScalarExpr::input_ref(0),
            ScalarExpr::input_ref(3),
        );
        map_input_refs(&mut expr, &|i| if i < 2 { i + 2 } else { i - 2 });
        assert_eq!(expr.to_string(), "($2 = $1)");
    }
}
