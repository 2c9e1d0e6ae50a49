// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Physical properties carried by plan nodes.
//!
//! A [`TraitSet`] holds one value per trait kind. Converter rules change exactly one
//! trait of a node without changing what it computes, e.g. turning a logical filter
//! into a physical one, or gathering a distributed input onto a single node.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The calling convention of a plan node, i.e. who is able to execute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Convention {
    /// Logical nodes. They can not be executed.
    #[default]
    None,
    /// Nodes executable by the physical executors.
    Physical,
}

/// How the output rows of a plan node are spread over workers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Distribution {
    /// Nothing is known about the distribution.
    #[default]
    Any,
    /// All rows are on a single worker.
    Single,
    /// Rows are partitioned by the hash of the given columns.
    Hash(Vec<usize>),
}

/// The kind of a trait. Each [`TraitSet`] has exactly one slot per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitKind {
    Convention,
    Distribution,
}

/// A single physical property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanTrait {
    Convention(Convention),
    Distribution(Distribution),
}

impl PlanTrait {
    pub fn kind(&self) -> TraitKind {
        match self {
            PlanTrait::Convention(_) => TraitKind::Convention,
            PlanTrait::Distribution(_) => TraitKind::Distribution,
        }
    }
}

impl From<Convention> for PlanTrait {
    fn from(c: Convention) -> Self {
        PlanTrait::Convention(c)
    }
}

impl From<Distribution> for PlanTrait {
    fn from(d: Distribution) -> Self {
        PlanTrait::Distribution(d)
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Convention::None => write!(f, "NONE"),
            Convention::Physical => write!(f, "PHYSICAL"),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Distribution::Any => write!(f, "any"),
            Distribution::Single => write!(f, "single"),
            Distribution::Hash(keys) => write!(f, "hash[{}]", keys.iter().join(", ")),
        }
    }
}

impl fmt::Display for PlanTrait {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlanTrait::Convention(c) => write!(f, "{c}"),
            PlanTrait::Distribution(d) => write!(f, "{d}"),
        }
    }
}

/// The set of traits of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TraitSet {
    convention: Convention,
    distribution: Distribution,
}

impl TraitSet {
    pub fn new(convention: Convention, distribution: Distribution) -> Self {
        Self {
            convention,
            distribution,
        }
    }

    /// Traits of an unconverted logical node.
    pub fn logical() -> Self {
        Self::default()
    }

    /// Traits of a physical node with unknown distribution.
    pub fn physical() -> Self {
        Self::new(Convention::Physical, Distribution::Any)
    }

    pub fn convention(&self) -> Convention {
        self.convention
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Returns the trait of the given kind.
    pub fn get(&self, kind: TraitKind) -> PlanTrait {
        match kind {
            TraitKind::Convention => PlanTrait::Convention(self.convention),
            TraitKind::Distribution => PlanTrait::Distribution(self.distribution.clone()),
        }
    }

    /// Whether the set holds exactly this trait.
    pub fn contains(&self, plan_trait: &PlanTrait) -> bool {
        match plan_trait {
            PlanTrait::Convention(c) => self.convention == *c,
            PlanTrait::Distribution(d) => self.distribution == *d,
        }
    }

    /// Returns a copy with the slot of `plan_trait`'s kind overwritten.
    #[must_use]
    pub fn replace(&self, plan_trait: impl Into<PlanTrait>) -> Self {
        let mut new = self.clone();
        match plan_trait.into() {
            PlanTrait::Convention(c) => new.convention = c,
            PlanTrait::Distribution(d) => new.distribution = d,
        }
        new
    }

    /// Whether a node with these traits can be used where `required` is asked for.
    ///
    /// `Distribution::Any` in `required` is satisfied by every distribution.
    pub fn satisfies(&self, required: &TraitSet) -> bool {
        self.convention == required.convention
            && (required.distribution == Distribution::Any
                || self.distribution == required.distribution)
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.convention, self.distribution)
    }
}
