// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{HepConfig, HepError};
use crate::rules::{Rule, RuleRef};

/// Match limit meaning "no limit".
pub const MATCH_UNTIL_FIXPOINT: usize = usize::MAX;

/// The order in which vertices are offered to rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOrder {
    /// Depth first from the root. After a rule fires, matching resumes from the new vertex.
    Arbitrary,
    /// Like `Arbitrary`, but the subtree of the new vertex is rewritten before resuming.
    DepthFirst,
    /// Parents before children. Restarts from the root after a rule fires.
    TopDown,
    /// Children before parents. Restarts from the root after a rule fires.
    BottomUp,
}

/// One step of a [`HepProgram`].
#[derive(Clone)]
pub enum Instruction {
    /// Applies one rule.
    RuleInstance(RuleRef),
    /// Applies the registered rule with this description.
    RuleDescription(String),
    /// Applies every registered rule accepted by `filter`.
    RuleClass {
        name: &'static str,
        filter: fn(&dyn Rule) -> bool,
    },
    /// Applies a set of rules together.
    RuleCollection(Vec<RuleRef>),
    /// Applies the registered converters whose guaranteed flag is `guaranteed`.
    ConverterRules { guaranteed: bool },
    /// Applies the registered common sub-expression rules.
    CommonRelSubExprRules,
    /// Runs a nested program until it stops changing the graph.
    Subprogram(Arc<HepProgram>),
    /// Following rule instructions are collected instead of applied.
    BeginGroup,
    /// Applies the collected rules together.
    EndGroup,
    MatchOrder(MatchOrder),
    MatchLimit(usize),
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleInstance(rule) => write!(f, "RuleInstance({})", rule.description()),
            Self::RuleDescription(desc) => write!(f, "RuleInstance({desc})"),
            Self::RuleClass { name, .. } => write!(f, "RuleClass({name})"),
            Self::RuleCollection(rules) => f
                .debug_tuple("RuleCollection")
                .field(&rules.iter().map(|r| r.description()).collect::<Vec<_>>())
                .finish(),
            Self::ConverterRules { guaranteed } => write!(f, "ConverterRules({guaranteed})"),
            Self::CommonRelSubExprRules => write!(f, "CommonRelSubExprRules"),
            Self::Subprogram(program) => f.debug_tuple("Subprogram").field(program).finish(),
            Self::BeginGroup => write!(f, "BeginGroup"),
            Self::EndGroup => write!(f, "EndGroup"),
            Self::MatchOrder(order) => write!(f, "MatchOrder({order:?})"),
            Self::MatchLimit(limit) => write!(f, "MatchLimit({limit})"),
        }
    }
}

/// An ordered list of instructions telling the planner which rules to apply and how.
///
/// Programs are immutable and can be shared between planners. The match order, match limit
/// and open group are state of one execution.
#[derive(Debug, Clone, Default)]
pub struct HepProgram {
    instructions: Vec<Instruction>,
}

impl HepProgram {
    pub fn builder() -> HepProgramBuilder {
        HepProgramBuilder::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

#[derive(Debug, Default)]
pub struct HepProgramBuilder {
    instructions: Vec<Instruction>,
}

impl HepProgramBuilder {
    pub fn add_rule_instance(mut self, rule: RuleRef) -> Self {
        self.instructions.push(Instruction::RuleInstance(rule));
        self
    }

    /// Adds a rule looked up by description in the planner when the program runs.
    pub fn add_rule_by_description(mut self, description: impl Into<String>) -> Self {
        self.instructions
            .push(Instruction::RuleDescription(description.into()));
        self
    }

    /// Adds every registered rule of type `R`.
    pub fn add_rule_class<R: Rule>(mut self) -> Self {
        fn is_instance<R: Rule>(rule: &dyn Rule) -> bool {
            rule.is::<R>()
        }
        self.instructions.push(Instruction::RuleClass {
            name: std::any::type_name::<R>(),
            filter: is_instance::<R>,
        });
        self
    }

    pub fn add_rule_collection(mut self, rules: impl IntoIterator<Item = RuleRef>) -> Self {
        self.instructions
            .push(Instruction::RuleCollection(rules.into_iter().collect()));
        self
    }

    pub fn add_converters(mut self, guaranteed: bool) -> Self {
        self.instructions
            .push(Instruction::ConverterRules { guaranteed });
        self
    }

    pub fn add_common_rel_sub_expr_instruction(mut self) -> Self {
        self.instructions.push(Instruction::CommonRelSubExprRules);
        self
    }

    pub fn add_sub_program(mut self, program: HepProgram) -> Self {
        self.instructions
            .push(Instruction::Subprogram(Arc::new(program)));
        self
    }

    pub fn add_group_begin(mut self) -> Self {
        self.instructions.push(Instruction::BeginGroup);
        self
    }

    pub fn add_group_end(mut self) -> Self {
        self.instructions.push(Instruction::EndGroup);
        self
    }

    pub fn add_match_order(mut self, order: MatchOrder) -> Self {
        self.instructions.push(Instruction::MatchOrder(order));
        self
    }

    pub fn add_match_limit(mut self, limit: usize) -> Self {
        self.instructions.push(Instruction::MatchLimit(limit));
        self
    }

    /// Checks that groups are balanced, not nested, and contain no sub-program.
    pub fn build(self) -> Result<HepProgram, HepError> {
        let mut in_group = false;
        for instruction in &self.instructions {
            match instruction {
                Instruction::BeginGroup if in_group => return Err(HepError::NestedGroup),
                Instruction::BeginGroup => in_group = true,
                Instruction::EndGroup if !in_group => return Err(HepError::UnbalancedGroup),
                Instruction::EndGroup => in_group = false,
                Instruction::Subprogram(_) if in_group => return Err(HepError::GroupSubprogram),
                _ => {}
            }
        }
        if in_group {
            return Err(HepError::UnbalancedGroup);
        }
        Ok(HepProgram {
            instructions: self.instructions,
        })
    }
}

/// State of one execution of a program.
pub(super) struct ProgramState {
    pub match_order: MatchOrder,
    pub match_limit: usize,
    /// Rules collected since `BeginGroup`.
    pub group: Option<Vec<RuleRef>>,
    /// Rule firings so far, counted against `match_limit`.
    pub matches_fired: usize,
}

impl ProgramState {
    pub fn new(config: &HepConfig) -> Self {
        Self {
            match_order: config.default_match_order,
            match_limit: config.default_match_limit,
            group: None,
            matches_fired: 0,
        }
    }

    pub fn limit_reached(&self) -> bool {
        self.matches_fired >= self.match_limit
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::rules::FilterMergeRule;

    fn rule() -> RuleRef {
        Arc::new(FilterMergeRule::new())
    }

    #[test]
    fn build_program() {
        let program = HepProgram::builder()
            .add_match_order(MatchOrder::TopDown)
            .add_group_begin()
            .add_rule_instance(rule())
            .add_rule_class::<FilterMergeRule>()
            .add_group_end()
            .add_sub_program(HepProgram::builder().add_converters(true).build().unwrap())
            .build()
            .unwrap();
        assert_eq!(program.instructions().len(), 6);
        assert_eq!(
            format!("{:?}", program.instructions()[3]),
            format!("RuleClass({})", std::any::type_name::<FilterMergeRule>())
        );

        let filter = match &program.instructions()[3] {
            Instruction::RuleClass { filter, .. } => *filter,
            _ => unreachable!(),
        };
        assert!(filter(rule().as_ref()));
        assert!(!filter(&crate::rules::LimitMergeRule::new()));
    }

    #[test_case(HepProgram::builder().add_group_end() => HepError::UnbalancedGroup; "end without begin")]
    #[test_case(HepProgram::builder().add_group_begin() => HepError::UnbalancedGroup; "begin without end")]
    #[test_case(HepProgram::builder().add_group_begin().add_group_begin() => HepError::NestedGroup; "nested")]
    #[test_case(sub_program_in_group() => HepError::GroupSubprogram; "sub-program in group")]
    fn invalid_groups(builder: HepProgramBuilder) -> HepError {
        builder.build().unwrap_err()
    }

    fn sub_program_in_group() -> HepProgramBuilder {
        let sub = HepProgram::builder().add_rule_instance(rule()).build().unwrap();
        HepProgram::builder()
            .add_group_begin()
            .add_sub_program(sub)
            .add_group_end()
    }

    #[test]
    fn converters_allowed_in_group() {
        let program = HepProgram::builder()
            .add_group_begin()
            .add_rule_instance(rule())
            .add_converters(false)
            .add_common_rel_sub_expr_instruction()
            .add_group_end()
            .build()
            .unwrap();
        assert_eq!(program.instructions().len(), 5);
    }
}
