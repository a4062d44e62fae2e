// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Mutable per-feature and per-scenario reporting state.
//!
//! Ownership is arena-style: the reporter owns [`FeatureContext`]s, a feature
//! exclusively owns its [`ScenarioContext`]s, and a scenario owns its current
//! [`Step`], previous [`Step`] and [`HookGroup`]. Children reference parents
//! by source line, never by lifetime.

use std::{
    collections::{BTreeSet, HashMap},
    time::SystemTime,
};

use tracing::warn;

use crate::{
    client::ItemHandle,
    event::{FeatureNode, HookKind, RuleNode, TestCase},
    extract,
    status::{self, ItemStatus},
};

/// Reporting state of one feature file, keyed by URI.
#[derive(Debug)]
pub struct FeatureContext {
    node: FeatureNode,
    tags: BTreeSet<String>,
    handle: Option<ItemHandle>,
    current_rule: Option<RuleContext>,
    scenarios: HashMap<usize, ScenarioContext>,
}

impl FeatureContext {
    /// Creates a context for the given parsed feature, computing its tags
    /// from the source text.
    #[must_use]
    pub fn new(node: FeatureNode) -> Self {
        let tags = extract::feature_tags(&node);
        Self {
            node,
            tags,
            handle: None,
            current_rule: None,
            scenarios: HashMap::new(),
        }
    }

    /// URI of the feature file.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.node.uri
    }

    /// Parsed feature descriptor.
    #[must_use]
    pub const fn node(&self) -> &FeatureNode {
        &self.node
    }

    /// Tags declared above the feature line.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Remote handle of the feature item, once opened.
    #[must_use]
    pub const fn handle(&self) -> Option<&ItemHandle> {
        self.handle.as_ref()
    }

    /// Assigns the remote handle. Happens exactly once, on the first
    /// scenario start within this feature.
    pub fn set_handle(&mut self, handle: ItemHandle) {
        self.handle = Some(handle);
    }

    /// Rule currently open under this feature.
    #[must_use]
    pub const fn current_rule(&self) -> Option<&RuleContext> {
        self.current_rule.as_ref()
    }

    /// Replaces the current rule, returning the outgoing one.
    pub fn replace_current_rule(
        &mut self,
        rule: Option<RuleContext>,
    ) -> Option<RuleContext> {
        std::mem::replace(&mut self.current_rule, rule)
    }

    /// Looks up or creates the scenario context for a test case expanded at
    /// the given source `line`.
    ///
    /// Returns [`None`] (with a warning) when the parsed feature has no
    /// scenario covering that line.
    pub fn scenario_mut(
        &mut self,
        line: usize,
    ) -> Option<&mut ScenarioContext> {
        if !self.scenarios.contains_key(&line) {
            let Some((rule, scenario)) = self.node.find_scenario(line) else {
                warn!(
                    uri = self.node.uri,
                    line, "no scenario context matches the test case",
                );
                return None;
            };
            let context =
                ScenarioContext::new(scenario.line, rule.cloned());
            self.scenarios.insert(line, context);
        }
        self.scenarios.get_mut(&line)
    }

    /// Drops the scenario context for the given test-case `line`.
    pub fn remove_scenario(&mut self, line: usize) {
        self.scenarios.remove(&line);
    }
}

/// Reporting state of an open rule.
#[derive(Debug)]
pub struct RuleContext {
    /// Declaration line of the rule, identifying it within its feature.
    pub line: usize,

    /// Remote handle of the rule item.
    pub handle: ItemHandle,
}

/// Reporting state of one running test case.
#[derive(Debug)]
pub struct ScenarioContext {
    /// Declaration line of the scenario (or outline) node. Steps located
    /// above it belong to the feature's background.
    line: usize,

    /// Rule the scenario is declared under, if any.
    rule: Option<RuleNode>,

    /// Test case delivered by the runner.
    test_case: Option<TestCase>,

    /// Remote handle of the scenario item.
    handle: Option<ItemHandle>,

    /// Step currently executing (or a virtual placeholder for one).
    current_step: Option<Step>,

    /// Most recently finished step, parent for `AfterStep` hook groups.
    previous_step: Option<Step>,

    /// Open hook group, at most one at a time.
    hook_group: Option<HookGroup>,

    /// Remote handle of the hook currently executing.
    current_hook: Option<ItemHandle>,
}

impl ScenarioContext {
    /// Creates a context for a scenario declared at `line` under `rule`.
    #[must_use]
    pub const fn new(line: usize, rule: Option<RuleNode>) -> Self {
        Self {
            line,
            rule,
            test_case: None,
            handle: None,
            current_step: None,
            previous_step: None,
            hook_group: None,
            current_hook: None,
        }
    }

    /// Declaration line of the scenario node.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Rule the scenario is declared under.
    #[must_use]
    pub const fn rule(&self) -> Option<&RuleNode> {
        self.rule.as_ref()
    }

    /// Test case delivered by the runner, once started.
    #[must_use]
    pub const fn test_case(&self) -> Option<&TestCase> {
        self.test_case.as_ref()
    }

    /// Associates the runner's test case with this context.
    pub fn set_test_case(&mut self, test_case: TestCase) {
        self.test_case = Some(test_case);
    }

    /// Remote handle of the scenario item.
    #[must_use]
    pub const fn handle(&self) -> Option<&ItemHandle> {
        self.handle.as_ref()
    }

    /// Assigns the remote scenario handle.
    pub fn set_handle(&mut self, handle: ItemHandle) {
        self.handle = Some(handle);
    }

    /// Currently executing (or placeholder) step.
    #[must_use]
    pub const fn current_step(&self) -> Option<&Step> {
        self.current_step.as_ref()
    }

    /// Takes the current step out, leaving none.
    pub fn take_current_step(&mut self) -> Option<Step> {
        self.current_step.take()
    }

    /// Replaces the current step.
    pub fn set_current_step(&mut self, step: Step) {
        self.current_step = Some(step);
    }

    /// Most recently finished step.
    #[must_use]
    pub const fn previous_step(&self) -> Option<&Step> {
        self.previous_step.as_ref()
    }

    /// Records the most recently finished step.
    pub fn set_previous_step(&mut self, step: Step) {
        self.previous_step = Some(step);
    }

    /// Open hook group, if any.
    #[must_use]
    pub const fn hook_group(&self) -> Option<&HookGroup> {
        self.hook_group.as_ref()
    }

    /// Mutable access to the open hook group.
    pub fn hook_group_mut(&mut self) -> Option<&mut HookGroup> {
        self.hook_group.as_mut()
    }

    /// Takes the open hook group out, leaving none.
    pub fn take_hook_group(&mut self) -> Option<HookGroup> {
        self.hook_group.take()
    }

    /// Opens a new hook group.
    pub fn set_hook_group(&mut self, group: HookGroup) {
        self.hook_group = Some(group);
    }

    /// Remote handle of the hook currently executing.
    pub fn take_current_hook(&mut self) -> Option<ItemHandle> {
        self.current_hook.take()
    }

    /// Records the hook currently executing.
    pub fn set_current_hook(&mut self, handle: ItemHandle) {
        self.current_hook = Some(handle);
    }
}

/// Kind of a tracked [`Step`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepKind {
    /// Step opened with complete information.
    Normal,

    /// Placeholder opened by the hook grouper before the runner announced
    /// the step itself; upgraded once the real step begins.
    Virtual,
}

/// Remote step item tracked by a scenario.
#[derive(Clone, Debug)]
pub struct Step {
    /// Remote handle of the step item.
    pub handle: ItemHandle,

    /// Whether the step is real or a placeholder.
    pub kind: StepKind,

    /// Time the step (or its placeholder) was created. A virtual step's
    /// stored time becomes the real step's start time on upgrade.
    pub started_at: SystemTime,
}

/// Grouping item wrapping consecutive hooks of one kind.
#[derive(Debug)]
pub struct HookGroup {
    /// Remote handle of the grouping item.
    pub handle: ItemHandle,

    /// Kind of hooks this group accepts.
    pub kind: HookKind,

    /// Aggregated status of the hooks finished so far.
    pub status: Option<ItemStatus>,
}

impl HookGroup {
    /// Opens a group for hooks of the given `kind`.
    #[must_use]
    pub const fn new(handle: ItemHandle, kind: HookKind) -> Self {
        Self { handle, kind, status: None }
    }

    /// Folds a finished hook's status into the group's aggregated one.
    pub fn update_status(&mut self, status: ItemStatus) {
        self.status = status::evaluate(self.status, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FeatureChild, ScenarioNode};

    fn feature_node() -> FeatureNode {
        FeatureNode {
            uri: "f.feature".into(),
            keyword: "Feature".into(),
            name: "f".into(),
            line: 1,
            source: "Feature: f\n".into(),
            children: vec![FeatureChild::Scenario(ScenarioNode {
                keyword: "Scenario".into(),
                name: "s".into(),
                line: 3,
                example_lines: vec![5, 6],
            })],
        }
    }

    #[test]
    fn scenario_contexts_are_created_on_demand_and_keyed_by_case_line() {
        let mut feature = FeatureContext::new(feature_node());
        assert_eq!(feature.scenario_mut(5).unwrap().line(), 3);
        assert_eq!(feature.scenario_mut(6).unwrap().line(), 3);
        assert!(feature.scenario_mut(42).is_none());
    }

    #[test]
    fn removing_a_scenario_forgets_its_state() {
        let mut feature = FeatureContext::new(feature_node());
        feature
            .scenario_mut(3)
            .unwrap()
            .set_handle(ItemHandle::resolved("s"));
        feature.remove_scenario(3);
        assert!(feature.scenario_mut(3).unwrap().handle().is_none());
    }

    #[test]
    fn hook_group_aggregates_severity() {
        let mut group =
            HookGroup::new(ItemHandle::resolved("g"), HookKind::Before);
        assert_eq!(group.status, None);
        group.update_status(ItemStatus::Passed);
        assert_eq!(group.status, Some(ItemStatus::Passed));
        group.update_status(ItemStatus::Failed);
        assert_eq!(group.status, Some(ItemStatus::Failed));
        group.update_status(ItemStatus::Passed);
        assert_eq!(group.status, Some(ItemStatus::Failed));
    }
}
