// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsed feature-source descriptors delivered by the runner.
//!
//! These are the nodes carried by a `test-source-parsed` event: a lightweight
//! projection of one feature file, enough to synthesize the remote hierarchy
//! the runner itself never reports (features and rules have no lifecycle
//! events of their own).

/// Single node of a parsed test source.
#[derive(Clone, Debug)]
pub enum SourceNode {
    /// A parsed feature file.
    Feature(FeatureNode),

    /// Any node kind the reporter doesn't model. Carried so the dispatcher
    /// can log what it skipped.
    Other(String),
}

/// Parsed descriptor of one feature file.
#[derive(Clone, Debug)]
pub struct FeatureNode {
    /// URI the feature was loaded from.
    pub uri: String,

    /// Feature keyword, usually `Feature`.
    pub keyword: String,

    /// Feature name.
    pub name: String,

    /// 1-based line of the feature declaration.
    pub line: usize,

    /// Raw text of the feature file, used for tag scanning.
    pub source: String,

    /// Direct children in declaration order.
    pub children: Vec<FeatureChild>,
}

/// Direct child of a [`FeatureNode`].
#[derive(Clone, Debug)]
pub enum FeatureChild {
    /// A `Rule` grouping scenarios.
    Rule(RuleNode),

    /// A scenario or scenario outline declared outside any rule.
    Scenario(ScenarioNode),
}

impl FeatureChild {
    /// 1-based declaration line of this child.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Rule(r) => r.line,
            Self::Scenario(s) => s.line,
        }
    }
}

/// Parsed descriptor of a `Rule` node.
#[derive(Clone, Debug)]
pub struct RuleNode {
    /// Rule keyword, usually `Rule`.
    pub keyword: String,

    /// Rule name.
    pub name: String,

    /// 1-based line of the rule declaration.
    pub line: usize,

    /// Scenarios declared under this rule, in declaration order.
    pub scenarios: Vec<ScenarioNode>,
}

/// Parsed descriptor of a scenario or scenario outline.
#[derive(Clone, Debug)]
pub struct ScenarioNode {
    /// Scenario keyword, usually `Scenario` or `Scenario Outline`.
    pub keyword: String,

    /// Scenario name.
    pub name: String,

    /// 1-based line of the scenario declaration.
    pub line: usize,

    /// Lines of `Examples` table value rows, one per expanded test case.
    /// Empty for plain scenarios.
    pub example_lines: Vec<usize>,
}

impl ScenarioNode {
    /// Whether a test case reported at the given `line` originates from this
    /// scenario (either its declaration or one of its examples rows).
    #[must_use]
    pub fn covers_line(&self, line: usize) -> bool {
        self.line == line || self.example_lines.contains(&line)
    }
}

impl FeatureNode {
    /// Looks up the scenario expanded into a test case at the given source
    /// `line`, along with its enclosing rule (if any).
    #[must_use]
    pub fn find_scenario(
        &self,
        line: usize,
    ) -> Option<(Option<&RuleNode>, &ScenarioNode)> {
        for child in &self.children {
            match child {
                FeatureChild::Scenario(s) if s.covers_line(line) => {
                    return Some((None, s));
                }
                FeatureChild::Rule(r) => {
                    if let Some(s) =
                        r.scenarios.iter().find(|s| s.covers_line(line))
                    {
                        return Some((Some(r), s));
                    }
                }
                FeatureChild::Scenario(_) => {}
            }
        }
        None
    }
}
