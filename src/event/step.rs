// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Test case, step and hook payloads of runner events.

use derive_more::with_trait::Display;

/// Test case announced by a `test-case-started` event.
///
/// For scenario outlines one [`TestCase`] is delivered per examples row, with
/// [`TestCase::line`] pointing at that row rather than at the outline
/// declaration.
#[derive(Clone, Debug)]
pub struct TestCase {
    /// URI of the feature file this test case belongs to.
    pub uri: String,

    /// 1-based source line the test case was expanded from.
    pub line: usize,

    /// Scenario keyword, usually `Scenario` or `Scenario Outline`.
    pub keyword: String,

    /// Scenario name.
    pub name: String,

    /// Tags attached to the test case, `@`-prefixed.
    pub tags: Vec<String>,
}

impl TestCase {
    /// Identifier of this test case unique across a launch, used by the
    /// retry-detection bridge.
    #[must_use]
    pub fn unique_id(&self) -> String {
        format!("{}:{}", self.uri, self.line)
    }
}

/// Step of a test case: either a hook invocation or an actual pickle step.
#[derive(Clone, Debug)]
pub enum TestStep {
    /// Before/after procedure around a scenario or a step.
    Hook(HookStep),

    /// Executable line of a scenario.
    Pickle(PickleStep),
}

/// Hook invocation delivered by a `test-step-started`/`finished` event.
#[derive(Clone, Debug)]
pub struct HookStep {
    /// Which kind of hook this is.
    pub kind: HookKind,

    /// Source location of the hook definition, used as the reported item
    /// name.
    pub code_location: String,
}

/// Kind of a hook relative to the scenario or step it surrounds.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{self:?}")]
pub enum HookKind {
    /// Runs once before all steps of a scenario.
    Before,

    /// Runs once after all steps of a scenario.
    After,

    /// Runs before every step.
    BeforeStep,

    /// Runs after every step.
    AfterStep,
}

impl HookKind {
    /// Display name of the grouping item wrapping consecutive hooks of this
    /// kind.
    #[must_use]
    pub const fn group_name(self) -> &'static str {
        match self {
            Self::Before => "Before hooks",
            Self::After => "After hooks",
            Self::BeforeStep => "Before step",
            Self::AfterStep => "After step",
        }
    }
}

/// Pickle step delivered by a `test-step-started`/`finished` event.
#[derive(Clone, Debug)]
pub struct PickleStep {
    /// Step keyword without trailing whitespace, e.g. `Given`.
    pub keyword: String,

    /// Step text.
    pub text: String,

    /// 1-based source line of the step.
    pub line: usize,

    /// Arguments captured by the step definition match.
    pub match_arguments: Vec<MatchArgument>,

    /// Multiline argument attached to the step, if any.
    pub argument: Option<StepArgument>,
}

/// Single argument captured by a step-definition match.
#[derive(Clone, Debug)]
pub struct MatchArgument {
    /// Name of the parameter type the argument was matched as.
    pub parameter_type: String,

    /// Matched value.
    pub value: String,
}

/// Multiline argument of a pickle step.
#[derive(Clone, Debug)]
pub enum StepArgument {
    /// Doc-string block.
    DocString {
        /// Raw content of the block.
        content: String,
    },

    /// Data table.
    DataTable {
        /// Table cells, outer `Vec` being rows.
        cells: Vec<Vec<String>>,
    },
}

/// Outcome status as reported by the runner.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{self:?}")]
#[non_exhaustive]
pub enum RunnerStatus {
    /// Step or scenario passed.
    Passed,

    /// Step or scenario failed.
    Failed,

    /// Skipped due to an earlier failure.
    Skipped,

    /// Step definition signalled "pending".
    Pending,

    /// Multiple step definitions matched.
    Ambiguous,

    /// No step definition matched.
    Undefined,

    /// Step definition exists but was never matched.
    Unused,
}

/// Result attached to `test-step-finished` and `test-case-finished` events.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Outcome status.
    pub status: RunnerStatus,

    /// Formatted error (message plus stack trace) when the outcome carries
    /// one.
    pub error: Option<String>,
}

impl StepResult {
    /// Shortcut for a passed result.
    #[must_use]
    pub const fn passed() -> Self {
        Self { status: RunnerStatus::Passed, error: None }
    }

    /// Shortcut for a failed result with the given error text.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self { status: RunnerStatus::Failed, error: Some(error.into()) }
    }

    /// Shortcut for a skipped result.
    #[must_use]
    pub const fn skipped() -> Self {
        Self { status: RunnerStatus::Skipped, error: None }
    }
}
