// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in a lifecycle of a test run, as delivered by the runner.
//!
//! The top-level enum here is [`RunnerEvent`]; every variant corresponds to
//! one inbound event of the runner contract. Payload types describe test
//! cases, steps, hooks and parsed source nodes. The [`Event`] envelope pairs
//! any of them with the time of occurrence.

pub mod envelope;
pub mod node;
pub mod runner;
pub mod step;

pub use self::{
    envelope::{Event, Metadata},
    node::{FeatureChild, FeatureNode, RuleNode, ScenarioNode, SourceNode},
    runner::RunnerEvent,
    step::{
        HookKind, HookStep, MatchArgument, PickleStep, RunnerStatus,
        StepArgument, StepResult, TestCase, TestStep,
    },
};
