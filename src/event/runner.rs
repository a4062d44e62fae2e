// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The inbound runner event contract.

use super::{SourceNode, StepResult, TestCase, TestStep};

/// Event delivered by the test runner.
///
/// The runner guarantees per-test-case ordering of its events; events of
/// distinct test cases may interleave arbitrarily.
#[derive(Clone, Debug)]
pub enum RunnerEvent {
    /// First event of a run; opens the launch.
    TestRunStarted,

    /// A batch of test sources has been parsed.
    TestSourceParsed {
        /// Parsed nodes; only feature nodes are handled.
        nodes: Vec<SourceNode>,
    },

    /// A test case is about to execute.
    TestCaseStarted {
        /// The starting test case.
        test_case: TestCase,
    },

    /// A hook or pickle step is about to execute.
    TestStepStarted {
        /// Test case the step belongs to.
        test_case: TestCase,

        /// The starting step.
        step: TestStep,
    },

    /// A hook or pickle step has finished.
    TestStepFinished {
        /// Test case the step belongs to.
        test_case: TestCase,

        /// The finished step.
        step: TestStep,

        /// Step outcome.
        result: StepResult,
    },

    /// A test case has finished.
    TestCaseFinished {
        /// The finished test case.
        test_case: TestCase,

        /// Test case outcome.
        result: StepResult,
    },

    /// Last event of a run; closes all open features and the launch.
    TestRunFinished,

    /// Binary attachment embedded from test code.
    Embed {
        /// Attachment name, possibly empty.
        name: Option<String>,

        /// Declared MIME type; may be absent or malformed.
        media_type: Option<String>,

        /// Attachment bytes.
        data: Vec<u8>,
    },

    /// Plain-text message written from test code.
    Write {
        /// The message.
        text: String,
    },
}
