// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use std::sync::Arc;

use cucumber_reportal::{
    Config, ItemStatus, Reporter, RetryRegistry, ScenarioReporter,
    event::{FeatureChild, HookKind, RunnerEvent},
};

use common::{
    RecordingReporter, StaticLoader, at, ev, failed, feature_node, hook,
    passed, pickle, scenario_node, test_case,
};

const URI: &str = "features/hooks.feature";

const FEATURE: &str = "\
Feature: Hooks

  Scenario: Wake the cat
    Given an asleep cat
";

fn reporter_and_case(
    client: &Arc<RecordingReporter>,
) -> (Arc<ScenarioReporter>, cucumber_reportal::event::TestCase) {
    let reporter = ScenarioReporter::with_parts(
        Arc::clone(client) as Arc<dyn Reporter>,
        Config::default(),
        StaticLoader::new(&[(URI, FEATURE)]),
        Arc::new(RetryRegistry::new()),
    );
    let tc = test_case(URI, 3, "Wake the cat");
    reporter.handle_event(ev(
        1,
        RunnerEvent::TestSourceParsed {
            nodes: vec![feature_node(
                URI,
                "Hooks",
                FEATURE,
                vec![FeatureChild::Scenario(scenario_node("Wake the cat", 3))],
            )],
        },
    ));
    reporter
        .handle_event(ev(2, RunnerEvent::TestCaseStarted { test_case: tc.clone() }));
    (reporter, tc)
}

#[test]
fn consecutive_before_hooks_share_one_group() {
    let client = RecordingReporter::new();
    let (reporter, tc) = reporter_and_case(&client);

    for (secs, location) in [(3, "hooks.rs:10"), (5, "hooks.rs:20")] {
        reporter.handle_event(ev(
            secs,
            RunnerEvent::TestStepStarted {
                test_case: tc.clone(),
                step: hook(HookKind::Before, location),
            },
        ));
        reporter.handle_event(ev(
            secs + 1,
            RunnerEvent::TestStepFinished {
                test_case: tc.clone(),
                step: hook(HookKind::Before, location),
                result: passed(),
            },
        ));
    }
    reporter.handle_event(ev(
        7,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: pickle("Given", "an asleep cat", 4),
        },
    ));

    let (scenario_id, _) = client.started("Scenario: Wake the cat");
    let (group_id, group) = client.started("Before hooks");
    assert_eq!(client.parent_of("Before hooks"), Some(scenario_id));
    assert!(!group.has_stats);

    for location in ["hooks.rs:10", "hooks.rs:20"] {
        let (id, rq) = client.started(location);
        assert_eq!(client.parent_of(location), Some(group_id.clone()));
        assert!(!rq.has_stats);
        assert_eq!(client.finished(&id).status, Some(ItemStatus::Passed));
    }

    // The group closes when the first real step starts.
    let finish = client.finished(&group_id);
    assert_eq!(finish.status, Some(ItemStatus::Passed));
    assert_eq!(finish.end_time, at(7));
}

#[test]
fn before_step_hooks_parent_a_virtual_step() {
    let client = RecordingReporter::new();
    let (reporter, tc) = reporter_and_case(&client);

    reporter.handle_event(ev(
        3,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: hook(HookKind::BeforeStep, "hooks.rs:30"),
        },
    ));
    reporter.handle_event(ev(
        4,
        RunnerEvent::TestStepFinished {
            test_case: tc.clone(),
            step: hook(HookKind::BeforeStep, "hooks.rs:30"),
            result: passed(),
        },
    ));
    reporter.handle_event(ev(
        5,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: pickle("Given", "an asleep cat", 4),
        },
    ));

    let (scenario_id, _) = client.started("Scenario: Wake the cat");
    let (step_id, step) = client.started("Given an asleep cat");

    // The group was parented at the step's placeholder before the step
    // itself was announced, and the announced step kept the placeholder
    // handle and the hook's start time.
    assert_eq!(client.parent_of("Before step"), Some(step_id.clone()));
    assert_eq!(client.parent_of("Given an asleep cat"), Some(scenario_id));
    assert_eq!(step.start_time, at(3));
}

#[test]
fn after_step_hooks_attach_to_the_previous_step() {
    let client = RecordingReporter::new();
    let (reporter, tc) = reporter_and_case(&client);

    reporter.handle_event(ev(
        3,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: pickle("Given", "an asleep cat", 4),
        },
    ));
    reporter.handle_event(ev(
        4,
        RunnerEvent::TestStepFinished {
            test_case: tc.clone(),
            step: pickle("Given", "an asleep cat", 4),
            result: passed(),
        },
    ));
    reporter.handle_event(ev(
        5,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: hook(HookKind::AfterStep, "hooks.rs:40"),
        },
    ));

    let (step_id, _) = client.started("Given an asleep cat");
    assert_eq!(client.parent_of("After step"), Some(step_id));
}

#[test]
fn after_step_hooks_without_a_tracked_step_attach_to_the_scenario() {
    let client = RecordingReporter::new();
    let (reporter, tc) = reporter_and_case(&client);

    // No step has finished yet, so there is no previous step to hang the
    // group under.
    reporter.handle_event(ev(
        3,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: hook(HookKind::AfterStep, "hooks.rs:45"),
        },
    ));

    let (scenario_id, _) = client.started("Scenario: Wake the cat");
    assert_eq!(client.parent_of("After step"), Some(scenario_id));
}

#[test]
fn failed_after_hook_fails_its_group() {
    let client = RecordingReporter::new();
    let (reporter, tc) = reporter_and_case(&client);

    reporter.handle_event(ev(
        3,
        RunnerEvent::TestStepStarted {
            test_case: tc.clone(),
            step: hook(HookKind::After, "hooks.rs:50"),
        },
    ));
    reporter.handle_event(ev(
        4,
        RunnerEvent::TestStepFinished {
            test_case: tc.clone(),
            step: hook(HookKind::After, "hooks.rs:50"),
            result: failed("teardown exploded"),
        },
    ));
    reporter.handle_event(ev(
        5,
        RunnerEvent::TestCaseFinished { test_case: tc, result: passed() },
    ));

    let (hook_id, _) = client.started("hooks.rs:50");
    assert_eq!(client.finished(&hook_id).status, Some(ItemStatus::Failed));

    let (group_id, _) = client.started("After hooks");
    let finish = client.finished(&group_id);
    assert_eq!(finish.status, Some(ItemStatus::Failed));
    assert_eq!(finish.end_time, at(5));
}

#[test]
fn changing_hook_kind_rolls_the_group_over() {
    let client = RecordingReporter::new();
    let (reporter, tc) = reporter_and_case(&client);

    for (secs, kind, location) in [
        (3, HookKind::Before, "hooks.rs:10"),
        (5, HookKind::BeforeStep, "hooks.rs:30"),
    ] {
        reporter.handle_event(ev(
            secs,
            RunnerEvent::TestStepStarted {
                test_case: tc.clone(),
                step: hook(kind, location),
            },
        ));
        reporter.handle_event(ev(
            secs + 1,
            RunnerEvent::TestStepFinished {
                test_case: tc.clone(),
                step: hook(kind, location),
                result: passed(),
            },
        ));
    }

    let (before_id, _) = client.started("Before hooks");
    let finish = client.finished(&before_id);
    assert_eq!(finish.status, Some(ItemStatus::Passed));
    // Closed by the kind change, not by a step.
    assert_eq!(finish.end_time, at(5));
    client.started("Before step");
}
