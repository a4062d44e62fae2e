// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use cucumber_reportal::{
    client::{
        FinishItemRequest, ItemHandle, LogEntry, Reporter, StartItemRequest,
        StartLaunchRequest,
    },
    event::{
        Event, FeatureChild, FeatureNode, HookKind, HookStep, PickleStep,
        RuleNode, RunnerEvent, RunnerStatus, ScenarioNode, SourceNode,
        StepArgument, StepResult, TestCase, TestStep,
    },
    source::SourceLoader,
};

/// Single operation observed by a [`RecordingReporter`].
#[derive(Clone, Debug)]
pub enum Call {
    StartLaunch(StartLaunchRequest),
    FinishLaunch(SystemTime),
    StartItem {
        parent: Option<String>,
        id: String,
        request: StartItemRequest,
    },
    StartVirtualItem {
        parent: String,
        id: String,
        request: StartItemRequest,
    },
    FinishItem {
        id: String,
        request: FinishItemRequest,
    },
    Log {
        item: Option<String>,
        entry: LogEntry,
    },
}

/// Client double journaling every call and resolving handles immediately
/// with sequential `item-N` ids.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Id and start request of the first started item whose name contains
    /// `fragment`.
    pub fn started(&self, fragment: &str) -> (String, StartItemRequest) {
        self.calls()
            .into_iter()
            .find_map(|call| match call {
                Call::StartItem { id, request, .. }
                | Call::StartVirtualItem { id, request, .. }
                    if request.name.contains(fragment) =>
                {
                    Some((id, request))
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no item named `*{fragment}*` started"))
    }

    /// Parent id the item named `*fragment*` was started under.
    pub fn parent_of(&self, fragment: &str) -> Option<String> {
        self.calls()
            .into_iter()
            .find_map(|call| match call {
                Call::StartItem { parent, request, .. }
                    if request.name.contains(fragment) =>
                {
                    Some(parent)
                }
                Call::StartVirtualItem { parent, request, .. }
                    if request.name.contains(fragment) =>
                {
                    Some(Some(parent))
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no item named `*{fragment}*` started"))
    }

    /// Finish request of the item with the given id.
    pub fn finished(&self, id: &str) -> FinishItemRequest {
        self.calls()
            .into_iter()
            .find_map(|call| match call {
                Call::FinishItem { id: finished, request }
                    if finished == id =>
                {
                    Some(request)
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("item `{id}` never finished"))
    }

    pub fn finish_count(&self, id: &str) -> usize {
        self.calls()
            .iter()
            .filter(
                |call| matches!(call, Call::FinishItem { id: f, .. } if f == id),
            )
            .count()
    }

    pub fn logs(&self) -> Vec<(Option<String>, LogEntry)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Log { item, entry } => Some((item, entry)),
                _ => None,
            })
            .collect()
    }

    fn next_id(&self) -> String {
        format!("item-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Reporter for RecordingReporter {
    fn start_launch(&self, request: StartLaunchRequest) -> ItemHandle {
        self.record(Call::StartLaunch(request));
        ItemHandle::resolved("launch")
    }

    fn finish_launch(&self, end_time: SystemTime) {
        self.record(Call::FinishLaunch(end_time));
    }

    fn start_root_item(&self, request: StartItemRequest) -> ItemHandle {
        let id = self.next_id();
        self.record(Call::StartItem { parent: None, id: id.clone(), request });
        ItemHandle::resolved(id)
    }

    fn start_item(
        &self,
        parent: &ItemHandle,
        request: StartItemRequest,
    ) -> ItemHandle {
        let id = self.next_id();
        self.record(Call::StartItem {
            parent: parent.peek(),
            id: id.clone(),
            request,
        });
        ItemHandle::resolved(id)
    }

    fn create_virtual_item(&self) -> ItemHandle {
        ItemHandle::resolved(self.next_id())
    }

    fn start_virtual_item(
        &self,
        parent: &ItemHandle,
        placeholder: &ItemHandle,
        request: StartItemRequest,
    ) -> ItemHandle {
        self.record(Call::StartVirtualItem {
            parent: parent.peek().unwrap(),
            id: placeholder.peek().unwrap(),
            request,
        });
        placeholder.clone()
    }

    fn finish_item(&self, item: &ItemHandle, request: FinishItemRequest) {
        self.record(Call::FinishItem { id: item.peek().unwrap(), request });
    }

    fn emit_log(&self, item: Option<&ItemHandle>, entry: LogEntry) {
        self.record(Call::Log { item: item.and_then(ItemHandle::peek), entry });
    }
}

/// In-memory [`SourceLoader`] keyed by URI.
#[derive(Debug, Default)]
pub struct StaticLoader(HashMap<String, String>);

impl StaticLoader {
    pub fn new(sources: &[(&str, &str)]) -> Box<Self> {
        Box::new(Self(
            sources
                .iter()
                .map(|(uri, text)| ((*uri).to_owned(), (*text).to_owned()))
                .collect(),
        ))
    }
}

impl SourceLoader for StaticLoader {
    fn load(&self, uri: &str) -> io::Result<String> {
        self.0.get(uri).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, uri.to_owned())
        })
    }
}

/// Deterministic timestamp `secs` seconds past the epoch.
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Wraps a runner event into an envelope stamped [`at(secs)`](at).
pub fn ev(secs: u64, value: RunnerEvent) -> Event<RunnerEvent> {
    Event::at(value, at(secs))
}

pub fn scenario_node(name: &str, line: usize) -> ScenarioNode {
    ScenarioNode {
        keyword: "Scenario".into(),
        name: name.into(),
        line,
        example_lines: Vec::new(),
    }
}

pub fn feature_node(
    uri: &str,
    name: &str,
    source: &str,
    children: Vec<FeatureChild>,
) -> SourceNode {
    let line = source
        .lines()
        .position(|l| l.trim_start().starts_with("Feature"))
        .map_or(1, |i| i + 1);
    SourceNode::Feature(FeatureNode {
        uri: uri.into(),
        keyword: "Feature".into(),
        name: name.into(),
        line,
        source: source.into(),
        children,
    })
}

pub fn rule_node(
    name: &str,
    line: usize,
    scenarios: Vec<ScenarioNode>,
) -> FeatureChild {
    FeatureChild::Rule(RuleNode {
        keyword: "Rule".into(),
        name: name.into(),
        line,
        scenarios,
    })
}

pub fn test_case(uri: &str, line: usize, name: &str) -> TestCase {
    TestCase {
        uri: uri.into(),
        line,
        keyword: "Scenario".into(),
        name: name.into(),
        tags: Vec::new(),
    }
}

pub fn pickle(keyword: &str, text: &str, line: usize) -> TestStep {
    TestStep::Pickle(PickleStep {
        keyword: keyword.into(),
        text: text.into(),
        line,
        match_arguments: Vec::new(),
        argument: None,
    })
}

pub fn doc_string(
    keyword: &str,
    text: &str,
    line: usize,
    content: &str,
) -> TestStep {
    TestStep::Pickle(PickleStep {
        keyword: keyword.into(),
        text: text.into(),
        line,
        match_arguments: Vec::new(),
        argument: Some(StepArgument::DocString { content: content.into() }),
    })
}

pub fn hook(kind: HookKind, code_location: &str) -> TestStep {
    TestStep::Hook(HookStep { kind, code_location: code_location.into() })
}

pub fn passed() -> StepResult {
    StepResult { status: RunnerStatus::Passed, error: None }
}

pub fn failed(error: &str) -> StepResult {
    StepResult { status: RunnerStatus::Failed, error: Some(error.into()) }
}

pub fn skipped() -> StepResult {
    StepResult { status: RunnerStatus::Skipped, error: None }
}
