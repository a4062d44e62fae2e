// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translation of runner events into remote launch/test-item lifecycles.
//!
//! [`ScenarioReporter`] is the single entry point: it registers the per-URI
//! feature contexts when sources are parsed, opens features lazily on their
//! first scenario, switches rules, wraps consecutive hooks of one kind into
//! grouping items, upgrades virtual step placeholders, attributes errors and
//! synthesizes feature ends when the launch finishes, none of which the
//! runner ever reports directly.

pub mod context;

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex},
    time::SystemTime,
};

use once_cell::sync::OnceCell;
use tracing::{error, warn};

use crate::{
    attachment,
    client::{
        Attachment, FinishItemRequest, ItemHandle, ItemType, LogEntry,
        LogLevel, Parameter, Reporter, StartItemRequest, StartLaunchRequest,
    },
    config::Config,
    event::{
        Event, HookKind, HookStep, PickleStep, RuleNode, RunnerEvent,
        SourceNode, StepArgument, StepResult, TestCase, TestStep,
    },
    extract::{
        self, ExtractError, TEST_CASE_ID_PREFIX, build_name, code_ref,
        multiline_argument, relative_path, test_case_id,
    },
    retry::RetryRegistry,
    source::{FsLoader, SourceLoader},
    status::{ItemStatus, map_status},
    tree::ItemTree,
};

pub use context::{
    FeatureContext, HookGroup, RuleContext, ScenarioContext, Step, StepKind,
};

/// Prefix of steps belonging to a feature's background.
pub const BACKGROUND_PREFIX: &str = "BACKGROUND: ";

/// Infix between a keyword and a name in item names.
const COLON_INFIX: &str = ": ";

/// Separator between a captured description and an appended error.
const DESCRIPTION_SEPARATOR: &str = "\n---\n";

/// Maximum number of error lines kept when truncation is enabled.
const ERROR_LINE_LIMIT: usize = 20;

thread_local! {
    static CURRENT: RefCell<Option<Arc<ScenarioReporter>>> =
        const { RefCell::new(None) };
}

/// Event-to-hierarchy translator projecting a runner's event stream onto a
/// remote reporting service.
///
/// One reporter drives one launch. Handlers may be invoked from multiple
/// threads; the runner guarantees per-test-case ordering, and all shared
/// state lives behind its own lock. No handler blocks on the reporting
/// client, since start and finish operations return deferred handles.
pub struct ScenarioReporter {
    client: Arc<dyn Reporter>,
    config: Config,
    loader: Box<dyn SourceLoader>,
    retries: Arc<RetryRegistry>,
    tree: ItemTree,

    /// Feature contexts keyed by URI, registered on source parse.
    features: Mutex<HashMap<String, FeatureContext>>,

    /// Last scenario end time per feature URI. The runner has no
    /// end-of-feature event; features are closed with these times when the
    /// launch finishes.
    feature_end_times: Mutex<HashMap<String, SystemTime>>,

    /// Descriptions captured at item start, appended-to on failure.
    descriptions: Mutex<HashMap<ItemHandle, String>>,

    /// Last error attributed to an item, consumed at finish.
    errors: Mutex<HashMap<ItemHandle, String>>,

    /// First-attempt scenario handles keyed by `uri:line`, referenced by
    /// retry start requests.
    first_attempts: Mutex<HashMap<String, ItemHandle>>,

    launch: OnceCell<ItemHandle>,

    /// Captured eagerly at construction so a lazily materialized launch
    /// still reports the true start of the run.
    launch_start: SystemTime,
}

impl ScenarioReporter {
    /// Creates a reporter over the given client with filesystem source
    /// loading and a fresh retry registry, and installs it as the current
    /// reporter of the calling thread.
    #[must_use]
    pub fn new(client: Arc<dyn Reporter>, config: Config) -> Arc<Self> {
        Self::with_parts(
            client,
            config,
            Box::new(FsLoader),
            Arc::new(RetryRegistry::new()),
        )
    }

    /// Creates a reporter with explicit collaborators.
    #[must_use]
    pub fn with_parts(
        client: Arc<dyn Reporter>,
        config: Config,
        loader: Box<dyn SourceLoader>,
        retries: Arc<RetryRegistry>,
    ) -> Arc<Self> {
        let reporter = Arc::new(Self {
            client,
            config,
            loader,
            retries,
            tree: ItemTree::new(),
            features: Mutex::new(HashMap::new()),
            feature_end_times: Mutex::new(HashMap::new()),
            descriptions: Mutex::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
            first_attempts: Mutex::new(HashMap::new()),
            launch: OnceCell::new(),
            launch_start: SystemTime::now(),
        });
        Self::install_current(&reporter);
        reporter
    }

    /// Returns the reporter installed for the current thread.
    ///
    /// Step-definition code uses this to reach the reporter for callback
    /// reporting. Worker threads spawned by the runner must republish the
    /// instance via [`ScenarioReporter::install_current`] first.
    #[must_use]
    pub fn current() -> Option<Arc<Self>> {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Installs the given reporter as the current one of the calling thread.
    pub fn install_current(reporter: &Arc<Self>) {
        CURRENT.with(|current| {
            *current.borrow_mut() = Some(Arc::clone(reporter));
        });
    }

    /// Item tree for callback-reporting consumers. Populated only when
    /// [`Config::callback_reporting`] is enabled.
    #[must_use]
    pub const fn item_tree(&self) -> &ItemTree {
        &self.tree
    }

    /// Retry registry shared with the runner-side retry listener.
    #[must_use]
    pub fn retry_registry(&self) -> Arc<RetryRegistry> {
        Arc::clone(&self.retries)
    }

    /// Handle of the launch, materializing it on first use.
    pub fn launch(&self) -> ItemHandle {
        self.launch
            .get_or_init(|| {
                let request = StartLaunchRequest {
                    name: self.config.launch_name.clone(),
                    description: self.config.launch_description.clone(),
                    start_time: self.launch_start,
                    mode: self.config.launch_mode,
                    attributes: self.config.launch_attributes(),
                    rerun: self.config.rerun,
                    rerun_of: self.config.rerun_of.clone(),
                };
                let handle = self.client.start_launch(request);
                self.tree.set_launch(handle.clone());
                handle
            })
            .clone()
    }

    /// Dispatches a single runner event.
    pub fn handle_event(&self, event: Event<RunnerEvent>) {
        let at = event.at;
        match event.into_inner() {
            RunnerEvent::TestRunStarted => {
                self.launch();
            }
            RunnerEvent::TestSourceParsed { nodes } => {
                self.handle_source_parsed(nodes);
            }
            RunnerEvent::TestCaseStarted { test_case } => {
                self.handle_test_case_started(&test_case, at);
            }
            RunnerEvent::TestStepStarted { test_case, step } => match step {
                TestStep::Hook(hook) => {
                    self.handle_hook_started(&test_case, &hook, at);
                }
                TestStep::Pickle(step) => {
                    self.handle_step_started(&test_case, &step, at);
                }
            },
            RunnerEvent::TestStepFinished { test_case, step, result } => {
                match step {
                    TestStep::Hook(_) => {
                        self.handle_hook_finished(&test_case, &result, at);
                    }
                    TestStep::Pickle(step) => {
                        self.handle_step_finished(
                            &test_case, &step, &result, at,
                        );
                    }
                }
            }
            RunnerEvent::TestCaseFinished { test_case, result } => {
                self.handle_test_case_finished(&test_case, &result, at);
            }
            RunnerEvent::TestRunFinished => {
                self.handle_test_run_finished(at);
            }
            RunnerEvent::Embed { name, media_type, data } => {
                self.handle_embed(
                    name.as_deref(),
                    media_type.as_deref(),
                    data,
                    at,
                );
            }
            RunnerEvent::Write { text } => {
                self.client
                    .emit_log(None, LogEntry::text(LogLevel::Info, text, at));
            }
        }
    }

    /// Registers feature contexts for every parsed feature node.
    fn handle_source_parsed(&self, nodes: Vec<SourceNode>) {
        let mut features = self.features.lock().unwrap();
        for node in nodes {
            match node {
                SourceNode::Feature(feature) => {
                    features.insert(
                        feature.uri.clone(),
                        FeatureContext::new(feature),
                    );
                }
                SourceNode::Other(kind) => {
                    warn!("unknown source node type: {kind}");
                }
            }
        }
    }

    /// Opens the feature (if not open yet), switches the current rule and
    /// opens the scenario.
    fn handle_test_case_started(&self, test_case: &TestCase, at: SystemTime) {
        let launch = self.launch();
        // The only blocking work: reading the feature source for parameter
        // extraction. Done before any lock is taken.
        let parameters = self.example_parameters(test_case);

        let mut features = self.features.lock().unwrap();
        let Some(feature) = features.get_mut(&test_case.uri) else {
            warn!(uri = test_case.uri, "no feature context for test case");
            return;
        };

        if feature.handle().is_none() {
            let request = Self::build_start_feature_request(feature, at);
            let handle = self.client.start_root_item(request);
            feature.set_handle(handle.clone());
            if self.config.callback_reporting {
                self.tree.add_feature(test_case.uri.clone(), handle);
            }
        }
        let feature_handle =
            feature.handle().cloned().unwrap_or_else(|| launch.clone());

        let scenario_rule = feature
            .scenario_mut(test_case.line)
            .and_then(|s| s.rule().cloned());
        self.switch_rule(feature, scenario_rule.as_ref(), &feature_handle, at);
        let parent = feature
            .current_rule()
            .map_or_else(|| feature_handle.clone(), |r| r.handle.clone());

        let feature_tags = feature.tags().clone();
        let Some(scenario) = feature.scenario_mut(test_case.line) else {
            warn!(
                uri = test_case.uri,
                line = test_case.line,
                "no scenario context for test case",
            );
            return;
        };
        scenario.set_test_case(test_case.clone());

        let request = self.build_start_scenario_request(
            test_case,
            parameters,
            &feature_tags,
            at,
        );
        let description = request.description.clone().unwrap_or_default();
        let retry = request.retry;
        let handle = self.client.start_item(&parent, request);
        scenario.set_handle(handle.clone());
        self.descriptions
            .lock()
            .unwrap()
            .insert(handle.clone(), description);
        if !retry {
            self.first_attempts
                .lock()
                .unwrap()
                .insert(test_case.unique_id(), handle.clone());
        }
        if self.config.callback_reporting {
            self.tree.add_scenario(&test_case.uri, test_case.line, handle);
        }
    }

    /// Closes the outgoing rule and opens the incoming one when the
    /// scenario's rule differs from the feature's current one.
    fn switch_rule(
        &self,
        feature: &mut FeatureContext,
        rule: Option<&RuleNode>,
        feature_handle: &ItemHandle,
        at: SystemTime,
    ) {
        let current_line = feature.current_rule().map(|r| r.line);
        if current_line == rule.map(|r| r.line) {
            return;
        }

        let incoming = rule.map(|node| {
            let name = build_name(
                Some(&node.keyword),
                COLON_INFIX,
                &node.name,
            );
            let mut request = StartItemRequest::new(name, ItemType::Suite, at);
            request.attributes = extract::rule_tags(feature.node(), node)
                .iter()
                .map(|tag| extract::to_attribute(tag))
                .collect();
            let handle = self.client.start_item(feature_handle, request);
            RuleContext { line: node.line, handle }
        });
        if let Some(outgoing) = feature.replace_current_rule(incoming) {
            self.finish_item(Some(&outgoing.handle), None, Some(at));
        }
    }

    /// Builds the start request of a feature item.
    fn build_start_feature_request(
        feature: &FeatureContext,
        at: SystemTime,
    ) -> StartItemRequest {
        let node = feature.node();
        let name = if node.name.is_empty() {
            relative_path(&node.uri)
        } else {
            node.name.clone()
        };
        let mut request = StartItemRequest::new(
            build_name(Some(&node.keyword), COLON_INFIX, &name),
            ItemType::Story,
            at,
        );
        request.description = Some(node.uri.clone());
        request.attributes = feature
            .tags()
            .iter()
            .map(|tag| extract::to_attribute(tag))
            .collect();
        request
    }

    /// Builds the start request of a scenario item, deriving parameters,
    /// code reference, test-case identifier, attributes and retry state.
    fn build_start_scenario_request(
        &self,
        test_case: &TestCase,
        parameters: Option<Vec<Parameter>>,
        feature_tags: &BTreeSet<String>,
        at: SystemTime,
    ) -> StartItemRequest {
        let mut request = StartItemRequest::new(
            build_name(
                Some(&test_case.keyword),
                COLON_INFIX,
                &test_case.name,
            ),
            ItemType::Step,
            at,
        );
        request.code_ref = Some(code_ref(
            &test_case.uri,
            &test_case.name,
            parameters.as_deref(),
        ));
        request.test_case_id = Some(test_case_id(
            &test_case.tags,
            &test_case.uri,
            &test_case.name,
            parameters.as_deref(),
        ));
        request.attributes = test_case
            .tags
            .iter()
            .filter(|tag| !tag.starts_with(TEST_CASE_ID_PREFIX))
            .filter(|tag| !feature_tags.contains(*tag))
            .map(|tag| extract::to_attribute(tag))
            .collect();
        request.parameters = parameters.unwrap_or_default();

        let unique_id = test_case.unique_id();
        if self.retries.is_retry(&unique_id) {
            request.retry = true;
            request.retry_of =
                self.first_attempts.lock().unwrap().get(&unique_id).cloned();
        }
        request
    }

    /// Extracts `Examples`-row parameters for a test case, reading its
    /// feature source. Extraction failures degrade the scenario to a
    /// non-parameterized one.
    fn example_parameters(
        &self,
        test_case: &TestCase,
    ) -> Option<Vec<Parameter>> {
        let source = match self.loader.load(&test_case.uri) {
            Ok(source) => source,
            Err(err) => {
                error!(
                    uri = test_case.uri,
                    "failed to read feature source: {err}",
                );
                return None;
            }
        };
        match extract::example_parameters(&source, test_case.line) {
            Ok(parameters) => Some(parameters),
            // Plain scenarios don't sit on a table row; nothing to report.
            Err(ExtractError::NotExampleRow { .. }) => None,
            Err(err) => {
                warn!(
                    uri = test_case.uri,
                    line = test_case.line,
                    "examples-table parameter extraction failed: {err}",
                );
                None
            }
        }
    }

    /// Opens (or extends) a hook group and the individual hook item.
    fn handle_hook_started(
        &self,
        test_case: &TestCase,
        hook: &HookStep,
        at: SystemTime,
    ) {
        self.with_scenario(test_case, |reporter, scenario| {
            let same_kind = scenario
                .hook_group()
                .is_some_and(|group| group.kind == hook.kind);
            if !same_kind {
                if let Some(group) = scenario.take_hook_group() {
                    reporter.finish_item(
                        Some(&group.handle),
                        Some(group.status.unwrap_or(ItemStatus::Passed)),
                        Some(at),
                    );
                }

                let scenario_handle = scenario.handle().cloned();
                let parent = match hook.kind {
                    HookKind::BeforeStep => {
                        // The step itself hasn't been announced yet: park
                        // its hooks under a placeholder the real step will
                        // reuse.
                        let placeholder = reporter.client.create_virtual_item();
                        scenario.set_current_step(Step {
                            handle: placeholder.clone(),
                            kind: StepKind::Virtual,
                            started_at: at,
                        });
                        Some(placeholder)
                    }
                    HookKind::AfterStep => scenario
                        .previous_step()
                        .map(|step| step.handle.clone())
                        .or_else(|| {
                            warn!(
                                "no step tracked for an AfterStep hook, \
                                 parenting at the scenario",
                            );
                            scenario_handle.clone()
                        }),
                    HookKind::Before | HookKind::After => {
                        scenario_handle.clone()
                    }
                };
                let Some(parent) = parent else {
                    error!("BUG: hook started before its scenario");
                    return;
                };

                let request = StartItemRequest::new(
                    hook.kind.group_name(),
                    ItemType::Step,
                    at,
                )
                .without_stats();
                let handle = reporter.client.start_item(&parent, request);
                scenario.set_hook_group(HookGroup::new(handle, hook.kind));
            }

            let Some(group) = scenario.hook_group() else { return };
            let request = StartItemRequest::new(
                hook.code_location.clone(),
                ItemType::Step,
                at,
            )
            .without_stats();
            let handle = reporter.client.start_item(&group.handle, request);
            scenario.set_current_hook(handle);
        });
    }

    /// Closes the individual hook item and folds its status into the group.
    fn handle_hook_finished(
        &self,
        test_case: &TestCase,
        result: &StepResult,
        at: SystemTime,
    ) {
        self.with_scenario(test_case, |reporter, scenario| {
            let hook = scenario.take_current_hook();
            reporter.report_result_error(hook.as_ref(), result, at);
            let status = map_status(result.status);
            reporter.finish_item(hook.as_ref(), Some(status), Some(at));
            if let Some(group) = scenario.hook_group_mut() {
                group.update_status(status);
            }
        });
    }

    /// Opens a step item, upgrading a virtual placeholder when one exists.
    fn handle_step_started(
        &self,
        test_case: &TestCase,
        step: &PickleStep,
        at: SystemTime,
    ) {
        let argument = multiline_argument(step);
        self.with_scenario(test_case, |reporter, scenario| {
            reporter.flush_hook_group(scenario, at);

            let background = step.line < scenario.line();
            let prefix = background.then_some(BACKGROUND_PREFIX);
            let mut request = StartItemRequest::new(
                build_name(
                    prefix,
                    &format!("{} ", step.keyword),
                    &step.text,
                ),
                ItemType::Step,
                at,
            )
            .without_stats();
            if !argument.is_empty() {
                request.description = Some(argument.clone());
            }
            request.parameters = Self::step_parameters(step);

            let Some(scenario_handle) = scenario.handle().cloned() else {
                error!("BUG: step started before its scenario");
                return;
            };
            let handle = match scenario.take_current_step() {
                Some(current) if current.kind == StepKind::Virtual => {
                    // Reuse the placeholder and restore the original start
                    // time, so the step predates its own BeforeStep hooks.
                    request.start_time = current.started_at;
                    reporter.client.start_virtual_item(
                        &scenario_handle,
                        &current.handle,
                        request,
                    )
                }
                Some(_) => {
                    warn!(
                        step = step.text,
                        "starting a step while another one is still \
                         active, likely an unfinished step",
                    );
                    reporter.client.start_item(&scenario_handle, request)
                }
                None => {
                    reporter.client.start_item(&scenario_handle, request)
                }
            };
            scenario.set_current_step(Step {
                handle: handle.clone(),
                kind: StepKind::Normal,
                started_at: at,
            });

            let trimmed = argument.trim();
            if !trimmed.is_empty() {
                reporter.client.emit_log(
                    Some(&handle),
                    LogEntry::text(LogLevel::Info, trimmed, at),
                );
            }
            if reporter.config.callback_reporting {
                reporter.tree.add_step(
                    &test_case.uri,
                    test_case.line,
                    step.text.clone(),
                    handle,
                );
            }
        });
    }

    /// Closes the current step, attributing its error on failure.
    fn handle_step_finished(
        &self,
        test_case: &TestCase,
        step: &PickleStep,
        result: &StepResult,
        at: SystemTime,
    ) {
        self.with_scenario(test_case, |reporter, scenario| {
            match scenario.take_current_step() {
                Some(current) if current.kind == StepKind::Normal => {
                    reporter.report_result_error(
                        Some(&current.handle),
                        result,
                        at,
                    );
                    let status = map_status(result.status);
                    if status == ItemStatus::Failed {
                        if let Some(error) = &result.error {
                            reporter.errors.lock().unwrap().insert(
                                current.handle.clone(),
                                error.clone(),
                            );
                        }
                    }
                    reporter.finish_item(
                        Some(&current.handle),
                        Some(status),
                        Some(at),
                    );
                    scenario.set_previous_step(current);
                }
                // The error is still worth a log even when the tracked step
                // is gone; it just cannot be attached to an item.
                Some(_) => {
                    reporter.report_result_error(None, result, at);
                    error!(
                        step = step.text,
                        "BUG: trying to finish a virtual step item",
                    );
                }
                None => {
                    reporter.report_result_error(None, result, at);
                    error!(
                        step = step.text,
                        "BUG: trying to finish an unspecified step item",
                    );
                }
            }
        });
    }

    /// Flushes hooks, closes the scenario and records the feature end time.
    fn handle_test_case_finished(
        &self,
        test_case: &TestCase,
        result: &StepResult,
        at: SystemTime,
    ) {
        self.with_scenario(test_case, |reporter, scenario| {
            reporter.flush_hook_group(scenario, at);
            let status = map_status(result.status);
            let handle = scenario.handle().cloned();
            if status == ItemStatus::Failed {
                if let (Some(handle), Some(error)) = (&handle, &result.error)
                {
                    reporter
                        .errors
                        .lock()
                        .unwrap()
                        .insert(handle.clone(), error.clone());
                }
            }
            reporter.finish_item(handle.as_ref(), Some(status), Some(at));
            reporter
                .feature_end_times
                .lock()
                .unwrap()
                .insert(test_case.uri.clone(), at);
        });
        self.tree.remove_scenario(&test_case.uri, test_case.line);
        if let Some(feature) =
            self.features.lock().unwrap().get_mut(&test_case.uri)
        {
            feature.remove_scenario(test_case.line);
        }
    }

    /// Closes every open rule and feature with its recorded end time, then
    /// the launch itself.
    fn handle_test_run_finished(&self, at: SystemTime) {
        let features = std::mem::take(&mut *self.features.lock().unwrap());
        let end_times =
            std::mem::take(&mut *self.feature_end_times.lock().unwrap());
        for (uri, mut feature) in features {
            let end = end_times.get(&uri).copied();
            if let Some(rule) = feature.replace_current_rule(None) {
                self.finish_item(Some(&rule.handle), None, end);
            }
            if let Some(handle) = feature.handle() {
                self.finish_item(Some(handle), None, end);
            }
            self.tree.remove_feature(&uri);
        }
        self.launch();
        self.client.finish_launch(at);
    }

    /// Emits a log entry with the embedded attachment, resolving MIME type
    /// and display name.
    fn handle_embed(
        &self,
        name: Option<&str>,
        media_type: Option<&str>,
        data: Vec<u8>,
        at: SystemTime,
    ) {
        let media_type =
            attachment::resolve_media_type(media_type, &data, name);
        let name = attachment::display_name(name, media_type.as_deref());
        self.client.emit_log(
            None,
            LogEntry {
                level: LogLevel::Info,
                message: name.clone(),
                time: at,
                attachment: Some(Attachment { name, media_type, data }),
            },
        );
    }

    /// Runs `action` with the scenario context of the given test case,
    /// dropping the event with a warning when no context matches.
    fn with_scenario(
        &self,
        test_case: &TestCase,
        action: impl FnOnce(&Self, &mut ScenarioContext),
    ) {
        let mut features = self.features.lock().unwrap();
        let Some(feature) = features.get_mut(&test_case.uri) else {
            warn!(uri = test_case.uri, "no feature context for test case");
            return;
        };
        let Some(scenario) = feature.scenario_mut(test_case.line) else {
            warn!(
                uri = test_case.uri,
                line = test_case.line,
                "no scenario context for test case",
            );
            return;
        };
        action(self, scenario);
    }

    /// Closes the open hook group (if any) with its aggregated status.
    fn flush_hook_group(&self, scenario: &mut ScenarioContext, at: SystemTime) {
        if let Some(group) = scenario.take_hook_group() {
            self.finish_item(
                Some(&group.handle),
                Some(group.status.unwrap_or(ItemStatus::Passed)),
                Some(at),
            );
        }
    }

    /// Emits the result's error (if any) as a log attached to `item`.
    fn report_result_error(
        &self,
        item: Option<&ItemHandle>,
        result: &StepResult,
        at: SystemTime,
    ) {
        if let Some(error) = &result.error {
            self.client.emit_log(
                item,
                LogEntry::text(LogLevel::Error, self.format_error(error), at),
            );
        }
    }

    /// Finishes a remote item, composing the failure description from the
    /// side tables. A missing handle is a bug-log and a no-op.
    fn finish_item(
        &self,
        item: Option<&ItemHandle>,
        status: Option<ItemStatus>,
        end_time: Option<SystemTime>,
    ) {
        let Some(item) = item else {
            error!("BUG: trying to finish an unspecified test item");
            return;
        };
        let end = end_time.unwrap_or_else(SystemTime::now);
        let description = self.compose_failure_description(item, status);
        self.client.finish_item(
            item,
            FinishItemRequest { end_time: end, status, description },
        );
    }

    /// Consumes the side-table entries of `item` and composes the failure
    /// description: `<description>\n---\n<error>` when both were captured,
    /// the error alone otherwise.
    fn compose_failure_description(
        &self,
        item: &ItemHandle,
        status: Option<ItemStatus>,
    ) -> Option<String> {
        let description = self.descriptions.lock().unwrap().remove(item);
        let error = self.errors.lock().unwrap().remove(item);
        if status != Some(ItemStatus::Failed) {
            return None;
        }
        let error = format!("Error:\n{}", self.format_error(&error?));
        match description.filter(|d| !d.trim().is_empty()) {
            Some(description) => {
                Some(format!("{description}{DESCRIPTION_SEPARATOR}{error}"))
            }
            None => Some(error),
        }
    }

    /// Applies the configured truncation to error text.
    fn format_error(&self, error: &str) -> String {
        if !self.config.truncate_errors {
            return error.to_owned();
        }
        let mut lines = error.lines();
        let kept = lines.by_ref().take(ERROR_LINE_LIMIT).collect::<Vec<_>>();
        if lines.next().is_none() {
            error.to_owned()
        } else {
            format!("{}\n...", kept.join("\n"))
        }
    }

    /// Parameters of a step: definition-match arguments followed by the
    /// multiline argument, if any.
    fn step_parameters(step: &PickleStep) -> Vec<Parameter> {
        let mut parameters = step
            .match_arguments
            .iter()
            .map(|arg| Parameter::new(&arg.parameter_type, &arg.value))
            .collect::<Vec<_>>();
        match &step.argument {
            Some(StepArgument::DocString { content }) => {
                parameters.push(Parameter::new("DocString", content));
            }
            Some(StepArgument::DataTable { cells }) => {
                parameters.push(Parameter::new(
                    "DataTable",
                    extract::format_data_table(cells),
                ));
            }
            None => {}
        }
        parameters
    }
}

impl std::fmt::Debug for ScenarioReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioReporter")
            .field("config", &self.config)
            .field("launch", &self.launch.get())
            .finish_non_exhaustive()
    }
}
