// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! In-memory projection of the remote item hierarchy.
//!
//! Step-definition code reporting through callbacks needs to address remote
//! items the reporter opened: the tree indexes feature handles by URI,
//! scenario handles by source line and step handles by step text. It holds
//! lookup references only; item ownership stays with the reporter contexts.

use std::{collections::HashMap, sync::Mutex};

use crate::client::ItemHandle;

/// Lookup tree mirroring the launch → feature → scenario → step hierarchy.
#[derive(Debug, Default)]
pub struct ItemTree {
    launch: Mutex<Option<ItemHandle>>,
    features: Mutex<HashMap<String, FeatureLeaf>>,
}

#[derive(Debug)]
struct FeatureLeaf {
    handle: ItemHandle,
    scenarios: HashMap<usize, ScenarioLeaf>,
}

#[derive(Debug)]
struct ScenarioLeaf {
    handle: ItemHandle,
    steps: HashMap<String, ItemHandle>,
}

impl ItemTree {
    /// Creates an empty [`ItemTree`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the launch handle.
    pub fn set_launch(&self, handle: ItemHandle) {
        *self.launch.lock().unwrap() = Some(handle);
    }

    /// Returns the launch handle, if the launch has started.
    #[must_use]
    pub fn launch(&self) -> Option<ItemHandle> {
        self.launch.lock().unwrap().clone()
    }

    /// Registers a feature handle under its URI.
    pub fn add_feature(&self, uri: impl Into<String>, handle: ItemHandle) {
        self.features.lock().unwrap().insert(
            uri.into(),
            FeatureLeaf { handle, scenarios: HashMap::new() },
        );
    }

    /// Drops a feature and all its children.
    pub fn remove_feature(&self, uri: &str) {
        self.features.lock().unwrap().remove(uri);
    }

    /// Registers a scenario handle under its feature URI and source line.
    pub fn add_scenario(&self, uri: &str, line: usize, handle: ItemHandle) {
        if let Some(feature) = self.features.lock().unwrap().get_mut(uri) {
            feature
                .scenarios
                .insert(line, ScenarioLeaf { handle, steps: HashMap::new() });
        }
    }

    /// Drops a scenario and its steps.
    pub fn remove_scenario(&self, uri: &str, line: usize) {
        if let Some(feature) = self.features.lock().unwrap().get_mut(uri) {
            feature.scenarios.remove(&line);
        }
    }

    /// Registers a step handle under its scenario and step text.
    pub fn add_step(
        &self,
        uri: &str,
        line: usize,
        text: impl Into<String>,
        handle: ItemHandle,
    ) {
        if let Some(scenario) = self
            .features
            .lock()
            .unwrap()
            .get_mut(uri)
            .and_then(|f| f.scenarios.get_mut(&line))
        {
            scenario.steps.insert(text.into(), handle);
        }
    }

    /// Looks up a feature handle by URI.
    #[must_use]
    pub fn feature(&self, uri: &str) -> Option<ItemHandle> {
        self.features.lock().unwrap().get(uri).map(|f| f.handle.clone())
    }

    /// Looks up a scenario handle by feature URI and source line.
    #[must_use]
    pub fn scenario(&self, uri: &str, line: usize) -> Option<ItemHandle> {
        self.features
            .lock()
            .unwrap()
            .get(uri)
            .and_then(|f| f.scenarios.get(&line))
            .map(|s| s.handle.clone())
    }

    /// Looks up a step handle by feature URI, scenario line and step text.
    #[must_use]
    pub fn step(
        &self,
        uri: &str,
        line: usize,
        text: &str,
    ) -> Option<ItemHandle> {
        self.features
            .lock()
            .unwrap()
            .get(uri)
            .and_then(|f| f.scenarios.get(&line))
            .and_then(|s| s.steps.get(text))
            .cloned()
    }
}
