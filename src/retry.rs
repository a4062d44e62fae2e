// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bridge between a runner-side retry listener and the reporter.
//!
//! Runners that re-execute failed scenarios don't mark the repeated test
//! cases in any way; an external listener records which `uri:line` entries
//! were retried, and the reporter consults the registry when starting a
//! scenario.

use std::{collections::HashMap, sync::Mutex};

/// Concurrent registry of retried test cases, keyed by `uri:line`.
#[derive(Debug, Default)]
pub struct RetryRegistry {
    entries: Mutex<HashMap<String, bool>>,
}

impl RetryRegistry {
    /// Creates an empty [`RetryRegistry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whether the test case identified by `unique_id` was retried.
    pub fn record(&self, unique_id: impl Into<String>, was_retried: bool) {
        self.entries.lock().unwrap().insert(unique_id.into(), was_retried);
    }

    /// Whether the test case identified by `unique_id` is a retry.
    #[must_use]
    pub fn is_retry(&self, unique_id: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .get(unique_id)
            .copied()
            .unwrap_or_default()
    }

    /// Clears all recorded entries, to be called when the run finishes.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
