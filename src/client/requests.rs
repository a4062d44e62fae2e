// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Request and log payloads consumed by the reporting client.

use std::time::SystemTime;

use derive_more::with_trait::Display;

use crate::status::ItemStatus;

use super::ItemHandle;

/// Type of a remote test item.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ItemType {
    /// Feature-level container.
    #[display("STORY")]
    Story,

    /// Rule-level container.
    #[display("SUITE")]
    Suite,

    /// Scenario, step, hook or hook-group item.
    #[display("STEP")]
    Step,
}

/// Mode the launch is reported in.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum LaunchMode {
    /// Regular launch.
    #[default]
    #[display("DEFAULT")]
    Default,

    /// Debug launch, hidden from common views.
    #[display("DEBUG")]
    Debug,
}

/// Attribute of a launch or a test item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    /// Attribute key; value-only attributes have none.
    pub key: Option<String>,

    /// Attribute value.
    pub value: String,

    /// Whether the attribute is system-generated rather than user-provided.
    pub system: bool,
}

impl Attribute {
    /// Creates a value-only attribute.
    #[must_use]
    pub fn value(value: impl Into<String>) -> Self {
        Self { key: None, value: value.into(), system: false }
    }

    /// Creates a key/value attribute.
    #[must_use]
    pub fn key_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: Some(key.into()), value: value.into(), system: false }
    }

    /// Creates a system key/value attribute.
    #[must_use]
    pub fn system(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: Some(key.into()), value: value.into(), system: true }
    }
}

/// Parameter of a test item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    /// Parameter name.
    pub key: String,

    /// Parameter value.
    pub value: String,
}

impl Parameter {
    /// Creates a new [`Parameter`].
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Request opening a launch.
#[derive(Clone, Debug)]
pub struct StartLaunchRequest {
    /// Launch name.
    pub name: String,

    /// Launch description.
    pub description: Option<String>,

    /// Launch start time.
    pub start_time: SystemTime,

    /// Launch mode.
    pub mode: LaunchMode,

    /// Launch attributes, configured and system ones merged.
    pub attributes: Vec<Attribute>,

    /// Whether this launch reruns a previous one.
    pub rerun: bool,

    /// Reference to the launch being rerun.
    pub rerun_of: Option<String>,
}

/// Request opening a test item.
#[derive(Clone, Debug)]
pub struct StartItemRequest {
    /// Item name.
    pub name: String,

    /// Item type.
    pub item_type: ItemType,

    /// Item start time.
    pub start_time: SystemTime,

    /// Item description.
    pub description: Option<String>,

    /// Reference locating the item in the source tree.
    pub code_ref: Option<String>,

    /// Stable test-case identifier.
    pub test_case_id: Option<String>,

    /// Item attributes.
    pub attributes: Vec<Attribute>,

    /// Item parameters.
    pub parameters: Vec<Parameter>,

    /// Whether the item participates in launch statistics. `false` for
    /// steps, hooks and hook groups.
    pub has_stats: bool,

    /// Whether the item retries an earlier attempt.
    pub retry: bool,

    /// Handle of the first attempt this item retries.
    pub retry_of: Option<ItemHandle>,
}

impl StartItemRequest {
    /// Creates a request with the given `name` and `item_type` starting at
    /// `start_time`, everything else left at contract defaults.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        item_type: ItemType,
        start_time: SystemTime,
    ) -> Self {
        Self {
            name: name.into(),
            item_type,
            start_time,
            description: None,
            code_ref: None,
            test_case_id: None,
            attributes: Vec::new(),
            parameters: Vec::new(),
            has_stats: true,
            retry: false,
            retry_of: None,
        }
    }

    /// Marks the item as excluded from launch statistics.
    #[must_use]
    pub fn without_stats(mut self) -> Self {
        self.has_stats = false;
        self
    }
}

/// Request finishing a test item.
#[derive(Clone, Debug)]
pub struct FinishItemRequest {
    /// Item end time.
    pub end_time: SystemTime,

    /// Item status; [`None`] lets the server derive it from children.
    pub status: Option<ItemStatus>,

    /// Replacement description, composed when the item failed.
    pub description: Option<String>,
}

/// Log severity level.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum LogLevel {
    /// Informational message.
    #[display("INFO")]
    Info,

    /// Warning message.
    #[display("WARN")]
    Warn,

    /// Error message.
    #[display("ERROR")]
    Error,
}

/// Binary payload attached to a log entry.
#[derive(Clone, Debug)]
pub struct Attachment {
    /// Attachment display name.
    pub name: String,

    /// Attachment MIME type, when one could be determined.
    pub media_type: Option<String>,

    /// Attachment bytes.
    pub data: Vec<u8>,
}

/// Log entry emitted against an item or the whole launch.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// Severity level.
    pub level: LogLevel,

    /// Message text.
    pub message: String,

    /// Time of the logged occurrence.
    pub time: SystemTime,

    /// Optional binary attachment.
    pub attachment: Option<Attachment>,
}

impl LogEntry {
    /// Creates a plain text entry with the given `level`.
    #[must_use]
    pub fn text(
        level: LogLevel,
        message: impl Into<String>,
        time: SystemTime,
    ) -> Self {
        Self { level, message: message.into(), time, attachment: None }
    }
}
