// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Contract of the remote reporting client.
//!
//! The client is an asynchronous item/log sink: every start operation returns
//! an [`ItemHandle`] immediately while the actual server round-trip happens
//! in the background. Implementations own transport, batching and
//! transport-level retries; the reporter never blocks on them.

pub mod handle;
pub mod requests;

use std::time::SystemTime;

pub use handle::{HandleResolver, ItemHandle};
pub use requests::{
    Attachment, Attribute, FinishItemRequest, ItemType, LaunchMode, LogEntry,
    LogLevel, Parameter, StartItemRequest, StartLaunchRequest,
};

/// Asynchronous sink for launches, test items and logs.
///
/// Object-safe so the reporter can hold it as a trait object; all operations
/// take `&self` and must be callable from multiple threads.
pub trait Reporter: Send + Sync {
    /// Opens a launch.
    fn start_launch(&self, request: StartLaunchRequest) -> ItemHandle;

    /// Finishes the launch at `end_time`.
    fn finish_launch(&self, end_time: SystemTime);

    /// Opens a root item directly under the launch.
    fn start_root_item(&self, request: StartItemRequest) -> ItemHandle;

    /// Opens an item under `parent`.
    fn start_item(
        &self,
        parent: &ItemHandle,
        request: StartItemRequest,
    ) -> ItemHandle;

    /// Allocates a placeholder handle for an item whose start request isn't
    /// known yet.
    fn create_virtual_item(&self) -> ItemHandle;

    /// Opens an item under `parent` reusing a previously allocated
    /// `placeholder` handle. The returned handle is the placeholder itself.
    fn start_virtual_item(
        &self,
        parent: &ItemHandle,
        placeholder: &ItemHandle,
        request: StartItemRequest,
    ) -> ItemHandle;

    /// Finishes the given item.
    fn finish_item(&self, item: &ItemHandle, request: FinishItemRequest);

    /// Emits a log entry against `item`, or against the launch when `item`
    /// is [`None`].
    fn emit_log(&self, item: Option<&ItemHandle>, entry: LogEntry);
}
