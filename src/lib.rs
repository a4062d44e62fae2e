// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Adapter translating Cucumber runner events into a remote reporting
//! service's launch and test-item hierarchy.
//!
//! Feed every runner event into a [`ScenarioReporter`] and it maintains the
//! remote tree: one launch per run, a feature item per `.feature` file, an
//! optional rule item per `Rule`, a scenario item per executed test case,
//! and nested step and hook items below it. Start and finish calls go
//! through the [`Reporter`] trait, whose implementations return deferred
//! [`ItemHandle`]s so event handling never waits on the wire.
//!
//! [`ItemHandle`]: client::ItemHandle
//! [`Reporter`]: client::Reporter

pub mod attachment;
pub mod client;
pub mod config;
pub mod event;
pub mod extract;
pub mod reporter;
pub mod retry;
pub mod source;
pub mod status;
pub mod tree;

pub use self::{
    client::{
        Attachment, Attribute, FinishItemRequest, HandleResolver, ItemHandle,
        ItemType, LaunchMode, LogEntry, LogLevel, Parameter, Reporter,
        StartItemRequest, StartLaunchRequest,
    },
    config::Config,
    event::{Event, RunnerEvent},
    reporter::ScenarioReporter,
    retry::RetryRegistry,
    source::{FsLoader, SourceLoader},
    status::ItemStatus,
    tree::ItemTree,
};
