// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Mapping of runner statuses onto reporting statuses, and status
//! aggregation for grouped items.

use derive_more::with_trait::Display;
use tracing::error;

use crate::event::RunnerStatus;

/// Status a remote test item is finished with.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ItemStatus {
    /// Item passed.
    #[display("PASSED")]
    Passed,

    /// Item failed.
    #[display("FAILED")]
    Failed,

    /// Item was skipped or never resolved to a definition.
    #[display("SKIPPED")]
    Skipped,
}

/// Maps a runner outcome status onto an [`ItemStatus`].
///
/// The mapping is total: everything that isn't a pass or a failure collapses
/// into [`ItemStatus::Skipped`].
#[must_use]
pub fn map_status(status: RunnerStatus) -> ItemStatus {
    match status {
        RunnerStatus::Passed => ItemStatus::Passed,
        RunnerStatus::Failed => ItemStatus::Failed,
        RunnerStatus::Skipped
        | RunnerStatus::Pending
        | RunnerStatus::Ambiguous
        | RunnerStatus::Undefined
        | RunnerStatus::Unused => ItemStatus::Skipped,
        // Reachable only once `RunnerStatus` grows a variant.
        #[allow(unreachable_patterns)]
        other => {
            error!(
                "no direct status mapping for `{other}`, \
                 reporting item as SKIPPED",
            );
            ItemStatus::Skipped
        }
    }
}

/// Combines an aggregated status with a newly observed one, keeping the more
/// severe of the two.
///
/// Severity ordering is `FAILED > SKIPPED > PASSED`; an absent current status
/// is neutral.
#[must_use]
pub fn evaluate(
    current: Option<ItemStatus>,
    next: ItemStatus,
) -> Option<ItemStatus> {
    Some(match (current, next) {
        (Some(ItemStatus::Failed), _) | (_, ItemStatus::Failed) => {
            ItemStatus::Failed
        }
        (Some(ItemStatus::Skipped), _) | (_, ItemStatus::Skipped) => {
            ItemStatus::Skipped
        }
        _ => ItemStatus::Passed,
    })
}
