// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Promise-like handles for remote test items.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicU64, Ordering},
};

use futures::{FutureExt as _, channel::oneshot, future::Shared};

/// Process-unique identity counter for [`ItemHandle`]s.
static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, eventually-resolved identifier of a remote test item.
///
/// A handle is issued synchronously by the reporting client while the actual
/// server-assigned identifier arrives later. Handles are cheap to clone and
/// compare by local identity, so two clones of one handle are always equal
/// regardless of resolution state. None of the reporter's code paths ever
/// await a handle.
#[derive(Clone)]
pub struct ItemHandle {
    /// Local identity, assigned at creation.
    local: u64,

    /// Server-assigned identifier, delivered asynchronously.
    remote: Shared<oneshot::Receiver<String>>,
}

impl ItemHandle {
    /// Creates an unresolved [`ItemHandle`] along with the [`HandleResolver`]
    /// fulfilling it.
    #[must_use]
    pub fn deferred() -> (Self, HandleResolver) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            local: NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed),
            remote: rx.shared(),
        };
        (handle.clone(), HandleResolver { handle, tx })
    }

    /// Creates an already resolved [`ItemHandle`].
    #[must_use]
    pub fn resolved(id: impl Into<String>) -> Self {
        let (handle, resolver) = Self::deferred();
        resolver.resolve(id);
        handle
    }

    /// Returns the server-assigned identifier, if it has been delivered
    /// already. Never blocks.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        // A sent-but-unpolled oneshot isn't visible to `Shared::peek`, so
        // poll a clone once instead of inspecting the shared state.
        self.remote.clone().now_or_never().and_then(Result::ok)
    }

    /// Resolves to the server-assigned identifier, or [`None`] if the client
    /// dropped the resolution side.
    pub async fn id(&self) -> Option<String> {
        self.remote.clone().await.ok()
    }
}

impl fmt::Debug for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHandle")
            .field("local", &self.local)
            .field("remote", &self.peek())
            .finish()
    }
}

impl PartialEq for ItemHandle {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local
    }
}

impl Eq for ItemHandle {}

impl Hash for ItemHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.local.hash(state);
    }
}

/// Fulfilment side of a deferred [`ItemHandle`].
///
/// Held by the reporting client until the server answers with the real item
/// identifier.
#[derive(Debug)]
pub struct HandleResolver {
    handle: ItemHandle,
    tx: oneshot::Sender<String>,
}

impl HandleResolver {
    /// The handle this resolver fulfils.
    #[must_use]
    pub const fn handle(&self) -> &ItemHandle {
        &self.handle
    }

    /// Delivers the server-assigned identifier to all clones of the handle.
    pub fn resolve(self, id: impl Into<String>) {
        // Receiver side may be gone already, which is fine.
        drop(self.tx.send(id.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_stay_equal_after_resolution() {
        let (handle, resolver) = ItemHandle::deferred();
        let clone = handle.clone();
        assert_eq!(handle, clone);
        assert_eq!(handle.peek(), None);

        resolver.resolve("item-1");
        assert_eq!(clone.peek().as_deref(), Some("item-1"));
        assert_eq!(handle, clone);
    }

    #[test]
    fn distinct_handles_are_never_equal() {
        let a = ItemHandle::resolved("same");
        let b = ItemHandle::resolved("same");
        assert_ne!(a, b);
    }

    #[test]
    fn resolved_handle_peeks_immediately() {
        assert_eq!(ItemHandle::resolved("x").peek().as_deref(), Some("x"));
    }

    #[test]
    fn awaiting_yields_the_remote_id() {
        let (handle, resolver) = ItemHandle::deferred();
        resolver.resolve("item-9");
        let id = futures::executor::block_on(handle.id());
        assert_eq!(id.as_deref(), Some("item-9"));
    }
}
