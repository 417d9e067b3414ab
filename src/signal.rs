//! Fan-out notifications for the phases of a layer turn.
//!
//! Collaborators such as camera controls subscribe here to suspend
//! themselves while the pointer is turning a layer.

use std::panic::{self, AssertUnwindSafe};

/// Phase of a turn gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionEvent {
    /// A layer was grabbed.
    RotateStart,
    /// The grabbed layer moved with the pointer.
    Rotate,
    /// The pointer released the layer; it is now snapping into place.
    RotateEnd,
}

/// Returned by [`InteractionSignal::subscribe`] to allow unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(InteractionEvent)>;

/// Synchronous publish/subscribe channel for [`InteractionEvent`]s.
#[derive(Default)]
pub struct InteractionSignal {
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: u64,
}

impl std::fmt::Debug for InteractionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionSignal")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl InteractionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(InteractionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Invokes every subscriber in registration order.
    ///
    /// A subscriber that panics is logged and skipped; the others still run.
    pub fn emit(&mut self, event: InteractionEvent) {
        for (id, callback) in &mut self.subscribers {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(event)));
            if result.is_err() {
                log::error!("interaction subscriber {id:?} panicked handling {event:?}");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
