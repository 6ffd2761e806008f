// crates/folio-core/src/interaction.rs
//
// Document-level user-interaction listeners.
//
// The autoplay policy and the music player's activity tracker both need to
// hear about "the user did something" without owning the input source.
// `InteractionBus` is the shared document; `InteractionListener` is one
// registration. Registrations are one-shot groups: the first matching
// dispatch delivers the event and removes the whole group, whichever kind
// fired. Dropping a listener removes its registration, so re-arming can never
// stack a second group on top of a stale one.

use std::sync::{Arc, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    Click,
    TouchStart,
    KeyDown,
    PointerMove,
    Scroll,
}

/// Gestures that browsers accept as unlocking audible playback.
pub const UNLOCK_GESTURES: [InteractionKind; 3] = [
    InteractionKind::Click,
    InteractionKind::TouchStart,
    InteractionKind::KeyDown,
];

/// Everything that counts as the user still being around.
pub const ACTIVITY: [InteractionKind; 5] = [
    InteractionKind::Click,
    InteractionKind::TouchStart,
    InteractionKind::KeyDown,
    InteractionKind::PointerMove,
    InteractionKind::Scroll,
];

struct Registration {
    id:    u64,
    kinds: Vec<InteractionKind>,
    tx:    Sender<InteractionKind>,
}

#[derive(Default)]
struct BusInner {
    next_id:       u64,
    registrations: Vec<Registration>,
}

/// Shared handle to the document's listener table. Clones share the table.
#[derive(Clone, Default)]
pub struct InteractionBus {
    inner: Arc<Mutex<BusInner>>,
}

impl std::fmt::Debug for InteractionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl InteractionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-shot group over `kinds`.
    pub fn listen(&self, kinds: &[InteractionKind]) -> InteractionListener {
        let (tx, rx) = unbounded();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.registrations.push(Registration { id, kinds: kinds.to_vec(), tx });
        InteractionListener { id, bus: Arc::downgrade(&self.inner), rx }
    }

    /// Deliver `kind` to every group listening for it and unregister those
    /// groups. Returns how many groups received it.
    pub fn dispatch(&self, kind: InteractionKind) -> usize {
        let mut inner = self.inner.lock();
        let mut delivered = 0;
        inner.registrations.retain(|reg| {
            if !reg.kinds.contains(&kind) {
                return true;
            }
            // A dropped receiver means the listener is mid-drop; either way
            // the group is done.
            if reg.tx.send(kind).is_ok() {
                delivered += 1;
            }
            false
        });
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().registrations.len()
    }
}

/// One registered listener group. Unregisters itself on drop.
pub struct InteractionListener {
    id:  u64,
    bus: Weak<Mutex<BusInner>>,
    rx:  Receiver<InteractionKind>,
}

impl std::fmt::Debug for InteractionListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionListener").field("id", &self.id).finish()
    }
}

impl InteractionListener {
    /// The interaction that fired this group, if it has fired.
    pub fn try_fired(&self) -> Option<InteractionKind> {
        self.rx.try_recv().ok()
    }
}

impl Drop for InteractionListener {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            let id = self.id;
            inner.lock().registrations.retain(|r| r.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_fires_group_once_and_unregisters() {
        let bus = InteractionBus::new();
        let listener = bus.listen(&UNLOCK_GESTURES);
        assert_eq!(bus.listener_count(), 1);

        assert_eq!(bus.dispatch(InteractionKind::KeyDown), 1);
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(listener.try_fired(), Some(InteractionKind::KeyDown));

        // Second gesture reaches nobody: the group was one-shot.
        assert_eq!(bus.dispatch(InteractionKind::Click), 0);
        assert_eq!(listener.try_fired(), None);
    }

    #[test]
    fn unrelated_kinds_do_not_fire() {
        let bus = InteractionBus::new();
        let listener = bus.listen(&UNLOCK_GESTURES);
        assert_eq!(bus.dispatch(InteractionKind::PointerMove), 0);
        assert_eq!(bus.listener_count(), 1);
        assert_eq!(listener.try_fired(), None);
    }

    #[test]
    fn dropping_listener_unregisters() {
        let bus = InteractionBus::new();
        {
            let _a = bus.listen(&UNLOCK_GESTURES);
            let _b = bus.listen(&ACTIVITY);
            assert_eq!(bus.listener_count(), 2);
        }
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn listener_outliving_bus_drops_cleanly() {
        let listener = {
            let bus = InteractionBus::new();
            bus.listen(&UNLOCK_GESTURES)
        };
        drop(listener);
    }
}
