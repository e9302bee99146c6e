//! Change notification plumbing.
//!
//! Setters never call observers directly; doing so while the entity lock is
//! held would deadlock any observer that reads the entity back. Instead each
//! change is pushed onto a process-wide queue and delivered later, outside
//! any lock, when the embedding application calls [`process_pending`] from
//! its main loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, OnceLock};

use crate::app::App;
use crate::app_list::AppList;

/// Which property of an [`App`] changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppChange {
    State,
    Progress,
    Kind,
    Version,
    Quirk,
    AllowCancel,
    SizeInstalled,
    SizeDownload,
    SizeUserData,
    SizeCacheData,
}

/// Which property of an [`AppList`] changed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListChange {
    State,
    Progress,
    /// A watched member changed state; carries the member.
    AppStateChanged(App),
}

/// Handle returned by the connect methods, used to disconnect later.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectionId(u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_connection_id() -> ConnectionId {
    ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// Observer storage shared by apps and lists.
pub(crate) struct Registry<F: ?Sized> {
    entries: Vec<(ConnectionId, Arc<F>)>,
}

impl<F: ?Sized> Default for Registry<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Registry<F> {
    pub fn connect(&mut self, callback: Arc<F>) -> ConnectionId {
        let id = next_connection_id();
        self.entries.push((id, callback));
        id
    }

    pub fn disconnect(&mut self, id: ConnectionId) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    /// Clone the callbacks so they can be invoked without holding the
    /// registry lock.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.entries
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    }
}

pub(crate) enum Event {
    App(App, AppChange),
    List(AppList, ListChange),
}

struct EventQueue {
    tx: Mutex<Sender<Event>>,
    rx: Mutex<Receiver<Event>>,
    // serializes whole drain passes so deliveries behave single-threaded
    delivering: Mutex<()>,
}

fn queue() -> &'static EventQueue {
    static QUEUE: OnceLock<EventQueue> = OnceLock::new();
    QUEUE.get_or_init(|| {
        let (tx, rx) = mpsc::channel();
        EventQueue {
            tx: Mutex::new(tx),
            rx: Mutex::new(rx),
            delivering: Mutex::new(()),
        }
    })
}

pub(crate) fn queue_event(event: Event) {
    // send only fails if the receiver is gone, which never happens for a
    // process-wide queue
    let _ = queue().tx.lock().unwrap().send(event);
}

/// Deliver all queued change notifications.
///
/// Call this from the main loop, never from inside an observer. Events
/// queued by observers during delivery are delivered in the same call.
pub fn process_pending() {
    let _delivering = queue().delivering.lock().unwrap();
    loop {
        // take one event at a time so observer-queued events are seen too
        let event = match queue().rx.lock().unwrap().try_recv() {
            Ok(event) => event,
            Err(_) => break,
        };
        match event {
            Event::App(app, change) => app.emit(change),
            Event::List(list, change) => list.emit(change),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_ids_are_unique() {
        let a = next_connection_id();
        let b = next_connection_id();
        assert_ne!(a, b);
    }

    #[test]
    fn registry_disconnect_removes_entry() {
        let mut registry: Registry<dyn Fn() + Send + Sync> = Registry::default();
        let id = registry.connect(Arc::new(|| {}));
        assert_eq!(registry.snapshot().len(), 1);
        registry.disconnect(id);
        assert!(registry.snapshot().is_empty());
    }
}
