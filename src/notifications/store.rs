//! Notification store
//!
//! The store is the single authoritative collection of tracked notifications.
//! State only changes through [`Store::dispatch`], which applies exactly one
//! [`Action`] and hands back the resulting [`Snapshot`].
//!
//! Invariants held after every dispatch:
//! - the snapshot never holds more than `capacity` notifications
//! - ids in a snapshot are unique
//! - insertion order is preserved (oldest first)
//!
//! Actions naming an id the store no longer tracks are no-ops, never errors.

use std::num::NonZeroUsize;
use std::ops::Deref;
use std::sync::Arc;

use crate::notifications::error::NotificationError;
use crate::notifications::id::NotificationId;
use crate::notifications::notification::{Notification, NotificationPatch, NotificationState};

/// Transitions the store understands
#[derive(Debug, Clone)]
pub enum Action {
    /// Append at the tail, evicting from the head when over capacity
    Add(Notification),
    /// Merge content fields into the notification with this id
    Update(NotificationId, NotificationPatch),
    /// Start the exit grace window (`Pending`/`Visible` -> `Dismissing`)
    Dismiss(NotificationId),
    /// Drop the notification entirely
    Remove(NotificationId),
    /// Drop every notification
    RemoveAll,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add(_) => "ADD",
            Action::Update(..) => "UPDATE",
            Action::Dismiss(_) => "DISMISS",
            Action::Remove(_) => "REMOVE",
            Action::RemoveAll => "REMOVE_ALL",
        }
    }
}

/// Immutable, ordered view of the store at one instant
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<[Notification]>);

impl Default for Snapshot {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl Snapshot {
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.0.iter().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<NotificationId> {
        self.0.iter().map(Notification::id).collect()
    }

    /// True when both handles point at the same committed state
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Snapshot {
    type Target = [Notification];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.0[..] == other.0[..]
    }
}

impl serde::Serialize for Snapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Outcome of a single dispatch
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub snapshot: Snapshot,
    /// Notifications that left the store in this dispatch, in state `Removed`
    pub retired: Vec<Notification>,
    pub changed: bool,
}

#[derive(Debug)]
pub struct Store {
    capacity: NonZeroUsize,
    items: Vec<Notification>,
    snapshot: Snapshot,
}

impl Store {
    pub fn new(capacity: usize) -> Result<Self, NotificationError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(NotificationError::InvalidCapacity {
            capacity,
        })?;
        Ok(Self {
            capacity,
            items: Vec::new(),
            snapshot: Snapshot::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.position(id).map(|i| &self.items[i])
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// Apply one action atomically
    pub fn dispatch(&mut self, action: Action) -> Dispatch {
        log::trace!("Store dispatch {}", action.name());
        let mut retired = Vec::new();

        let changed = match action {
            Action::Add(notification) => {
                if let Some(pos) = self.position(notification.id()) {
                    // Replacing keeps ids unique; the old entry is retired
                    log::warn!(
                        "ADD for already tracked notification {}; replacing it",
                        notification.id()
                    );
                    retired.push(self.items.remove(pos));
                }
                self.items.push(notification);
                let overflow = self.items.len().saturating_sub(self.capacity.get());
                if overflow > 0 {
                    for evicted in self.items.drain(..overflow) {
                        log::debug!(
                            "Evicted notification {} (capacity {})",
                            evicted.id(),
                            self.capacity
                        );
                        retired.push(evicted);
                    }
                }
                true
            }
            Action::Update(id, patch) => match self.position(id) {
                Some(pos) if !patch.is_empty() => {
                    self.items[pos].apply(&patch);
                    true
                }
                _ => false,
            },
            Action::Dismiss(id) => match self.position(id) {
                Some(pos) => self.items[pos].advance(NotificationState::Dismissing),
                None => false,
            },
            Action::Remove(id) => match self.position(id) {
                Some(pos) => {
                    retired.push(self.items.remove(pos));
                    true
                }
                None => false,
            },
            Action::RemoveAll => {
                retired.append(&mut self.items);
                !retired.is_empty()
            }
        };

        for notification in &mut retired {
            notification.advance(NotificationState::Removed);
        }

        if changed {
            self.snapshot = Snapshot(self.items.iter().cloned().collect());
        }

        Dispatch {
            snapshot: self.snapshot.clone(),
            retired,
            changed,
        }
    }

    fn position(&self, id: NotificationId) -> Option<usize> {
        self.items.iter().position(|n| n.id() == id)
    }
}
