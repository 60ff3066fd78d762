use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};

use serde_json::{json, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use linkstash_core::events::{BookmarkEvent, BookmarkEventSink};

/// Wire names for the push channel events.
pub const BOOKMARK_CREATED: &str = "bookmark-created";
pub const BOOKMARK_DELETED: &str = "bookmark-deleted";

/// Serializable envelope delivered over the push channel.
#[derive(Clone, Debug)]
pub struct PushEvent {
    pub name: &'static str,
    pub payload: Value,
}

type Group = HashMap<Uuid, mpsc::UnboundedSender<PushEvent>>;

/// Registry of live push connections, partitioned into per-identity
/// broadcast groups, plus the fan-out over one group.
///
/// Mutations reach the hub through the [`BookmarkEventSink`] impl: the
/// service emits a domain event, the hub routes it to the owner identity's
/// group. Fan-out is synchronous into per-connection FIFO channels, so
/// events for one identity reach each member in emit order. Delivery is
/// best-effort per connection; a failed send is treated as a disconnect and
/// never affects other members or the caller.
#[derive(Clone, Default)]
pub struct EventHub {
    groups: Arc<RwLock<HashMap<String, Group>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new push connection.
    ///
    /// A present, non-empty `owner` joins that identity's broadcast group.
    /// An absent or empty identity joins no group: the subscription stays
    /// open but never receives events (degraded, non-fatal client state).
    pub fn subscribe(&self, owner: Option<&str>) -> Subscription {
        let connection_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let owner = owner
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);

        let idle_tx = match &owner {
            Some(key) => {
                self.groups
                    .write()
                    .unwrap()
                    .entry(key.clone())
                    .or_default()
                    .insert(connection_id, tx);
                None
            }
            // Keep the sender so the channel never closes; the connection
            // stays open and idle.
            None => Some(tx),
        };

        Subscription {
            connection_id,
            owner,
            hub: self.clone(),
            rx,
            _idle_tx: idle_tx,
        }
    }

    /// Delivers `event` to every connection currently in `owner`'s group.
    ///
    /// Membership is snapshotted at call time; a connection joining
    /// mid-broadcast may or may not see this event, but never a duplicate
    /// and never another group's events.
    pub fn broadcast(&self, owner: &str, event: PushEvent) {
        let members: Vec<(Uuid, mpsc::UnboundedSender<PushEvent>)> = {
            let groups = self.groups.read().unwrap();
            match groups.get(owner) {
                Some(group) => group.iter().map(|(cid, tx)| (*cid, tx.clone())).collect(),
                None => return,
            }
        };

        let mut dead = Vec::new();
        for (connection_id, tx) in members {
            if tx.send(event.clone()).is_err() {
                dead.push(connection_id);
            }
        }

        // A failed send means the receiver is gone; drop that connection
        // from the group without disturbing the others.
        if !dead.is_empty() {
            let mut groups = self.groups.write().unwrap();
            if let Some(group) = groups.get_mut(owner) {
                for connection_id in dead {
                    group.remove(&connection_id);
                }
                if group.is_empty() {
                    groups.remove(owner);
                }
            }
        }
    }

    /// Number of live connections registered under one identity.
    pub fn group_len(&self, owner: &str) -> usize {
        self.groups
            .read()
            .unwrap()
            .get(owner)
            .map_or(0, HashMap::len)
    }

    fn unsubscribe(&self, owner: &str, connection_id: Uuid) {
        let mut groups = self.groups.write().unwrap();
        if let Some(group) = groups.get_mut(owner) {
            group.remove(&connection_id);
            if group.is_empty() {
                groups.remove(owner);
            }
        }
    }
}

impl BookmarkEventSink for EventHub {
    fn emit(&self, event: BookmarkEvent) {
        match event {
            BookmarkEvent::BookmarkCreated { bookmark } => {
                let payload = match serde_json::to_value(&bookmark) {
                    Ok(value) => value,
                    Err(err) => {
                        tracing::error!("Failed to serialize bookmark {}: {}", bookmark.id, err);
                        return;
                    }
                };
                self.broadcast(
                    &bookmark.owner_identity,
                    PushEvent {
                        name: BOOKMARK_CREATED,
                        payload,
                    },
                );
            }
            BookmarkEvent::BookmarkDeleted {
                owner_identity,
                bookmark_id,
            } => {
                self.broadcast(
                    &owner_identity,
                    PushEvent {
                        name: BOOKMARK_DELETED,
                        payload: json!(bookmark_id),
                    },
                );
            }
        }
    }
}

/// One live push connection's end of the hub.
///
/// Dropping the subscription (SSE stream closed, client gone) removes the
/// connection from its broadcast group; there is no explicit unregister.
pub struct Subscription {
    connection_id: Uuid,
    owner: Option<String>,
    hub: EventHub,
    rx: mpsc::UnboundedReceiver<PushEvent>,
    _idle_tx: Option<mpsc::UnboundedSender<PushEvent>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<PushEvent> {
        self.rx.try_recv().ok()
    }

    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<PushEvent>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.take() {
            self.hub.unsubscribe(&owner, self.connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use linkstash_core::bookmarks::Bookmark;

    fn bookmark_for(owner: &str) -> Bookmark {
        Bookmark {
            id: Uuid::new_v4().to_string(),
            owner_identity: owner.to_string(),
            title: "Docs".to_string(),
            url: "http://x".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn created_event_reaches_only_the_owner_group() {
        let hub = EventHub::new();
        let mut sub_a = hub.subscribe(Some("a@x.com"));
        let mut sub_b = hub.subscribe(Some("b@x.com"));

        let bookmark = bookmark_for("a@x.com");
        hub.emit(BookmarkEvent::created(bookmark.clone()));

        let event = sub_a.try_recv().expect("a@x.com should receive the event");
        assert_eq!(event.name, BOOKMARK_CREATED);
        assert_eq!(event.payload["id"], json!(bookmark.id));
        assert_eq!(event.payload["ownerIdentity"], json!("a@x.com"));

        assert!(sub_b.try_recv().is_none());
    }

    #[test]
    fn events_arrive_in_emit_order() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe(Some("a@x.com"));

        hub.emit(BookmarkEvent::created(bookmark_for("a@x.com")));
        hub.emit(BookmarkEvent::deleted(
            "a@x.com".to_string(),
            "bm-1".to_string(),
        ));

        assert_eq!(sub.try_recv().unwrap().name, BOOKMARK_CREATED);
        let deleted = sub.try_recv().unwrap();
        assert_eq!(deleted.name, BOOKMARK_DELETED);
        assert_eq!(deleted.payload, json!("bm-1"));
    }

    #[test]
    fn missing_identity_joins_no_group() {
        let hub = EventHub::new();
        let mut anonymous = hub.subscribe(None);
        let mut blank = hub.subscribe(Some("  "));

        hub.emit(BookmarkEvent::created(bookmark_for("a@x.com")));

        assert!(anonymous.try_recv().is_none());
        assert!(blank.try_recv().is_none());
        assert_eq!(hub.group_len(""), 0);
    }

    #[test]
    fn drop_removes_the_connection_from_its_group() {
        let hub = EventHub::new();
        let sub = hub.subscribe(Some("a@x.com"));
        assert_eq!(hub.group_len("a@x.com"), 1);

        drop(sub);
        assert_eq!(hub.group_len("a@x.com"), 0);

        // Broadcasting into the now-empty group is a no-op, not an error.
        hub.emit(BookmarkEvent::created(bookmark_for("a@x.com")));
    }

    #[test]
    fn later_subscriber_sees_only_later_events() {
        let hub = EventHub::new();
        let mut early = hub.subscribe(Some("a@x.com"));

        hub.emit(BookmarkEvent::deleted(
            "a@x.com".to_string(),
            "bm-1".to_string(),
        ));

        let mut late = hub.subscribe(Some("a@x.com"));
        hub.emit(BookmarkEvent::deleted(
            "a@x.com".to_string(),
            "bm-2".to_string(),
        ));

        assert_eq!(early.try_recv().unwrap().payload, json!("bm-1"));
        assert_eq!(early.try_recv().unwrap().payload, json!("bm-2"));
        assert_eq!(late.try_recv().unwrap().payload, json!("bm-2"));
        assert!(late.try_recv().is_none());
    }
}
