/// Realtime project rooms
///
/// Every project has a logical room. Sockets join rooms by project ID and
/// receive a message whenever a task in that project changes. Delivery is
/// fire-and-forget: an event goes at most once to each session connected
/// at commit time, there is no replay for late joiners, and the session
/// that caused the change hears its own echo like everyone else.
///
/// Joining is not permission checked. Rooms only ever carry task payloads
/// the member-facing REST surface already exposes, so the hub stays a
/// plain fan-out.
///
/// # Wire format
///
/// Outbound messages are JSON with an `event` discriminator:
///
/// ```text
/// { "event": "task-added",          "task": { ... } }
/// { "event": "task-edited",         "task": { ... } }
/// { "event": "task-deleted",        "task": { ... } }
/// { "event": "task-status-changed", "task": { ... } }
/// ```
///
/// Inbound, a session only ever sends a join request:
///
/// ```text
/// { "event": "join", "project": "<project-uuid>" }
/// ```
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::models::task::TaskView;

/// Buffered events per room before slow receivers start lagging
const DEFAULT_ROOM_CAPACITY: usize = 256;

/// A task change fanned out to one project's room
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RoomEvent {
    TaskAdded { task: TaskView },
    TaskEdited { task: TaskView },
    TaskDeleted { task: TaskView },
    TaskStatusChanged { task: TaskView },
}

impl RoomEvent {
    /// The room this event belongs to
    pub fn project_id(&self) -> Uuid {
        match self {
            RoomEvent::TaskAdded { task }
            | RoomEvent::TaskEdited { task }
            | RoomEvent::TaskDeleted { task }
            | RoomEvent::TaskStatusChanged { task } => task.project_id,
        }
    }

    /// The wire name of the event, for logging
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::TaskAdded { .. } => "task-added",
            RoomEvent::TaskEdited { .. } => "task-edited",
            RoomEvent::TaskDeleted { .. } => "task-deleted",
            RoomEvent::TaskStatusChanged { .. } => "task-status-changed",
        }
    }
}

/// A message sent by a connected session
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Subscribe the session to a project's room
    Join { project: Uuid },
}

/// In-process fan-out of [`RoomEvent`]s, keyed by project
///
/// Rooms are created lazily on first join and dropped again once an emit
/// finds no listeners. Emitting never blocks and never fails the caller;
/// a room with no sessions simply swallows the event.
pub struct RoomHub {
    rooms: RwLock<HashMap<Uuid, broadcast::Sender<RoomEvent>>>,
    capacity: usize,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ROOM_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribes to a project's room, creating the room if needed
    ///
    /// The receiver sees only events emitted after this call.
    pub async fn join(&self, project_id: Uuid) -> broadcast::Receiver<RoomEvent> {
        let mut rooms = self.rooms.write().await;

        rooms
            .entry(project_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Delivers an event to every session in its project's room
    ///
    /// # Returns
    ///
    /// The number of sessions the event was handed to. Zero means the
    /// room was empty or never joined.
    pub async fn emit(&self, event: RoomEvent) -> usize {
        let project_id = event.project_id();

        let delivered = {
            let rooms = self.rooms.read().await;

            match rooms.get(&project_id) {
                Some(sender) => sender.send(event).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            self.drop_if_empty(project_id).await;
        }

        delivered
    }

    /// Number of live rooms
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Number of sessions currently joined to a project's room
    pub async fn room_sessions(&self, project_id: Uuid) -> usize {
        let rooms = self.rooms.read().await;

        rooms
            .get(&project_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Removes a room that has lost all of its receivers
    async fn drop_if_empty(&self, project_id: Uuid) {
        let mut rooms = self.rooms.write().await;

        if let Some(sender) = rooms.get(&project_id) {
            if sender.receiver_count() == 0 {
                rooms.remove(&project_id);
                debug!(project_id = %project_id, "Dropped empty project room");
            }
        }
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;
    use chrono::Utc;

    fn task_in(project_id: Uuid) -> TaskView {
        TaskView {
            id: Uuid::new_v4(),
            project_id,
            name: "Write copy".to_string(),
            description: "".to_string(),
            priority: TaskPriority::Low,
            delivery_date: Utc::now(),
            status: false,
            completed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_join_then_emit_delivers() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        let mut rx = hub.join(project).await;

        let delivered = hub
            .emit(RoomEvent::TaskAdded {
                task: task_in(project),
            })
            .await;
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "task-added");
        assert_eq!(event.project_id(), project);
    }

    #[tokio::test]
    async fn test_emit_without_listeners_is_swallowed() {
        let hub = RoomHub::new();

        let delivered = hub
            .emit(RoomEvent::TaskEdited {
                task: task_in(Uuid::new_v4()),
            })
            .await;

        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_every_session_in_the_room_hears_the_event() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        let mut first = hub.join(project).await;
        let mut second = hub.join(project).await;

        let delivered = hub
            .emit(RoomEvent::TaskDeleted {
                task: task_in(project),
            })
            .await;
        assert_eq!(delivered, 2);

        assert_eq!(first.recv().await.unwrap().name(), "task-deleted");
        assert_eq!(second.recv().await.unwrap().name(), "task-deleted");
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let hub = RoomHub::new();
        let this_project = Uuid::new_v4();
        let other_project = Uuid::new_v4();

        let mut rx = hub.join(other_project).await;

        hub.emit(RoomEvent::TaskAdded {
            task: task_in(this_project),
        })
        .await;

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_no_replay_for_late_joiners() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        // Keep the room alive while the event goes past
        let _early = hub.join(project).await;
        hub.emit(RoomEvent::TaskAdded {
            task: task_in(project),
        })
        .await;

        let mut late = hub.join(project).await;
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_room_sessions_tracks_joins_and_drops() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        assert_eq!(hub.room_sessions(project).await, 0);

        let first = hub.join(project).await;
        let second = hub.join(project).await;
        assert_eq!(hub.room_sessions(project).await, 2);

        drop(first);
        drop(second);
        assert_eq!(hub.room_sessions(project).await, 0);
    }

    #[tokio::test]
    async fn test_abandoned_rooms_are_dropped() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        let rx = hub.join(project).await;
        assert_eq!(hub.room_count().await, 1);
        drop(rx);

        hub.emit(RoomEvent::TaskStatusChanged {
            task: task_in(project),
        })
        .await;

        assert_eq!(hub.room_count().await, 0);
    }

    #[test]
    fn test_outbound_wire_format() {
        let project = Uuid::new_v4();
        let task = task_in(project);
        let task_id = task.id;

        let json = serde_json::to_value(RoomEvent::TaskStatusChanged { task }).unwrap();

        assert_eq!(json["event"], "task-status-changed");
        assert_eq!(json["task"]["id"], task_id.to_string());
        assert_eq!(json["task"]["project"], project.to_string());
    }

    #[test]
    fn test_inbound_join_parses() {
        let project = Uuid::new_v4();
        let raw = format!(r#"{{"event":"join","project":"{}"}}"#, project);

        let msg: ClientMessage = serde_json::from_str(&raw).unwrap();
        let ClientMessage::Join { project: joined } = msg;
        assert_eq!(joined, project);
    }

    #[test]
    fn test_unknown_inbound_events_do_not_parse() {
        let raw = r#"{"event":"task-added","task":{}}"#;

        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }
}
