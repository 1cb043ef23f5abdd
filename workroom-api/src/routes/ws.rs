/// Realtime WebSocket endpoint
///
/// One socket per client session. The client sends join requests for the
/// projects it has open and receives every task event for those rooms
/// until it disconnects. The endpoint itself does no permission checks;
/// see [`workroom_shared::realtime`] for why that is safe.
///
/// A session can join any number of rooms. Joining a room the session is
/// already in resets that subscription.
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamMap;
use tracing::debug;
use uuid::Uuid;

use workroom_shared::realtime::{ClientMessage, RoomEvent};

use crate::app::AppState;

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs one session until the socket closes
///
/// Inbound frames are join requests; outbound frames are room events
/// forwarded from the hub. Both directions run in a single select loop
/// so joins take effect immediately.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriptions: StreamMap<Uuid, BroadcastStream<RoomEvent>> = StreamMap::new();

    debug!("Realtime session connected");

    loop {
        tokio::select! {
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Join { project }) => {
                                let rx = state.rooms.join(project).await;
                                subscriptions.insert(project, BroadcastStream::new(rx));

                                debug!(project_id = %project, "Session joined project room");
                            }
                            Err(e) => {
                                debug!(error = %e, "Ignoring unparseable client message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "Realtime session read error");
                        break;
                    }
                }
            }
            // An empty StreamMap reports end-of-stream rather than
            // pending, so only poll it once the session joined a room.
            outbound = subscriptions.next(), if !subscriptions.is_empty() => {
                match outbound {
                    Some((_, Ok(event))) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(e) => {
                                debug!(error = %e, "Failed to encode room event");
                                continue;
                            }
                        };

                        if sender.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some((project_id, Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                        debug!(
                            project_id = %project_id,
                            skipped,
                            "Session lagged behind its room, events dropped"
                        );
                    }
                    None => {}
                }
            }
        }
    }

    debug!("Realtime session closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use workroom_shared::models::task::{TaskPriority, TaskView};
    use workroom_shared::realtime::RoomHub;

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
    async fn test_stream_map_forwards_room_events() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        let mut subscriptions: StreamMap<Uuid, BroadcastStream<RoomEvent>> = StreamMap::new();
        subscriptions.insert(project, BroadcastStream::new(hub.join(project).await));

        hub.emit(RoomEvent::TaskAdded {
            task: task_in(project),
        })
        .await;

        let (key, event) = subscriptions.next().await.unwrap();
        assert_eq!(key, project);
        assert_eq!(event.unwrap().name(), "task-added");
    }

    #[tokio::test]
    async fn test_rejoining_resets_the_subscription() {
        let hub = RoomHub::new();
        let project = Uuid::new_v4();

        let mut subscriptions: StreamMap<Uuid, BroadcastStream<RoomEvent>> = StreamMap::new();
        subscriptions.insert(project, BroadcastStream::new(hub.join(project).await));
        subscriptions.insert(project, BroadcastStream::new(hub.join(project).await));

        assert_eq!(subscriptions.len(), 1);

        hub.emit(RoomEvent::TaskEdited {
            task: task_in(project),
        })
        .await;

        let (_, event) = subscriptions.next().await.unwrap();
        assert_eq!(event.unwrap().name(), "task-edited");
    }

    #[tokio::test]
    async fn test_lagged_session_sees_the_gap_then_catches_up() {
        let hub = RoomHub::with_capacity(1);
        let project = Uuid::new_v4();

        let mut subscriptions: StreamMap<Uuid, BroadcastStream<RoomEvent>> = StreamMap::new();
        subscriptions.insert(project, BroadcastStream::new(hub.join(project).await));

        // Two emits against capacity one pushes the first event out
        hub.emit(RoomEvent::TaskAdded {
            task: task_in(project),
        })
        .await;
        hub.emit(RoomEvent::TaskDeleted {
            task: task_in(project),
        })
        .await;

        let (_, first) = subscriptions.next().await.unwrap();
        assert!(matches!(first, Err(BroadcastStreamRecvError::Lagged(1))));

        let (_, second) = subscriptions.next().await.unwrap();
        assert_eq!(second.unwrap().name(), "task-deleted");
    }
}
