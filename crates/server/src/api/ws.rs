//! WebSocket support for live queue updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use fileshift_core::{ExportReport, QueueEvent};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Event emitted by a conversion run.
    Queue { event: QueueEvent },
    /// Files were accepted into the queue.
    FilesAdded { count: usize },
    /// A file was removed from the queue.
    FileRemoved { file_id: String },
    /// The queue was cleared.
    QueueCleared,
    /// An export of all artifacts finished.
    ExportFinished { exported: usize, failed: usize },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    /// Label used for the sent-messages metric.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Queue { .. } => "queue",
            Self::FilesAdded { .. } => "files_added",
            Self::FileRemoved { .. } => "file_removed",
            Self::QueueCleared => "queue_cleared",
            Self::ExportFinished { .. } => "export_finished",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // No receivers just means no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn queue_event(&self, event: QueueEvent) {
        self.broadcast(WsMessage::Queue { event });
    }

    pub fn files_added(&self, count: usize) {
        self.broadcast(WsMessage::FilesAdded { count });
    }

    pub fn file_removed(&self, file_id: &str) {
        self.broadcast(WsMessage::FileRemoved {
            file_id: file_id.to_string(),
        });
    }

    pub fn queue_cleared(&self) {
        self.broadcast(WsMessage::QueueCleared);
    }

    /// Broadcast the totals of a finished export.
    pub fn export_finished(&self, report: &ExportReport) {
        self.broadcast(WsMessage::ExportFinished {
            exported: report.exported.len(),
            failed: report.failed.len(),
        });
    }

    pub fn heartbeat(&self) {
        self.broadcast(WsMessage::Heartbeat {
            timestamp: chrono::Utc::now().timestamp(),
        });
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast messages
    let mut rx = state.ws_broadcaster().subscribe();

    // Track connection metrics
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Spawn task to forward broadcast messages to this client
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                // Forward broadcast messages to client
                result = rx.recv() => {
                    match result {
                        Ok(msg) => {
                            // Track message by type
                            WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

                            match serde_json::to_string(&msg) {
                                Ok(json) => {
                                    if sender.send(Message::Text(json.into())).await.is_err() {
                                        debug!("WebSocket send failed, client disconnected");
                                        break;
                                    }
                                }
                                Err(e) => {
                                    error!("Failed to serialize WsMessage: {}", e);
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket client lagged, skipped {} messages", n);
                            WS_LAG_EVENTS.inc();
                            // Continue receiving - the client will catch up
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Broadcast channel closed");
                            break;
                        }
                    }
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Ping(data)) => {
                // Pong is handled automatically by axum
                debug!("Received ping: {:?}", data);
            }
            Ok(Message::Text(text)) => {
                // We don't expect any client messages, but log them
                debug!("Received text message: {}", text);
            }
            Ok(_) => {
                // Ignore other message types
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Clean up
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_broadcasts() {
        let broadcaster = WsBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();

        broadcaster.files_added(3);
        broadcaster.file_removed("abc");

        assert!(matches!(rx.recv().await.unwrap(), WsMessage::FilesAdded { count: 3 }));
        match rx.recv().await.unwrap() {
            WsMessage::FileRemoved { file_id } => assert_eq!(file_id, "abc"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ignored() {
        WsBroadcaster::default().queue_cleared();
    }

    #[test]
    fn test_queue_event_serialization_nests_event() {
        let msg = WsMessage::Queue {
            event: QueueEvent::RunFinished {
                run_id: 4,
                converted: 2,
                failed: 1,
            },
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "queue");
        assert_eq!(json["event"]["type"], "run_finished");
        assert_eq!(json["event"]["converted"], 2);
    }

    #[test]
    fn test_unit_variant_serialization() {
        let json = serde_json::to_value(WsMessage::QueueCleared).unwrap();
        assert_eq!(json, serde_json::json!({"type": "queue_cleared"}));
        assert_eq!(WsMessage::QueueCleared.kind(), "queue_cleared");
    }
}
