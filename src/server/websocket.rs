use super::DashboardHandle;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use futures::{ SinkExt, Sink, StreamExt };
use log::{ info, warn, error, debug };
use std::net::SocketAddr;
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio_stream::wrappers::WatchStream;
use tokio_tungstenite::{ tungstenite::protocol::Message, WebSocketStream };
use tokio_tungstenite::tungstenite::Error as WsError;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

async fn send_message<T>(tx: &mut T, peer: SocketAddr, message: &ServerMessage) -> bool
    where T: Sink<Message, Error = WsError> + Unpin
{
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to encode message for {}: {}", peer, e);
            return true;
        }
    };
    match tx.send(Message::Text(json)).await {
        Ok(()) => true,
        Err(e) => {
            error!("Error sending message to {}: {}", peer, e);
            false
        }
    }
}

/// Applies one client command. Returns an error message for the client
/// when the command could not be applied.
pub async fn apply_client_message(handle: &DashboardHandle, message: ClientMessage) -> Option<String> {
    match message {
        ClientMessage::Refresh => {
            handle.controller.load().await;
            None
        }
        ClientMessage::Remove { query_id } => {
            if handle.begin_removal(&query_id).await {
                None
            } else {
                Some(format!("Bookmark {} is not displayed", query_id))
            }
        }
        ClientMessage::Confirm => answer(handle, true).await,
        ClientMessage::Cancel => answer(handle, false).await,
    }
}

async fn answer(handle: &DashboardHandle, accept: bool) -> Option<String> {
    if handle.answer(accept).await {
        None
    } else {
        Some("No bookmark is awaiting removal".to_string())
    }
}

/// Streams every dashboard snapshot to the peer and applies its commands.
pub async fn handle_connection<S>(peer: SocketAddr, websocket: WebSocketStream<S>, handle: DashboardHandle)
    where S: AsyncRead + AsyncWrite + Unpin
{
    info!("New WebSocket connection: {}", peer);
    let (mut tx, mut rx) = websocket.split();
    let mut snapshots = WatchStream::new(handle.controller.subscribe());

    loop {
        tokio::select! {
            snapshot = snapshots.next() => {
                let Some(snapshot) = snapshot else {
                    break;
                };
                if !send_message(&mut tx, peer, &ServerMessage::Snapshot(snapshot)).await {
                    break;
                }
            }
            msg = rx.next() => {
                let message = match msg {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        match e {
                            | WsError::ConnectionClosed
                            | WsError::Protocol(_)
                            | WsError::Utf8 => {
                                info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                            }
                            WsError::Io(ref io_err) if
                                io_err.kind() == std::io::ErrorKind::ConnectionReset
                            => {
                                info!("WebSocket connection reset by peer {}", peer);
                            }
                            _ => {
                                error!("Error receiving message from {}: {}", peer, e);
                            }
                        }
                        break;
                    }
                    None => break,
                };

                if message.len() > MAX_MESSAGE_SIZE {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        MAX_MESSAGE_SIZE
                    );
                    let error_msg = ServerMessage::Error {
                        message: "Message too large".to_string(),
                    };
                    send_message(&mut tx, peer, &error_msg).await;
                    break;
                }

                match message {
                    Message::Text(text) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(command) => {
                                debug!("{} sent {:?}", peer, command);
                                apply_client_message(&handle, command).await
                            }
                            Err(e) => {
                                warn!("Failed to parse message from {}: {}", peer, e);
                                Some(format!("Failed to parse message: {}", e))
                            }
                        };
                        if let Some(message) = reply {
                            if !send_message(&mut tx, peer, &ServerMessage::Error { message }).await {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    Message::Ping(ping_data) => {
                        if tx.send(Message::Pong(ping_data)).await.is_err() {
                            error!("Failed to send pong to {}", peer);
                            break;
                        }
                    }
                    Message::Pong(_) => {}
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    Message::Frame(_) => {}
                }
            }
        }
    }
    info!("WebSocket connection closed for {}", peer);
}
