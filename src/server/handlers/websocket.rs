use axum::{
    extract::ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};

pub const WELCOME_MESSAGE: &str = "Welcome to the websocket server";

/// Body returned to plain HTTP requests on the WebSocket port
pub const CONNECTED_MESSAGE: &str = "I am connected";

/// Entry point for every request on the WebSocket port
pub async fn ws_entry(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    headers: HeaderMap,
) -> Response {
    match ws {
        Ok(ws) => {
            tracing::debug!(headers = ?headers, "WebSocket handshake");
            ws.on_upgrade(handle_welcome_ws)
        }
        Err(_) => CONNECTED_MESSAGE.into_response(),
    }
}

/// Greet once, then log whatever the client sends until it goes away
async fn handle_welcome_ws(socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();

    if sender
        .send(Message::Text(WELCOME_MESSAGE.into()))
        .await
        .is_err()
    {
        tracing::debug!("WebSocket client left before the welcome message");
        return;
    }

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                tracing::info!("received: {}", text.as_str());
            }
            Ok(Message::Binary(data)) => {
                tracing::info!("received: {}", String::from_utf8_lossy(&data));
            }
            Ok(Message::Close(_)) => break,
            // Pings are answered by the protocol layer
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("WebSocket error: {}", e);
                break;
            }
        }
    }

    tracing::debug!("WebSocket connection closed");
}
