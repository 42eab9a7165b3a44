use crate::{hub::Hub, RelayState};
use async_broadcast::RecvError;
use axum::{
	extract::{
		ws::{Message, WebSocket, WebSocketUpgrade},
		State,
	},
	response::IntoResponse,
};
use futures_util::{
	sink::SinkExt,
	stream::{SplitSink, StreamExt},
};
use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<RelayState>) -> impl IntoResponse {
	ws.max_message_size(state.settings.max_message_size)
		.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send_text(sink: &mut SplitSink<WebSocket, Message>, frame: &str) -> bool {
	match sink.send(Message::Text(frame.to_string())).await {
		Ok(()) => true,
		Err(e) => {
			debug!("client write failed: {e}");
			false
		}
	}
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
	let hub: Arc<Hub> = state.hub.clone();
	let (mut sink, mut stream) = socket.split();
	let membership = hub.join();
	let mut feed = membership.feed;
	info!(clients = hub.clients(), "client connected");

	let mut replayed = true;
	for frame in &membership.replay {
		if !send_text(&mut sink, frame).await {
			replayed = false;
			break;
		}
	}

	let period = state.settings.ping_interval;
	let mut ping = interval_at(Instant::now() + period, period);
	ping.set_missed_tick_behavior(MissedTickBehavior::Skip);
	let cancel = state.cancel.clone();

	while replayed {
		tokio::select! {
			() = cancel.cancelled() => {
				let _ = sink.send(Message::Close(None)).await;
				break;
			}
			message = stream.next() => match message {
				Some(Ok(Message::Text(text))) => hub.publish(&text),
				Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
					Ok(text) => hub.publish(text),
					Err(e) => warn!("dropping non-UTF-8 binary frame: {e}"),
				},
				Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
				Some(Ok(Message::Close(_))) | None => break,
				Some(Err(e)) => {
					debug!("client read failed: {e}");
					break;
				}
			},
			frame = feed.recv() => match frame {
				Ok(frame) => {
					if !send_text(&mut sink, &frame).await {
						break;
					}
				}
				Err(RecvError::Overflowed(skipped)) => warn!(skipped, "slow client skipped frames"),
				Err(RecvError::Closed) => break,
			},
			_ = ping.tick() => {
				if sink.send(Message::Ping(Vec::new())).await.is_err() {
					break;
				}
			}
		}
	}

	drop(feed);
	hub.leave();
	info!(clients = hub.clients(), "client disconnected");
}
