pub mod config;
pub mod hub;
pub mod ws;

pub use config::{Config, RelaySettings};
pub use hub::{Frame, Hub, Membership};

use axum::{response::Html, routing::get, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const BANNER: &str = "Live Relay";

#[derive(Clone)]
pub struct RelayState {
	pub hub: Arc<Hub>,
	pub settings: RelaySettings,
	pub cancel: CancellationToken,
}

impl RelayState {
	pub fn new(settings: RelaySettings, cancel: CancellationToken) -> Self {
		Self {
			hub: Arc::new(Hub::new(settings.buffer)),
			settings,
			cancel,
		}
	}
}

pub fn app(state: RelayState) -> Router {
	Router::new()
		.route("/", get(|| async { Html::from(BANNER) }))
		.route("/health", get(|| async { Html::from("Ok") }))
		.route("/ws", get(ws::ws_handler))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}
