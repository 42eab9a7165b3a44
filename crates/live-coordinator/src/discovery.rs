use crate::error::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BACKEND_ORIGIN: &str = "http://127.0.0.1:3000";

/// Where the backend lives and how to reach its live channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfo {
	pub origin: String,
	pub ws_url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub log_dir: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_dir: Option<String>,
}

impl BackendInfo {
	/// `http://host:port` becomes `ws://host:port/ws`, `https` becomes `wss`
	pub fn from_origin(origin: &str) -> Result<Self, DiscoveryError> {
		let invalid = |reason: String| DiscoveryError::InvalidOrigin {
			origin: origin.to_string(),
			reason,
		};

		let parsed = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
		let ws_scheme = match parsed.scheme() {
			"http" => "ws",
			"https" => "wss",
			other => return Err(invalid(format!("unsupported scheme {other}"))),
		};

		let origin = origin.trim().trim_end_matches('/').to_string();
		let rest = &origin[parsed.scheme().len()..];
		let ws_url = format!("{ws_scheme}{rest}/ws");

		Ok(Self {
			origin,
			ws_url,
			log_dir: None,
			data_dir: None,
		})
	}
}

/// Resolves [`BackendInfo`] once and caches it until [`BackendDiscovery::reset`].
///
/// A failed probe is never cached, so the next `resolve` tries again.
pub struct BackendDiscovery {
	origin: String,
	client: reqwest::Client,
	timeout: Duration,
	cached: Mutex<Option<BackendInfo>>,
}

impl BackendDiscovery {
	pub fn new(origin: impl Into<String>) -> Self {
		Self {
			origin: origin.into(),
			client: reqwest::Client::new(),
			timeout: Duration::from_secs(10),
			cached: Mutex::new(None),
		}
	}

	#[must_use]
	pub const fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn origin(&self) -> &str {
		&self.origin
	}

	pub async fn resolve(&self) -> Result<BackendInfo, DiscoveryError> {
		let mut cached = self.cached.lock().await;
		if let Some(info) = cached.as_ref() {
			return Ok(info.clone());
		}

		let info = BackendInfo::from_origin(&self.origin)?;
		let url = format!("{}/health", info.origin);
		debug!(%url, "probing backend");

		let unavailable = |reason: String| DiscoveryError::Unavailable {
			origin: info.origin.clone(),
			reason,
		};

		match self.client.get(&url).timeout(self.timeout).send().await {
			Ok(response) if response.status().is_success() => {}
			Ok(response) => {
				warn!(%url, status = %response.status(), "backend health check failed");
				return Err(unavailable(format!("HTTP {}", response.status())));
			}
			Err(e) => {
				warn!(%url, "backend unreachable: {e}");
				return Err(unavailable(e.to_string()));
			}
		}

		info!(origin = %info.origin, ws_url = %info.ws_url, "backend resolved");
		*cached = Some(info.clone());
		Ok(info)
	}

	/// Forget the cached result; the next `resolve` probes again
	pub async fn reset(&self) {
		self.cached.lock().await.take();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::{
		io::{AsyncReadExt, AsyncWriteExt},
		net::TcpListener,
	};

	#[test]
	fn test_from_origin_maps_schemes() {
		let info = BackendInfo::from_origin("http://127.0.0.1:3000").unwrap();
		assert_eq!(info.ws_url, "ws://127.0.0.1:3000/ws");

		let info = BackendInfo::from_origin("https://live.example.org/").unwrap();
		assert_eq!(info.origin, "https://live.example.org");
		assert_eq!(info.ws_url, "wss://live.example.org/ws");
	}

	#[test]
	fn test_from_origin_rejects_other_schemes() {
		assert!(matches!(BackendInfo::from_origin("ftp://host"), Err(DiscoveryError::InvalidOrigin { .. })));
		assert!(matches!(BackendInfo::from_origin("not a url"), Err(DiscoveryError::InvalidOrigin { .. })));
	}

	#[test]
	fn test_backend_info_wire_shape() {
		let json = r#"{"origin":"http://localhost:3000","wsUrl":"ws://localhost:3000/ws","dataDir":"/var/lib/live"}"#;
		let info: BackendInfo = serde_json::from_str(json).unwrap();
		assert_eq!(info.data_dir.as_deref(), Some("/var/lib/live"));
		assert_eq!(info.log_dir, None);
	}

	async fn health_server(status_line: &'static str) -> (String, tokio::task::JoinHandle<usize>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let origin = format!("http://{}", listener.local_addr().unwrap());
		let server = tokio::spawn(async move {
			let mut served = 0;
			while let Ok((mut socket, _)) = listener.accept().await {
				let mut buf = [0u8; 1024];
				let _ = socket.read(&mut buf).await;
				let response = format!("{status_line}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOk");
				let _ = socket.write_all(response.as_bytes()).await;
				served += 1;
			}
			served
		});
		(origin, server)
	}

	#[tokio::test]
	async fn test_resolve_caches_until_reset() {
		let (origin, server) = health_server("HTTP/1.1 200 OK").await;
		let discovery = BackendDiscovery::new(origin.clone());

		let first = discovery.resolve().await.unwrap();
		let second = discovery.resolve().await.unwrap();
		assert_eq!(first, second);
		assert_eq!(first.origin, origin);

		discovery.reset().await;
		assert!(discovery.resolve().await.is_ok());

		server.abort();
	}

	#[tokio::test]
	async fn test_unhealthy_backend_is_unavailable() {
		let (origin, server) = health_server("HTTP/1.1 503 Service Unavailable").await;
		let discovery = BackendDiscovery::new(origin);

		let result = discovery.resolve().await;

		assert!(matches!(result, Err(DiscoveryError::Unavailable { .. })));
		server.abort();
	}

	#[tokio::test]
	async fn test_unreachable_backend_is_unavailable() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let origin = format!("http://{}", listener.local_addr().unwrap());
		drop(listener);

		let discovery = BackendDiscovery::new(origin).with_timeout(Duration::from_secs(2));

		assert!(matches!(discovery.resolve().await, Err(DiscoveryError::Unavailable { .. })));
	}
}
