use clap::Parser;
use std::time::Duration;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter, e.g. `live_relay=debug`
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "3000")]
	pub port: u16,

	/// Frames buffered per client before a slow client starts skipping
	#[arg(long, env = "RELAY_BUFFER", default_value = "256")]
	pub buffer: usize,

	/// Seconds between server pings
	#[arg(long, env = "RELAY_PING_SECS", default_value = "54")]
	pub ping_secs: u64,

	/// Largest accepted inbound message in bytes
	#[arg(long, env = "RELAY_MAX_MESSAGE_BYTES", default_value = "2097152")]
	pub max_message_bytes: usize,
}

impl Config {
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	pub fn settings(&self) -> RelaySettings {
		RelaySettings {
			buffer: self.buffer,
			ping_interval: Duration::from_secs(self.ping_secs),
			max_message_size: self.max_message_bytes,
		}
	}
}

/// Runtime knobs for the hub and its sockets
#[derive(Debug, Clone, Copy)]
pub struct RelaySettings {
	pub buffer: usize,
	pub ping_interval: Duration,
	pub max_message_size: usize,
}

impl Default for RelaySettings {
	fn default() -> Self {
		Self {
			buffer: 256,
			ping_interval: Duration::from_secs(54),
			max_message_size: 2 * 1024 * 1024,
		}
	}
}
