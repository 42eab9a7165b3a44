mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use live_coordinator::{BackendDiscovery, DisplayFrame, DisplaySurface, JsonFilePreferences, LiveSession, Playback, SendOptions, SessionOptions};
use live_scene::LiveMode;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer};

const DISCOVERY_RETRY: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let cli = Cli::parse();

	let _ = init_tracing(&cli);

	let prefs = Arc::new(JsonFilePreferences::new(&cli.prefs_file));
	let options = SessionOptions::default().with_prefs(prefs);
	let connect_timeout = Duration::from_millis(cli.connect_timeout_ms);
	let discovery = BackendDiscovery::new(cli.origin.clone()).with_timeout(connect_timeout);

	match &cli.command {
		Command::Display => display(discovery, options).await,
		command if !command.needs_connection() => {
			let session = LiveSession::start(None, options);
			let result = perform(&session, command);
			session.shutdown().await;
			result
		}
		command => {
			let info = discovery.resolve().await.with_context(|| format!("backend at {} is not available", cli.origin))?;
			let session = LiveSession::start(Some(info), options);

			let result = match prepare(&session, command, connect_timeout).await {
				Ok(()) => perform(&session, command),
				Err(e) => Err(e),
			};

			// let the driver write what was just queued
			tokio::time::sleep(Duration::from_millis(cli.linger_ms)).await;
			session.shutdown().await;
			result
		}
	}
}

/// Wait for the connection and, for a resend, for the backend's replayed scene
async fn prepare(session: &LiveSession, command: &Command, limit: Duration) -> Result<()> {
	if !session.wait_connected(limit).await {
		bail!("no live connection after {limit:?}");
	}

	if *command == Command::Resend && session.wait_for_scene(limit).await.is_none() {
		tracing::debug!("backend replayed no scene within {limit:?}");
	}
	Ok(())
}

fn perform(session: &LiveSession, command: &Command) -> Result<()> {
	let coordinator = session.coordinator();

	if let Some((input, live)) = command.scene_input(&coordinator.verse_prefs()) {
		let options = if live { SendOptions::live() } else { SendOptions::default() };
		let scene = coordinator.send_scene(input, options);
		println!("sent {} scene {} (version {})", scene.kind(), scene.id, scene.version);
		return Ok(());
	}

	match command {
		Command::Black => {
			let scene = coordinator.send_black();
			println!("cut to black ({})", scene.id);
		}
		Command::Clear => {
			coordinator.clear_scene();
			println!("scene cleared");
		}
		Command::Resend => match coordinator.resend_scene() {
			Some(scene) => println!("resent {} (version {})", scene.id, scene.version),
			None => println!("nothing to resend"),
		},
		Command::Live => {
			let status = coordinator.set_live_mode(LiveMode::Live);
			println!("output is {}", status.mode);
		}
		Command::Pause => {
			let status = coordinator.set_live_mode(LiveMode::Paused);
			println!("output is {}", status.mode);
		}
		Command::AutoFollow { state } => {
			coordinator.set_auto_follow((*state).into()).context("failed to save auto-follow preference")?;
			println!("auto-follow {}", if coordinator.auto_follow() { "on" } else { "off" });
		}
		Command::Display | Command::Verse { .. } | Command::Lyrics { .. } | Command::Media { .. } => {}
	}

	Ok(())
}

/// Follow the live state until Ctrl+C, logging each distinct frame
async fn display(discovery: BackendDiscovery, options: SessionOptions) -> Result<()> {
	let session = Arc::new(LiveSession::start(None, options));
	let cancel = CancellationToken::new();

	let resolver = {
		let session = session.clone();
		let cancel = cancel.clone();
		tokio::spawn(async move {
			loop {
				match discovery.resolve().await {
					Ok(info) => {
						session.retarget(Some(info));
						break;
					}
					Err(e) => {
						tracing::warn!("{e}; retrying in {DISCOVERY_RETRY:?}");
						discovery.reset().await;
					}
				}
				tokio::select! {
					() = cancel.cancelled() => break,
					() = tokio::time::sleep(DISCOVERY_RETRY) => {}
				}
			}
		})
	};

	let signal_token = cancel.clone();
	tokio::spawn(async move {
		tokio::signal::ctrl_c().await.ok();
		tracing::info!("Received Ctrl+C, stopping display...");
		signal_token.cancel();
	});

	let surface = DisplaySurface::new(session.coordinator().subscribe());
	let mut renderer = |frame: &DisplayFrame| match frame {
		DisplayFrame::Idle { placeholder } => tracing::info!(%placeholder, "display idle"),
		DisplayFrame::Showing { scene, playback } => tracing::info!(
			kind = %scene.kind(),
			id = %scene.id,
			version = scene.version,
			title = scene.title().unwrap_or_default(),
			held = *playback == Playback::Held,
			"display showing"
		),
	};
	surface.run(&mut renderer, cancel.clone()).await;

	cancel.cancel();
	if let Err(e) = resolver.await {
		tracing::debug!("discovery task ended abnormally: {e}");
	}
	session.shutdown().await;
	Ok(())
}

#[must_use]
pub fn init_tracing(cli: &Cli) -> Option<()> {
	use std::str::FromStr;
	use tracing_subscriber::layer::SubscriberExt;

	let filter = match EnvFilter::from_str(cli.rust_log.as_deref()?) {
		Ok(filter) => filter,
		Err(e) => {
			eprintln!("invalid RUST_LOG directive: {e}");
			return None;
		}
	};

	tracing_subscriber::registry()
		.with(if cli.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.init();
	None
}
