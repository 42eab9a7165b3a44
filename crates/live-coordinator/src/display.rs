use crate::book::LiveState;
use live_scene::{LiveMode, Scene};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const IDLE_PLACEHOLDER: &str = "Waiting for live content";
pub const STANDBY_PLACEHOLDER: &str = "Standing by";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
	/// Media may autoplay
	Playing,
	/// Hold the last frame, do not advance
	Held,
}

/// What a display should be showing for a given live state
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayFrame {
	Idle { placeholder: &'static str },
	Showing { scene: Scene, playback: Playback },
}

impl DisplayFrame {
	pub fn from_state(state: &LiveState) -> Self {
		match (&state.scene, state.status.mode) {
			(None, _) => Self::Idle { placeholder: IDLE_PLACEHOLDER },
			(Some(scene), LiveMode::Live) => Self::Showing {
				scene: scene.clone(),
				playback: Playback::Playing,
			},
			(Some(scene), LiveMode::Paused) => Self::Showing {
				scene: scene.clone(),
				playback: Playback::Held,
			},
			(Some(_), LiveMode::Connected) => Self::Idle { placeholder: STANDBY_PLACEHOLDER },
		}
	}

	pub const fn is_idle(&self) -> bool {
		matches!(self, Self::Idle { .. })
	}

	pub const fn scene(&self) -> Option<&Scene> {
		match self {
			Self::Showing { scene, .. } => Some(scene),
			Self::Idle { .. } => None,
		}
	}
}

/// Draws frames. Called on the surface task, once per distinct frame.
pub trait Renderer: Send {
	fn render(&mut self, frame: &DisplayFrame);
}

impl<F> Renderer for F
where
	F: FnMut(&DisplayFrame) + Send,
{
	fn render(&mut self, frame: &DisplayFrame) {
		self(frame);
	}
}

/// Read-only view of the live state. It never writes back.
pub struct DisplaySurface {
	state: watch::Receiver<LiveState>,
	last: Option<DisplayFrame>,
}

impl DisplaySurface {
	pub const fn new(state: watch::Receiver<LiveState>) -> Self {
		Self { state, last: None }
	}

	pub fn current(&self) -> DisplayFrame {
		DisplayFrame::from_state(&self.state.borrow())
	}

	/// Render the current frame if it differs from the last one rendered
	fn refresh<R: Renderer>(&mut self, renderer: &mut R) {
		let frame = DisplayFrame::from_state(&self.state.borrow_and_update());
		if self.last.as_ref() == Some(&frame) {
			return;
		}
		debug!(idle = frame.is_idle(), "rendering display frame");
		renderer.render(&frame);
		self.last = Some(frame);
	}

	/// Render now and on every change until cancelled or the state goes away
	pub async fn run<R: Renderer>(mut self, renderer: &mut R, cancel: CancellationToken) {
		self.refresh(renderer);

		loop {
			tokio::select! {
				() = cancel.cancelled() => break,
				changed = self.state.changed() => {
					if changed.is_err() {
						break;
					}
					self.refresh(renderer);
				}
			}
		}

		info!("display surface stopped");
	}
}
