//! Process-wide live state.
//!
//! A [`LiveSession`] wires a [`LiveTransport`](live_transport::LiveTransport)
//! to a [`LiveBook`] and hands out a [`LiveCoordinator`] for editors and a
//! watch channel for [`DisplaySurface`]s. Incoming updates go through version
//! arbitration; local operations always win.

mod book;
mod clock;
mod coordinator;
mod discovery;
mod display;
mod error;
mod incoming;
mod prefs;
mod session;

pub use book::{LiveBook, LiveState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{LiveCoordinator, SceneInput, SendOptions};
pub use discovery::{BackendDiscovery, BackendInfo, DEFAULT_BACKEND_ORIGIN};
pub use display::{DisplayFrame, DisplaySurface, Playback, Renderer, IDLE_PLACEHOLDER, STANDBY_PLACEHOLDER};
pub use error::{CoordinatorError, DiscoveryError, PreferenceError};
pub use incoming::{ErrorHook, IncomingFrames};
pub use prefs::{JsonFilePreferences, MemoryPreferences, PreferenceStore, AUTO_FOLLOW_KEY};
pub use session::{LiveSession, SessionOptions};

pub type Result<T> = std::result::Result<T, CoordinatorError>;
