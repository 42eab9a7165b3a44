use clap::{Parser, Subcommand, ValueEnum};
use live_coordinator::{SceneInput, DEFAULT_BACKEND_ORIGIN};
use live_scene::{LyricsPayload, MediaPayload, SceneContent, SceneMeta, SourceModule, VersePayload, VersePreferences};
use std::path::PathBuf;

/// Drive the live presentation from a terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// Backend origin, e.g. http://192.168.1.20:3000
	#[arg(long, env = "BACKEND_ORIGIN", default_value = DEFAULT_BACKEND_ORIGIN, global = true)]
	pub origin: String,

	/// JSON file holding persisted preferences
	#[arg(long, env = "LIVE_PREFS_FILE", default_value = "live-prefs.json", global = true)]
	pub prefs_file: PathBuf,

	/// How long to wait for the live connection before giving up
	#[arg(long, env = "CONNECT_TIMEOUT_MS", default_value = "5000", global = true)]
	pub connect_timeout_ms: u64,

	/// Time left for queued frames to reach the socket before exiting
	#[arg(long, env = "LINGER_MS", default_value = "300", global = true)]
	pub linger_ms: u64,

	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false", global = true)]
	pub log_json: bool,

	/// Log filter, e.g. `live_coordinator=debug`
	#[arg(long, env = "RUST_LOG", global = true)]
	pub rust_log: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
	/// Follow the live state and log every frame that would be shown
	Display,

	/// Send a scripture verse
	Verse {
		/// Reference, e.g. "John 3:16"
		reference: String,

		text: String,

		#[arg(long)]
		translation: Option<String>,

		/// Go live after sending
		#[arg(long)]
		live: bool,
	},

	/// Send song lyrics
	Lyrics {
		title: String,

		content: String,

		/// Section label such as "Chorus"
		#[arg(long)]
		segment: Option<String>,

		#[arg(long)]
		live: bool,
	},

	/// Send an image, a video or a solid color
	Media {
		#[arg(value_enum)]
		kind: MediaArg,

		/// URL or path for image/video, CSS color for color
		source: String,

		#[arg(long)]
		live: bool,
	},

	/// Cut to black and go live
	Black,

	/// Remove the current scene
	Clear,

	/// Push the current scene again with a fresh version
	Resend,

	/// Switch the output to live
	Live,

	/// Hold the output on its current frame
	Pause,

	/// Turn automatic following of remote scenes on or off
	AutoFollow {
		#[arg(value_enum)]
		state: Toggle,
	},
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaArg {
	Image,
	Video,
	Color,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
	On,
	Off,
}

impl From<Toggle> for bool {
	fn from(toggle: Toggle) -> Self {
		toggle == Toggle::On
	}
}

impl Command {
	/// Whether the command needs a live connection to the backend
	pub const fn needs_connection(&self) -> bool {
		!matches!(self, Self::AutoFollow { .. })
	}

	/// Scene to send for content commands, with the operator's verse preferences applied
	pub fn scene_input(&self, verse_prefs: &VersePreferences) -> Option<(SceneInput, bool)> {
		match self {
			Self::Verse { reference, text, translation, live } => {
				let mut payload = VersePayload::new(reference.clone(), text.clone()).with_preferences(verse_prefs);
				payload.translation.clone_from(translation);
				let input = SceneInput::new(SceneContent::verse(payload)).with_meta(SceneMeta::titled(reference.clone(), SourceModule::Search));
				Some((input, *live))
			}
			Self::Lyrics { title, content, segment, live } => {
				let mut payload = LyricsPayload::new(title.clone(), content.clone());
				if let Some(segment) = segment {
					payload = payload.with_segment(segment.clone());
				}
				let input = SceneInput::new(SceneContent::lyrics(payload)).with_meta(SceneMeta::titled(title.clone(), SourceModule::Lyrics));
				Some((input, *live))
			}
			Self::Media { kind, source, live } => {
				let payload = match kind {
					MediaArg::Image => MediaPayload::image(source.clone()),
					MediaArg::Video => MediaPayload::video(source.clone()),
					MediaArg::Color => MediaPayload::color(source.clone()),
				};
				let input = SceneInput::new(SceneContent::media(payload)).with_meta(SceneMeta::titled(source.clone(), SourceModule::Media));
				Some((input, *live))
			}
			_ => None,
		}
	}
}
