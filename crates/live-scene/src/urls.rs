//! Asset URL normalization.
//!
//! Scenes authored in one editor session may carry relative asset paths or
//! loopback URLs pointing at whichever origin served that session. Before a
//! scene is stored, its asset URLs are re-homed onto the resolved backend
//! origin so every display resolves the same file.

use crate::{CoverDocument, Scene, SceneContent};
use url::Url;

/// Paths under this prefix are backend-served assets
pub const API_PATH_PREFIX: &str = "/api/ionicx/";

const ABSOLUTE_SCHEMES: [&str; 6] = ["http:", "https:", "tauri:", "data:", "blob:", "file:"];
const LOOPBACK_HOSTS: [&str; 3] = ["127.0.0.1", "localhost", "tauri.localhost"];

fn has_absolute_scheme(url: &str) -> bool {
	ABSOLUTE_SCHEMES
		.iter()
		.any(|scheme| url.len() >= scheme.len() && url.is_char_boundary(scheme.len()) && url[..scheme.len()].eq_ignore_ascii_case(scheme))
}

/// Resolve `url` against the backend `origin`.
///
/// Relative paths are joined onto the origin. Absolute URLs are kept, except
/// loopback URLs under [`API_PATH_PREFIX`] which move to the origin with their
/// path, query and fragment intact.
pub fn ensure_absolute_url(url: &str, origin: &str) -> String {
	if url.is_empty() {
		return String::new();
	}

	if has_absolute_scheme(url) {
		return rehome_loopback(url, origin).unwrap_or_else(|| url.to_string());
	}

	if origin.is_empty() {
		return url.to_string();
	}

	let origin = origin.trim_end_matches('/');
	if url.starts_with('/') {
		format!("{origin}{url}")
	} else {
		format!("{origin}/{url}")
	}
}

fn rehome_loopback(url: &str, origin: &str) -> Option<String> {
	if origin.is_empty() {
		return None;
	}

	let parsed = Url::parse(url).ok()?;
	let base = Url::parse(origin).ok()?;
	let host = parsed.host_str()?;

	if !LOOPBACK_HOSTS.contains(&host) || !parsed.path().starts_with(API_PATH_PREFIX) || parsed.origin() == base.origin() {
		return None;
	}

	let mut rehomed = base.origin().ascii_serialization();
	rehomed.push_str(parsed.path());
	if let Some(query) = parsed.query() {
		rehomed.push('?');
		rehomed.push_str(query);
	}
	if let Some(fragment) = parsed.fragment() {
		rehomed.push('#');
		rehomed.push_str(fragment);
	}
	Some(rehomed)
}

/// Inverse of [`ensure_absolute_url`] for URLs on the backend origin
pub fn strip_backend_origin(url: &str, origin: &str) -> String {
	if url.is_empty() || origin.is_empty() {
		return url.to_string();
	}

	match url.strip_prefix(origin) {
		Some("") => "/".to_string(),
		Some(rest) => rest.to_string(),
		None => url.to_string(),
	}
}

fn normalize_src(src: &mut Option<String>, origin: &str) {
	if let Some(current) = src.as_mut() {
		*current = ensure_absolute_url(current, origin);
	}
}

fn normalize_cover_doc(doc: &mut CoverDocument, origin: &str) {
	if doc.canvas.background.is_image() {
		normalize_src(&mut doc.canvas.background.src, origin);
	}

	for layer in doc.layers.iter_mut().filter(|layer| layer.is_image()) {
		normalize_src(&mut layer.src, origin);
	}
}

/// Re-home every asset URL in `scene` onto `origin`.
///
/// Covers media `src`, verse image/video backgrounds, the cover canvas image
/// background and cover image layers. Lyrics carry no assets.
pub fn normalize_scene_urls(mut scene: Scene, origin: &str) -> Scene {
	if origin.is_empty() {
		return scene;
	}

	match &mut scene.content {
		SceneContent::Media { payload, .. } => normalize_src(&mut payload.src, origin),
		SceneContent::Verse { payload, .. } => {
			if let Some(background) = payload.background.as_mut().filter(|background| background.has_asset()) {
				normalize_src(&mut background.src, origin);
			}
		}
		SceneContent::Cover { payload, .. } => normalize_cover_doc(&mut payload.doc, origin),
		SceneContent::Lyrics { .. } => {}
	}

	scene
}
