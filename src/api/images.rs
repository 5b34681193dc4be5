//! Photo reference resolution.
//!
//! The service stores photos either as absolute URLs or as paths relative to
//! its own host. [`ImageResolver`] turns any stored reference into something
//! a browser or downloader can fetch.

use reqwest::Url;

use crate::domain::Item;

/// Resolves stored photo references against the asset origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    origin: String,
}

impl ImageResolver {
    /// Resolver for the given asset origin; any path on it is ignored.
    #[must_use]
    pub fn new(asset_origin: &Url) -> Self {
        Self {
            origin: asset_origin.origin().ascii_serialization(),
        }
    }

    /// Resolves one photo reference.
    ///
    /// `http(s)://` URLs are returned unchanged, `/`-prefixed paths are
    /// joined to the origin and bare file names are looked up under
    /// `/uploads/`. Blank references resolve to `None`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        if path.starts_with('/') {
            return Some(format!("{}{path}", self.origin));
        }
        Some(format!("{}/uploads/{path}", self.origin))
    }

    /// Resolves the best available photo of an item.
    #[must_use]
    pub fn resolve_item(&self, item: &Item) -> Option<String> {
        item.image_path().and_then(|path| self.resolve(path))
    }
}
