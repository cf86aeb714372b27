//! Find-a-specialist maps lookup.
//!
//! Picks the platform's native maps URL for the search term and opens it.
//! If the native scheme is not handled, the Google Maps web search is tried
//! instead. Only when both fail does the caller see an error.

use crate::error::{Error, Result};
use crate::platform::Platform;

pub const DEFAULT_SEARCH_TERM: &str = "ophthalmologist near me";

pub trait UrlOpener {
    fn can_open(&self, url: &str) -> bool;
    fn open(&self, url: &str) -> Result<()>;
}

pub fn web_url(term: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(term)
    )
}

pub fn platform_url(platform: Platform, term: &str) -> String {
    if platform.is_apple() {
        // apple maps already searches around the current location
        let query = term.trim_end_matches(" near me");
        format!("http://maps.apple.com/?q={}", urlencoding::encode(query))
    } else if platform == Platform::Android {
        format!("geo:0,0?q={}", urlencoding::encode(term))
    } else {
        web_url(term)
    }
}

/// Opens maps for `term` and returns the URL that worked.
pub fn open_find_specialist(opener: &dyn UrlOpener, platform: Platform, term: &str) -> Result<String> {
    let url = platform_url(platform, term);
    let mut tried = Vec::new();

    if opener.can_open(&url) {
        match opener.open(&url) {
            Ok(()) => return Ok(url),
            Err(e) => tracing::warn!(%url, error = %e, "failed to open maps url"),
        }
        tried.push(url.clone());
    } else {
        tracing::debug!(%url, "maps url not supported, falling back to web");
    }

    let fallback = web_url(term);
    if tried.contains(&fallback) {
        return Err(Error::MapsIntentUnsupported { tried });
    }

    match opener.open(&fallback) {
        Ok(()) => Ok(fallback),
        Err(e) => {
            tracing::warn!(url = %fallback, error = %e, "failed to open web maps");
            tried.push(fallback);
            Err(Error::MapsIntentUnsupported { tried })
        }
    }
}
