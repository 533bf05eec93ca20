//! Endpoint normalization — user-entered URL to canonical base URL.
//!
//! Users paste whatever their server printed: trailing slashes, `/v1` or
//! `/api` suffixes, doubled separators. Every request path starts from the
//! canonical form so the per-backend handlers can append their own routes.

use url::Url;

use quillpad_core::{Provider, ProviderError};

use crate::registry;

/// Produce the canonical base URL for `provider`.
///
/// - trims the input and parses it (malformed input is an error);
/// - collapses duplicate `/` separators in the path;
/// - strips the provider's well-known path suffix (`/v1`, `/api`);
/// - substitutes the fixed base for the pool and gateway providers,
///   ignoring the input entirely;
/// - never returns a trailing slash.
///
/// Idempotent: normalizing an already-normalized URL yields the same string.
pub fn normalize_endpoint(raw: &str, provider: Provider) -> Result<String, ProviderError> {
    let mut url = Url::parse(raw.trim())?;

    let spec = registry::spec(provider);
    if let Some(base) = spec.fixed_base {
        return Ok(base.to_string());
    }

    url.set_path(&collapse_slashes(url.path()));

    if let Some(suffix) = spec.strip_suffix {
        let path = url.path().to_string();
        let trimmed = path.strip_suffix('/').unwrap_or(&path);
        if let Some(rest) = trimmed.strip_suffix(suffix) {
            url.set_path(rest);
        }
    }

    let mut out = url.to_string();
    while out.ends_with('/') {
        out.pop();
    }
    Ok(out)
}

/// Collapse runs of `/` in a URL path to a single separator.
fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            prev_slash = false;
            out.push(c);
        }
    }
    out
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
