//! Blob key derivation.
//!
//! Keys are restricted to `[A-Za-z0-9._-]` so every backend can store them
//! as-is: a file name, an Azure blob name, a map key.

use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

pub const MAX_KEY_LEN: usize = 200;
pub const MOCK_KEY_PREFIX: &str = "mock-";

pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

/// Container names follow the Azure rules: 3 to 63 characters of lowercase
/// letters, digits and single hyphens, starting and ending alphanumeric.
pub fn validate_container(container: &str) -> Result<()> {
    let valid = (3..=63).contains(&container.len())
        && container
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !container.starts_with('-')
        && !container.ends_with('-')
        && !container.contains("--");
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid container name: {:?}", container)))
    }
}

/// Hex digits of the URL digest appended to a slug that had to be rewritten.
const DIGEST_LEN: usize = 8;

/// Derives the storage key of a scraped article from its URL: the last
/// non-empty path segment, case kept. A segment that is not already a valid
/// key has runs of other characters collapsed into `-` and gets a short
/// digest of the full URL appended, so two URLs never share a rewritten key.
pub fn key_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::Parse(format!("Invalid URL {}: {}", url, e)))?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| Error::Parse(format!("URL has no path to derive a key from: {}", url)))?;

    if validate_key(segment).is_ok() {
        return Ok(segment.to_string());
    }

    let mut slug = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug
        .trim_start_matches(['.', '-'])
        .chars()
        .take(MAX_KEY_LEN - DIGEST_LEN - 1)
        .collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        return Err(Error::Parse(format!("URL does not yield a usable key: {}", url)));
    }

    let digest = hex::encode(Sha256::digest(parsed.as_str().as_bytes()));
    let key = format!("{}-{}", slug, &digest[..DIGEST_LEN]);
    validate_key(&key).map_err(|_| Error::Parse(format!("URL does not yield a usable key: {}", url)))?;
    Ok(key)
}

/// A fresh key for a synthesized article.
pub fn mock_key(id: Uuid) -> String {
    format!("{}{}", MOCK_KEY_PREFIX, id)
}
