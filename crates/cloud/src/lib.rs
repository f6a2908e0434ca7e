//! Publisher adapters: a local directory and Amazon S3.
//!
//! Both place content under the same object key layout, see [`object_key`].

pub mod local;
pub mod s3;
pub mod settings;

pub use local::LocalDirPublisher;
pub use s3::S3Publisher;
pub use settings::{ConfigError, PublisherBackend, PublisherSettings};

use depot_core::asset::Asset;

/// Fallback object name when nothing of the original filename survives.
const FALLBACK_FILENAME: &str = "file";

/// Object key for an asset: `{asset_id}/{sanitized filename}`.
pub fn object_key(asset: &Asset) -> String {
    format!(
        "{}/{}",
        asset.id(),
        sanitize_filename(asset.filename().as_str())
    )
}

/// Reduce a client-supplied filename to a safe single path segment.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so the result is never hidden or `..`.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Join a public base URL and an object key with exactly one `/`.
pub(crate) fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_filename("panda-1_final.png"), "panda-1_final.png");
    }

    #[test]
    fn replaces_separators_and_spaces() {
        assert_eq!(sanitize_filename("../etc/pass wd"), "_etc_pass_wd");
        assert_eq!(sanitize_filename("a\\b c.png"), "a_b_c.png");
    }

    #[test]
    fn strips_leading_dots() {
        assert_eq!(sanitize_filename(".env"), "env");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn url_join_has_single_slash() {
        assert_eq!(public_url("https://cdn/", "a/b.png"), "https://cdn/a/b.png");
        assert_eq!(public_url("https://cdn", "a/b.png"), "https://cdn/a/b.png");
    }
}
