//! URL-safe identifiers for dashboards
//!
//! Dashboard ids are derived from titles: lower-cased, stripped of anything
//! but ASCII word characters and spaces, with runs of spaces turned into `-`.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_ ]+").expect("valid slug pattern"));

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid slug pattern"));

/// Slug of a dashboard title, e.g. `"My Dash!"` -> `"my-dash"`
pub fn slugify_for_url(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    SPACES.replace_all(&stripped, "-").into_owned()
}

/// Percent-encode a single path segment
pub fn encode_uri_component(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Slug of a title, encoded for use as a backend document id
pub fn dashboard_id(title: &str) -> String {
    encode_uri_component(&slugify_for_url(title))
}
