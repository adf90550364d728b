//! Storage path derivation
//!
//! Every uploaded object lives at `{parent}/{timestamp}-{suffix}-{filename}`.
//! The timestamp has millisecond resolution and the suffix is random, so two
//! uploads never collide without any coordination, and the sanitized filename
//! can never introduce another path separator.

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// ISO-8601 instant with `:` and `.` replaced by `-`, e.g. `2026-10-19T12-00-00-000Z`.
fn path_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Derive a fresh storage path for `filename` under `parent_id`.
pub fn derive_storage_path(parent_id: &str, filename: &str, now: DateTime<Utc>) -> String {
    derive_storage_path_with_suffix(parent_id, filename, now, &random_suffix())
}

/// Same as [`derive_storage_path`] with a caller-chosen suffix.
pub fn derive_storage_path_with_suffix(
    parent_id: &str,
    filename: &str,
    now: DateTime<Utc>,
    suffix: &str,
) -> String {
    format!(
        "{}/{}-{}-{}",
        parent_id,
        path_timestamp(now),
        suffix,
        sanitize_filename(filename)
    )
}
