//! Entity tags for derived snapshots.
//!
//! A snapshot is fully determined by the records and the selection state it
//! was derived from. The tag is a SHA-256 hash over the records digest, the
//! engine version, and the selections in sorted order, so equal states hash
//! equally and a restart with different data never reuses an old tag.

use intel_core::selection::Selections;
use sha2::{Digest, Sha256};

/// Compute the quoted entity tag for a state.
pub fn version_token(
  records_digest: &[u8; 32],
  version: u64,
  selections: &Selections,
) -> String {
  let mut hasher = Sha256::new();
  hasher.update(records_digest);
  hasher.update(version.to_le_bytes());
  for (dimension, values) in selections.active() {
    hasher.update(dimension.as_bytes());
    hasher.update([0]);
    for value in values {
      hasher.update(value.as_bytes());
      hasher.update([0]);
    }
    hasher.update([1]);
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-None-Match` header value names `token`.
///
/// Accepts `*`, comma-separated lists, weak tags, and bare tags sent without
/// their surrounding quotes.
pub fn if_none_match(header: &str, token: &str) -> bool {
  let token = token.trim_matches('"');
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || candidate
        .strip_prefix("W/")
        .unwrap_or(candidate)
        .trim_matches('"')
        == token
  })
}

#[cfg(test)]
mod tests {
  use intel_core::record::{FactRecord, digest_records};

  use super::*;

  const DATA: [u8; 32] = [7; 32];

  #[test]
  fn equal_states_share_a_token() {
    let a = Selections::from_pairs([("unit", ["X", "Y"]), ("channel", ["A", "B"])]);
    let b = Selections::default()
      .toggled("channel", "B")
      .toggled("unit", "Y")
      .toggled("channel", "A")
      .toggled("unit", "X");
    assert_eq!(version_token(&DATA, 3, &a), version_token(&DATA, 3, &b));
  }

  #[test]
  fn version_and_selection_both_matter() {
    let sel = Selections::default().toggled("unit", "X");
    let token = version_token(&DATA, 1, &sel);
    assert_ne!(token, version_token(&DATA, 2, &sel));
    assert_ne!(token, version_token(&DATA, 1, &Selections::default()));
    assert_ne!(token, version_token(&DATA, 1, &sel.toggled("unit", "Y")));
  }

  #[test]
  fn different_records_at_the_same_version_differ() {
    let sel = Selections::default();
    let before = digest_records(&[FactRecord::new("2025-01-06", "A", "X")]);
    let after = digest_records(&[FactRecord::new("2025-01-06", "B", "X")]);
    assert_ne!(version_token(&before, 1, &sel), version_token(&after, 1, &sel));
  }

  #[test]
  fn value_boundaries_are_unambiguous() {
    let joined = Selections::default().toggled("unit", "XY");
    let split = Selections::default().toggled("unit", "X").toggled("unit", "Y");
    assert_ne!(version_token(&DATA, 1, &joined), version_token(&DATA, 1, &split));
  }

  #[test]
  fn token_is_a_quoted_sha256() {
    let token = version_token(&DATA, 0, &Selections::default());
    assert!(token.starts_with('"') && token.ends_with('"'));
    assert_eq!(token.len(), 64 + 2);
  }

  #[test]
  fn if_none_match_forms() {
    let token = version_token(&DATA, 7, &Selections::default());
    let bare = token.trim_matches('"');
    assert!(if_none_match(&token, &token));
    assert!(if_none_match(bare, &token));
    assert!(if_none_match(&format!("W/{token}"), &token));
    assert!(if_none_match(&format!("\"stale\", {token}"), &token));
    assert!(if_none_match("*", &token));
    assert!(!if_none_match("\"stale\"", &token));
  }
}
