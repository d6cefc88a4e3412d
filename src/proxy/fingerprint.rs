//! Operation fingerprinting: identifies a captured GraphQL request for
//! deduplication purposes.

use sha2::{Digest, Sha256};

/// A stable identity for a captured operation: `(operationName,
/// sha256Hash OR hash(queryText))`. Two requests with the same operation
/// name and the same hash (explicit or derived from the query text) are
/// considered the same capture and only persisted once.
pub fn fingerprint(operation_name: &str, hash_or_query: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(operation_name.as_bytes());
  hasher.update(b"\0");
  hasher.update(hash_or_query.as_bytes());
  hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_name_and_hash_fingerprint_identically() {
    assert_eq!(fingerprint("GetUser", "abc123"), fingerprint("GetUser", "abc123"));
  }

  #[test]
  fn different_hash_fingerprints_differently() {
    assert_ne!(fingerprint("GetUser", "abc123"), fingerprint("GetUser", "def456"));
  }

  #[test]
  fn different_name_fingerprints_differently() {
    assert_ne!(fingerprint("GetUser", "abc123"), fingerprint("GetChannel", "abc123"));
  }
}
