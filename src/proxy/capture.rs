//! Persisting captured GraphQL requests to disk.

use super::error::{ProxyError, Result};
use super::fingerprint::fingerprint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// The shape of a GraphQL-over-HTTP request body, as sent by a browser
/// client: a single operation object, or (for batched requests) a JSON
/// array of these.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GqlRequestRecord {
  #[serde(rename = "operationName", default)]
  pub operation_name: Option<String>,
  #[serde(default)]
  pub query: Option<String>,
  #[serde(default)]
  pub variables: Option<Value>,
  #[serde(default)]
  pub extensions: Option<Value>,
}

impl GqlRequestRecord {
  /// Parses either a single object or a JSON array of objects from a
  /// captured request body.
  pub fn parse_body(body: &[u8]) -> serde_json::Result<Vec<Self>> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
      Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
      other => Ok(vec![serde_json::from_value(other)?]),
    }
  }

  /// The hash this record uses for fingerprinting: its explicit persisted
  /// query hash if present, otherwise the SHA-256 of its query text,
  /// otherwise empty (an operation referencing a hash the proxy never saw
  /// text for -- still worth a single capture under that hash).
  fn hash_or_query(&self) -> String {
    if let Some(hash) = self.extensions.as_ref().and_then(|e| e.get("persistedQuery")).and_then(|p| p.get("sha256Hash")).and_then(Value::as_str) {
      return hash.to_string();
    }
    if let Some(query) = &self.query {
      return crate::gql::hash_query(query);
    }
    String::new()
  }

  fn name(&self) -> &str {
    self.operation_name.as_deref().unwrap_or("unknown")
  }

  /// Replaces characters that are awkward or unsafe in a filename with
  /// `_`, so an operation name can be used directly as a file stem.
  fn sanitized_name(&self) -> String {
    self.name().chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' }).collect()
  }
}

/// Deduplicated, append-only persistence for captured operations. One
/// process-lifetime instance per proxy run.
pub struct CaptureStore {
  dir: PathBuf,
  seen: Mutex<HashSet<String>>,
  log: Mutex<File>,
  operations_log: Mutex<File>,
}

impl CaptureStore {
  pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir).map_err(ProxyError::Persist)?;

    let log = OpenOptions::new().create(true).append(true).open(dir.join("proxy.log")).map_err(ProxyError::Persist)?;
    let operations_log = OpenOptions::new().create(true).append(true).open(dir.join("operations.jsonl")).map_err(ProxyError::Persist)?;

    Ok(Self { dir, seen: Mutex::new(HashSet::new()), log: Mutex::new(log), operations_log: Mutex::new(operations_log) })
  }

  /// Records `record` if it hasn't been captured before in this run.
  /// Returns `true` if this was a new capture. Writes a per-operation JSON
  /// file named after the operation (overwritten on each new capture of
  /// that name, so the file always reflects the latest variables seen) and
  /// appends one line to `operations.jsonl` regardless.
  pub fn record(&self, record: &GqlRequestRecord) -> Result<bool> {
    let key = fingerprint(record.name(), &record.hash_or_query());
    let is_new = {
      let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
      seen.insert(key)
    };

    self.append_jsonl(record)?;

    if is_new {
      self.write_operation_file(record)?;
      self.log_line(&format!("captured {}", record.name()))?;
    }

    Ok(is_new)
  }

  fn write_operation_file(&self, record: &GqlRequestRecord) -> Result<()> {
    let path = self.dir.join(format!("{}.json", record.sanitized_name()));
    let body = serde_json::to_vec_pretty(record).map_err(|e| ProxyError::Persist(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    fs::write(path, body).map_err(ProxyError::Persist)
  }

  fn append_jsonl(&self, record: &GqlRequestRecord) -> Result<()> {
    let mut line = serde_json::to_vec(record).map_err(|e| ProxyError::Persist(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    line.push(b'\n');
    let mut file = self.operations_log.lock().unwrap_or_else(|e| e.into_inner());
    file.write_all(&line).map_err(ProxyError::Persist)
  }

  pub fn log_line(&self, message: &str) -> Result<()> {
    let mut file = self.log.lock().unwrap_or_else(|e| e.into_inner());
    writeln!(file, "{} {message}", chrono::Utc::now().to_rfc3339()).map_err(ProxyError::Persist)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_body_accepts_single_object_and_array() {
    let single = br#"{"operationName":"GetUser","variables":{"id":1}}"#;
    let records = GqlRequestRecord::parse_body(single).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation_name.as_deref(), Some("GetUser"));

    let batch = br#"[{"operationName":"A"},{"operationName":"B"}]"#;
    let records = GqlRequestRecord::parse_body(batch).unwrap();
    assert_eq!(records.len(), 2);
  }

  #[test]
  fn sanitized_name_replaces_unsafe_characters() {
    let record = GqlRequestRecord { operation_name: Some("Channel Page/Query".to_string()), ..Default::default() };
    assert_eq!(record.sanitized_name(), "Channel_Page_Query");
  }

  #[test]
  fn record_dedups_identical_captures_but_always_appends_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let store = CaptureStore::new(dir.path()).unwrap();
    let record = GqlRequestRecord { operation_name: Some("GetUser".to_string()), query: Some("query GetUser { user { id } }".to_string()), ..Default::default() };

    assert!(store.record(&record).unwrap());
    assert!(!store.record(&record).unwrap());

    let jsonl = fs::read_to_string(dir.path().join("operations.jsonl")).unwrap();
    assert_eq!(jsonl.lines().count(), 2);
    assert!(dir.path().join("GetUser.json").exists());
  }
}
