//! Small, total parsers used by the line grammar and by event decoders.
//!
//! Every function here is infallible: malformed input degrades to a
//! sensible default (`0`, `false`, "now", an empty collection) instead of
//! propagating an error. This matches how Twitch's own tags behave -- an
//! absent or garbled tag just means "no information", not "protocol
//! violation".

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

/// A single occurrence of an emote within a message's text.
///
/// `start`/`end` are codepoint offsets as given by the server; this crate
/// does not re-index them against the actual message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmoteSpan {
  pub id: String,
  pub start: i64,
  pub end: i64,
  /// Number of times this emote id occurs in the message (i.e. the number
  /// of position entries found in its `id:pos,pos,...` group).
  pub count: usize,
}

/// Trims exactly one leading `#`, if present.
///
/// ```
/// assert_eq!(twitch_proto::irc::parse_channel("#abc"), "abc");
/// assert_eq!(twitch_proto::irc::parse_channel("abc"), "abc");
/// ```
pub fn parse_channel(s: &str) -> String {
  s.strip_prefix('#').unwrap_or(s).to_string()
}

/// Returns the text before the first `!` in an IRC prefix, or the whole
/// prefix if there is no `!`.
pub fn user_from_prefix(prefix: &str) -> &str {
  match prefix.split_once('!') {
    Some((user, _)) => user,
    None => prefix,
  }
}

/// Parses an integer tag value, returning `0` on empty or non-numeric input.
pub fn parse_int(s: &str) -> i64 {
  s.parse().unwrap_or(0)
}

/// Parses a `0`/`1`-style boolean tag value. Anything other than a positive
/// integer is `false`.
pub fn parse_bool(s: &str) -> bool {
  parse_int(s) > 0
}

/// Parses a `tmi-sent-ts`-style millisecond timestamp. Empty or invalid
/// input yields the current time.
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
  s.parse::<i64>()
    .ok()
    .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    .unwrap_or_else(Utc::now)
}

/// Parses a `badges`/`badge-info` tag value: comma-separated `name/version`
/// pairs. A bare name with no `/` maps to an empty version.
pub fn parse_badges(s: &str) -> HashMap<String, String> {
  let mut out = HashMap::new();
  if s.is_empty() {
    return out;
  }
  for entry in s.split(',') {
    if entry.is_empty() {
      continue;
    }
    match entry.split_once('/') {
      Some((name, version)) => {
        out.insert(name.to_string(), version.to_string());
      }
      None => {
        out.insert(entry.to_string(), String::new());
      }
    }
  }
  out
}

/// Parses an `emotes` tag value: `id:start-end,start-end/id2:start-end`.
/// Malformed groups or positions are silently skipped.
pub fn parse_emotes(s: &str) -> Vec<EmoteSpan> {
  let mut out = Vec::new();
  if s.is_empty() {
    return out;
  }

  for group in s.split('/') {
    let Some((id, positions)) = group.split_once(':') else {
      continue;
    };

    let parsed: Vec<(i64, i64)> = positions
      .split(',')
      .filter_map(|pos| {
        let (start, end) = pos.split_once('-')?;
        Some((start.parse().ok()?, end.parse().ok()?))
      })
      .collect();

    if parsed.is_empty() {
      continue;
    }

    let count = parsed.len();
    for (start, end) in parsed {
      out.push(EmoteSpan {
        id: id.to_string(),
        start,
        end,
        count,
      });
    }
  }

  out
}
