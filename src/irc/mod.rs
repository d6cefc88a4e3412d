//! ## Tag-extended IRC line parser
//!
//! The entrypoint is [`Frame::parse`], a single-pass recursive-descent
//! parser for lines of the form:
//!
//! ```text
//! [ '@' tags SP ] [ ':' prefix SP ] command [ SP params ] [ SP ':' trailing ]
//! ```
//!
//! Parsing never fails: every input string produces a [`Frame`], even if
//! all that could be salvaged was the raw line itself. This is what lets
//! [`crate::msg`] decoders stay pure `Frame -> Option<Event>` functions
//! instead of threading a parse error through the whole read path.

mod escape;
mod grammar;

pub use escape::unescape;
pub use grammar::{parse_badges, parse_bool, parse_channel, parse_emotes, parse_int, parse_timestamp, user_from_prefix};

use std::collections::HashMap;

/// A tag-extended IRC line, parsed into its structural pieces.
///
/// [`Frame`] owns all of its data; there is no borrowed/zero-copy variant.
/// A chat connection allocates one of these per line and discards it once
/// the corresponding [`crate::msg::Event`] has been decoded and dispatched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
  /// `@key=value;key2=value2` tags, with escape sequences already resolved.
  ///
  /// Always present (possibly empty), never `None` -- this mirrors the
  /// "the tag mapping is always non-null" invariant from the protocol spec.
  pub tags: HashMap<String, String>,

  /// `:nick!user@host` or `:host`, without the leading `:`.
  pub prefix: Option<String>,

  /// The command token, e.g. `PRIVMSG` or `001`.
  ///
  /// Empty iff the line was blank or too malformed to recover a command
  /// from (in which case [`Frame::raw`] is the only reliable field).
  pub command: String,

  /// Positional parameters that appear before the trailing parameter.
  pub params: Vec<String>,

  /// The final parameter, introduced by `SP :` and running to end of line.
  ///
  /// Unlike `params`, this is taken verbatim and may contain spaces and
  /// colons.
  pub trailing: Option<String>,

  /// The original line, exactly as received.
  pub raw: String,
}

impl Frame {
  /// Parses a single IRC line. Multiple lines packed into one WebSocket
  /// text frame must be split on `\r\n` by the caller before this is
  /// called -- see [`crate::chat`].
  pub fn parse(line: &str) -> Frame {
    let raw = line.to_string();
    let mut rest = line;

    let tags = if let Some(tail) = rest.strip_prefix('@') {
      let (tag_str, tail) = split_structural(tail);
      rest = tail;
      parse_tags(tag_str)
    } else {
      HashMap::new()
    };

    let prefix = if let Some(tail) = rest.strip_prefix(':') {
      let (prefix, tail) = split_structural(tail);
      rest = tail;
      Some(prefix.to_string())
    } else {
      None
    };

    let (command, tail) = split_structural(rest);
    rest = tail;

    let mut params = Vec::new();
    let mut trailing = None;
    loop {
      rest = rest.trim_start_matches(' ');
      if rest.is_empty() {
        break;
      }
      if let Some(text) = rest.strip_prefix(':') {
        trailing = Some(text.to_string());
        break;
      }
      let (param, tail) = split_structural(rest);
      params.push(param.to_string());
      rest = tail;
    }

    Frame {
      tags,
      prefix,
      command: command.to_string(),
      params,
      trailing,
      raw,
    }
  }

  /// The channel this frame concerns, if its first parameter is a
  /// `#channel` token. The leading `#` is stripped.
  pub fn channel(&self) -> Option<String> {
    self.params.first().map(|p| parse_channel(p))
  }

  /// Looks up a tag by key.
  pub fn tag(&self, key: &str) -> Option<&str> {
    self.tags.get(key).map(|s| s.as_str())
  }
}

/// Splits `s` on the first run of one or more spaces, returning the token
/// before it and the remainder with leading spaces stripped. If there is
/// no space, the whole string is the token and the remainder is empty.
fn split_structural(s: &str) -> (&str, &str) {
  match s.find(' ') {
    Some(idx) => (&s[..idx], s[idx..].trim_start_matches(' ')),
    None => (s, &s[s.len()..]),
  }
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
  let mut tags = HashMap::new();
  if raw.is_empty() {
    return tags;
  }
  for pair in raw.split(';') {
    if pair.is_empty() {
      continue;
    }
    match pair.split_once('=') {
      Some((key, value)) => {
        tags.insert(key.to_string(), unescape(value));
      }
      None => {
        tags.insert(pair.to_string(), String::new());
      }
    }
  }
  tags
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_is_total_on_garbage() {
    for input in ["", "   ", "@", ":", "@;=;=", "\u{0}\u{1}"] {
      let frame = Frame::parse(input);
      assert_eq!(frame.raw, input);
    }
  }

  #[test]
  fn parse_privmsg() {
    let line = "@badge-info=;badges=broadcaster/1;color=#FF0000;display-name=TestUser;emotes=25:0-4;id=abc;mod=0;room-id=12345;subscriber=0;tmi-sent-ts=1234567890123;user-id=12345 :testuser!testuser@testuser.tmi.twitch.tv PRIVMSG #testchannel :Kappa Hello";
    let frame = Frame::parse(line);
    assert_eq!(frame.command, "PRIVMSG");
    assert_eq!(frame.channel().as_deref(), Some("testchannel"));
    assert_eq!(frame.trailing.as_deref(), Some("Kappa Hello"));
    assert_eq!(frame.tag("display-name"), Some("TestUser"));
    assert_eq!(frame.prefix.as_deref(), Some("testuser!testuser@testuser.tmi.twitch.tv"));
  }

  #[test]
  fn parse_roomstate() {
    let line = "@emote-only=0;followers-only=10;r9k=0;room-id=12345;slow=30;subs-only=1 :tmi.twitch.tv ROOMSTATE #testchannel";
    let frame = Frame::parse(line);
    assert_eq!(frame.command, "ROOMSTATE");
    assert_eq!(frame.channel().as_deref(), Some("testchannel"));
    assert!(frame.trailing.is_none());
  }

  #[test]
  fn parse_clearchat_with_trailing() {
    let line = "@ban-duration=600;target-user-id=67890 :tmi.twitch.tv CLEARCHAT #testchannel :baduser";
    let frame = Frame::parse(line);
    assert_eq!(frame.command, "CLEARCHAT");
    assert_eq!(frame.trailing.as_deref(), Some("baduser"));
    assert_eq!(frame.tag("ban-duration"), Some("600"));
  }

  #[test]
  fn parse_ping_no_tags_no_prefix() {
    let frame = Frame::parse("PING :tmi.twitch.tv");
    assert_eq!(frame.command, "PING");
    assert_eq!(frame.trailing.as_deref(), Some("tmi.twitch.tv"));
  }

  #[test]
  fn empty_tag_value_is_distinct_from_missing() {
    let frame = Frame::parse("@flags=;id=1 :tmi.twitch.tv PRIVMSG #a :hi");
    assert_eq!(frame.tag("flags"), Some(""));
    assert_eq!(frame.tag("nonexistent"), None);
  }

  #[test]
  fn tolerates_multiple_spaces() {
    let frame = Frame::parse("PING  :tmi.twitch.tv");
    assert_eq!(frame.command, "PING");
    assert_eq!(frame.trailing.as_deref(), Some("tmi.twitch.tv"));
  }
}
