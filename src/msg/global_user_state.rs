//! `GLOBALUSERSTATE` -- sent once, right after a successful authentication.

use super::{non_empty, FromFrame};
use crate::irc::{parse_badges, Frame};
use std::collections::HashMap;

/// Describes the bot's own account, as seen by Twitch. Delivered exactly
/// once, during the handshake, and stashed by [`crate::chat::Connection`]
/// for the lifetime of the connection.
#[derive(Clone, Debug)]
pub struct GlobalUserState {
  pub user_id: String,
  pub display_name: String,
  pub color: Option<String>,
  pub badges: HashMap<String, String>,
  pub badge_info: HashMap<String, String>,
  pub emote_sets: Vec<String>,
}

impl FromFrame for GlobalUserState {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "GLOBALUSERSTATE" {
      return None;
    }

    Some(GlobalUserState {
      user_id: frame.tag("user-id").unwrap_or_default().to_string(),
      display_name: frame.tag("display-name").unwrap_or_default().to_string(),
      color: non_empty(frame.tag("color")),
      badges: frame.tag("badges").map(parse_badges).unwrap_or_default(),
      badge_info: frame.tag("badge-info").map(parse_badges).unwrap_or_default(),
      emote_sets: frame
        .tag("emote-sets")
        .map(|v| v.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_global_user_state() {
    let line = "@badge-info=;badges=;color=#FF0000;display-name=Bot;emote-sets=0,42 :tmi.twitch.tv GLOBALUSERSTATE";
    let frame = Frame::parse(line);
    let gus = GlobalUserState::from_frame(&frame).unwrap();
    assert_eq!(gus.display_name, "Bot");
    assert_eq!(gus.emote_sets, vec!["0", "42"]);
  }
}
