//! `USERSTATE` -- identifies the bot's chat settings/properties in a
//! specific channel (sent after `JOIN` and after every `PRIVMSG` it sends).

use super::{non_empty, FromFrame};
use crate::irc::{parse_badges, parse_bool, Frame};
use std::collections::HashMap;

/// The bot's own chat settings within a specific channel.
#[derive(Clone, Debug)]
pub struct UserState {
  pub channel: String,
  pub display_name: String,
  pub color: Option<String>,
  pub badges: HashMap<String, String>,
  pub badge_info: HashMap<String, String>,
  pub emote_sets: Vec<String>,
  pub is_mod: bool,
  pub is_subscriber: bool,
  pub is_vip: bool,
}

impl FromFrame for UserState {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "USERSTATE" {
      return None;
    }

    let badges = frame.tag("badges").map(parse_badges).unwrap_or_default();

    Some(UserState {
      channel: frame.channel()?,
      display_name: frame.tag("display-name").unwrap_or_default().to_string(),
      color: non_empty(frame.tag("color")),
      is_vip: badges.contains_key("vip"),
      badge_info: frame.tag("badge-info").map(parse_badges).unwrap_or_default(),
      badges,
      emote_sets: frame
        .tag("emote-sets")
        .map(|v| v.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default(),
      is_mod: frame.tag("mod").map(parse_bool).unwrap_or(false),
      is_subscriber: frame.tag("subscriber").map(parse_bool).unwrap_or(false),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_user_state() {
    let frame = Frame::parse("@badges=moderator/1;color=;display-name=Bot;mod=1;subscriber=0 :tmi.twitch.tv USERSTATE #chan");
    let state = UserState::from_frame(&frame).unwrap();
    assert_eq!(state.channel, "chan");
    assert!(state.is_mod);
    assert!(state.color.is_none());
  }
}
