//! `USERNOTICE` -- the chat-layer carrier for subscriptions, gifts, raids
//! and other status broadcasts that aren't tied to a user-typed message.

use super::{msg_params, non_empty, FromFrame};
use crate::irc::{parse_badges, parse_timestamp, user_from_prefix, EmoteSpan, Frame};
use crate::irc::parse_emotes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A Twitch-specific event broadcast to a channel's chat.
///
/// [`UserNotice::msg_type`] is the raw `msg-id` tag (`sub`, `resub`,
/// `subgift`, `anonsubgift`, `submysterygift`, `raid`, or anything else
/// Twitch adds later); [`UserNotice::msg_params`] carries every
/// `msg-param-*` tag with that prefix stripped, so new event kinds need no
/// changes here to be usable.
#[derive(Clone, Debug)]
pub struct UserNotice {
  pub msg_type: String,
  pub channel: String,
  pub user_login: String,
  pub user_id: String,
  pub display_name: String,
  pub message: Option<String>,
  pub system_message: String,
  pub msg_params: HashMap<String, String>,
  pub badges: HashMap<String, String>,
  pub color: Option<String>,
  pub emotes: Vec<EmoteSpan>,
  pub timestamp: DateTime<Utc>,
}

impl UserNotice {
  pub fn is_sub(&self) -> bool {
    self.msg_type == "sub"
  }

  pub fn is_resub(&self) -> bool {
    self.msg_type == "resub"
  }

  pub fn is_subgift(&self) -> bool {
    matches!(self.msg_type.as_str(), "subgift" | "anonsubgift" | "submysterygift")
  }

  pub fn is_raid(&self) -> bool {
    self.msg_type == "raid"
  }
}

impl FromFrame for UserNotice {
  fn from_frame(frame: &Frame) -> Option<Self> {
    if frame.command != "USERNOTICE" {
      return None;
    }

    Some(UserNotice {
      msg_type: frame.tag("msg-id").unwrap_or_default().to_string(),
      channel: frame.channel()?,
      user_login: frame
        .tag("login")
        .map(str::to_string)
        .or_else(|| frame.prefix.as_deref().map(|p| user_from_prefix(p).to_string()))
        .unwrap_or_default(),
      user_id: frame.tag("user-id").unwrap_or_default().to_string(),
      display_name: frame.tag("display-name").unwrap_or_default().to_string(),
      message: frame.trailing.clone().filter(|s| !s.is_empty()),
      system_message: frame.tag("system-msg").unwrap_or_default().to_string(),
      msg_params: msg_params(frame),
      badges: frame.tag("badges").map(parse_badges).unwrap_or_default(),
      color: non_empty(frame.tag("color")),
      emotes: frame.tag("emotes").map(parse_emotes).unwrap_or_default(),
      timestamp: frame.tag("tmi-sent-ts").map(parse_timestamp).unwrap_or_else(Utc::now),
    })
  }
}
