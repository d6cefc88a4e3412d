//! Callback registry dispatched to by the background reader task.
//!
//! Each event kind has its own optional slot. Registering a new handler
//! replaces whatever was registered before it -- this is a single-listener
//! registry, not a pub/sub bus. The registry is guarded by a
//! [`std::sync::Mutex`]; callbacks are cloned out from under the lock and
//! invoked afterwards so a slow or panicking handler never blocks the
//! reader task from registering new handlers.

use crate::irc::Frame;
use crate::msg::{ChatMessage, ClearChat, ClearMessage, GlobalUserState, Notice, RoomState, UserNotice, UserState, Whisper};
use std::sync::{Arc, Mutex};

pub type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Fired for a confirmed sub, resub, sub-gift (including anonymous and
/// mystery-gift variants) or raid -- a [`UserNotice`] already demultiplexed
/// by [`UserNotice::msg_type`] so callers don't have to match on it
/// themselves.
#[derive(Clone, Debug)]
pub struct RaidEvent {
  pub notice: UserNotice,
  pub from_channel: String,
  pub viewer_count: u64,
}

#[derive(Default)]
pub struct Handlers {
  on_message: Mutex<Option<Handler<ChatMessage>>>,
  on_user_notice: Mutex<Option<Handler<UserNotice>>>,
  on_room_state: Mutex<Option<Handler<RoomState>>>,
  on_notice: Mutex<Option<Handler<Notice>>>,
  on_clear_chat: Mutex<Option<Handler<ClearChat>>>,
  on_clear_message: Mutex<Option<Handler<ClearMessage>>>,
  on_whisper: Mutex<Option<Handler<Whisper>>>,
  on_global_user_state: Mutex<Option<Handler<GlobalUserState>>>,
  on_user_state: Mutex<Option<Handler<UserState>>>,
  on_raw: Mutex<Option<Handler<Frame>>>,
  on_connect: Mutex<Option<Handler<()>>>,
  on_disconnect: Mutex<Option<Handler<()>>>,
  on_reconnect: Mutex<Option<Handler<()>>>,
  on_error: Mutex<Option<Handler<Arc<super::error::ChatError>>>>,
  on_cheer: Mutex<Option<Handler<ChatMessage>>>,
  on_sub: Mutex<Option<Handler<UserNotice>>>,
  on_resub: Mutex<Option<Handler<UserNotice>>>,
  on_subgift: Mutex<Option<Handler<UserNotice>>>,
  on_raid: Mutex<Option<Handler<RaidEvent>>>,
}

macro_rules! slot {
  ($set_name:ident, $fire_name:ident, $field:ident, $ty:ty) => {
    pub fn $set_name(&self, handler: impl Fn($ty) + Send + Sync + 'static) {
      *self.$field.lock().unwrap() = Some(Arc::new(handler));
    }

    pub(crate) fn $fire_name(&self, value: $ty) {
      let handler = self.$field.lock().unwrap().clone();
      if let Some(handler) = handler {
        handler(value);
      }
    }
  };
}

impl Handlers {
  slot!(on_message, fire_message, on_message, ChatMessage);
  slot!(on_user_notice, fire_user_notice, on_user_notice, UserNotice);
  slot!(on_room_state, fire_room_state, on_room_state, RoomState);
  slot!(on_notice, fire_notice, on_notice, Notice);
  slot!(on_clear_chat, fire_clear_chat, on_clear_chat, ClearChat);
  slot!(on_clear_message, fire_clear_message, on_clear_message, ClearMessage);
  slot!(on_whisper, fire_whisper, on_whisper, Whisper);
  slot!(on_global_user_state, fire_global_user_state, on_global_user_state, GlobalUserState);
  slot!(on_user_state, fire_user_state, on_user_state, UserState);
  slot!(on_raw, fire_raw, on_raw, Frame);
  slot!(on_connect, fire_connect, on_connect, ());
  slot!(on_disconnect, fire_disconnect, on_disconnect, ());
  slot!(on_reconnect, fire_reconnect, on_reconnect, ());
  slot!(on_error, fire_error, on_error, Arc<super::error::ChatError>);
  slot!(on_cheer, fire_cheer, on_cheer, ChatMessage);
  slot!(on_sub, fire_sub, on_sub, UserNotice);
  slot!(on_resub, fire_resub, on_resub, UserNotice);
  slot!(on_subgift, fire_subgift, on_subgift, UserNotice);
  slot!(on_raid, fire_raid, on_raid, RaidEvent);
}
