use crate::domain::{ChatId, UserId};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Selection(Selection),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Command(c) => c.chat_id,
            IncomingUpdate::Selection(s) => s.chat_id,
            IncomingUpdate::Callback(q) => q.chat_id,
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            IncomingUpdate::Command(c) => c.user_id,
            IncomingUpdate::Selection(s) => s.user_id,
            IncomingUpdate::Callback(q) => q.user_id,
        }
    }
}

/// A typed `/command args` message.
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub name: String,
    pub args: String,
}

/// Plain text, usually a reply-keyboard button label.
#[derive(Clone, Debug)]
pub struct Selection {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub callback_id: String,
    pub data: String,
}

/// Inline keyboard (one button per row) whose presses come back as callbacks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}

/// Persistent keyboard whose presses come back as plain text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_inline_keyboards: bool,
    pub supports_reply_keyboards: bool,
    /// Longest `callback_data` the messenger accepts, in bytes.
    pub max_callback_data_len: usize,
}
