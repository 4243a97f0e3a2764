//! Telegram update -> core `IncomingUpdate` conversion.

use teloxide::types::{CallbackQuery, Message};

use yip_core::{
    domain::{ChatId, UserId},
    messaging::types::{self, Command, IncomingUpdate, Selection},
};

pub fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

/// Classify a text message: `/command` or a keyboard selection.
pub fn from_text(chat_id: ChatId, user_id: UserId, text: &str) -> IncomingUpdate {
    if text.trim_start().starts_with('/') {
        let (name, args) = parse_command(text);
        return IncomingUpdate::Command(Command {
            chat_id,
            user_id,
            name,
            args,
        });
    }

    IncomingUpdate::Selection(Selection {
        chat_id,
        user_id,
        text: text.to_string(),
    })
}

/// `None` for messages the bot does not react to (stickers, service messages, ...).
pub fn from_message(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;
    Some(from_text(
        ChatId(msg.chat.id.0),
        UserId(user.id.0 as i64),
        text,
    ))
}

pub fn from_callback(q: &CallbackQuery) -> IncomingUpdate {
    let user_id = UserId(q.from.id.0 as i64);
    // Without the originating message we can only answer in the private chat.
    let chat_id = q
        .message
        .as_ref()
        .map(|m| ChatId(m.chat.id.0))
        .unwrap_or(ChatId(user_id.0));

    IncomingUpdate::Callback(types::CallbackQuery {
        chat_id,
        user_id,
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_bot_suffix_and_args() {
        assert_eq!(
            parse_command("/Login@yip_bot  hunter2 "),
            ("login".to_string(), "hunter2".to_string())
        );
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
    }

    #[test]
    fn plain_text_becomes_selection() {
        match from_text(ChatId(1), UserId(2), "👎 Deny MAC") {
            IncomingUpdate::Selection(s) => assert_eq!(s.text, "👎 Deny MAC"),
            other => panic!("expected selection, got {other:?}"),
        }
        match from_text(ChatId(1), UserId(2), "/login pw") {
            IncomingUpdate::Command(c) => {
                assert_eq!(c.name, "login");
                assert_eq!(c.args, "pw");
            }
            other => panic!("expected command, got {other:?}"),
        }
    }
}
