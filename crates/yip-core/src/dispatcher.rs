use std::sync::Arc;

use crate::{
    auth::CredentialGate,
    callback::CallbackToken,
    domain::{ChatId, UserId},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, ReplyKeyboard, Selection},
    },
    workflow::{DeviceWorkflow, Reply, NO_USABLE_DEVICES},
};

pub const GREETING: &str = "Hello!\nUse: \n\n/login PASSWORD\n\nto authenticate before using it";
pub const INVALID_COMMAND: &str = "Invalid command";

pub const BTN_REAUTH_ROUTER: &str = "🔐 Reauth Router";
pub const BTN_BLACKLIST_MAC: &str = "👎 Deny MAC";
pub const BTN_WHITELIST_MAC: &str = "👍 Allow MAC";
pub const BTN_CLEAR_BLACKLIST: &str = "🧹 Clear Blacklist";

/// Every command the bot understands, resolved from a command name or a
/// main-keyboard button label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    Start,
    Login,
    ReauthRouter,
    BlacklistMac,
    WhitelistMac,
    ClearBlacklist,
}

impl MenuCommand {
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "start" | "help" => Some(Self::Start),
            "login" => Some(Self::Login),
            "reauth" => Some(Self::ReauthRouter),
            "block" => Some(Self::BlacklistMac),
            "unblock" => Some(Self::WhitelistMac),
            "clear" => Some(Self::ClearBlacklist),
            _ => None,
        }
    }

    pub fn from_button(label: &str) -> Option<Self> {
        match label.trim() {
            BTN_REAUTH_ROUTER => Some(Self::ReauthRouter),
            BTN_BLACKLIST_MAC => Some(Self::BlacklistMac),
            BTN_WHITELIST_MAC => Some(Self::WhitelistMac),
            BTN_CLEAR_BLACKLIST => Some(Self::ClearBlacklist),
            _ => None,
        }
    }

    /// Greeting and login are reachable without authenticating.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Self::Start | Self::Login)
    }
}

pub fn main_keyboard() -> ReplyKeyboard {
    ReplyKeyboard::new(vec![
        vec![BTN_REAUTH_ROUTER.to_string()],
        vec![BTN_BLACKLIST_MAC.to_string(), BTN_WHITELIST_MAC.to_string()],
        vec![BTN_CLEAR_BLACKLIST.to_string()],
    ])
}

fn greeting() -> Reply {
    Reply::Keyboard {
        text: GREETING.to_string(),
        keyboard: main_keyboard(),
    }
}

/// Routes inbound updates to handlers and sends exactly one reply per update.
///
/// Safe to share across concurrently running updates; all mutable state lives
/// behind the gate's and the name cache's locks.
pub struct Dispatcher {
    gate: Arc<CredentialGate>,
    workflow: DeviceWorkflow,
    messenger: Arc<dyn MessagingPort>,
}

impl Dispatcher {
    pub fn new(
        gate: Arc<CredentialGate>,
        workflow: DeviceWorkflow,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            gate,
            workflow,
            messenger,
        }
    }

    pub async fn handle(&self, update: IncomingUpdate) {
        tracing::debug!(
            chat_id = update.chat_id().0,
            user_id = update.user_id().0,
            "handling update"
        );
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Selection(sel) => self.handle_selection(sel).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    async fn handle_command(&self, cmd: Command) {
        let Command {
            chat_id,
            user_id,
            name,
            args,
        } = cmd;

        let Some(command) = MenuCommand::from_command(&name) else {
            self.send(chat_id, Reply::text(format!("Unknown command: /{name}")))
                .await;
            return;
        };

        let reply = self.run(command, user_id, &args).await;
        self.send(chat_id, reply).await;
    }

    async fn handle_selection(&self, sel: Selection) {
        let reply = match MenuCommand::from_button(&sel.text) {
            Some(command) => self.run(command, sel.user_id, "").await,
            None => greeting(),
        };
        self.send(sel.chat_id, reply).await;
    }

    async fn handle_callback(&self, q: CallbackQuery) {
        // Acknowledge up front so the client never keeps a spinner.
        if let Err(e) = self.messenger.answer_callback_query(&q.callback_id, None).await {
            tracing::warn!(callback_id = %q.callback_id, error = %e, "failed to answer callback");
        }

        if let Some(denied) = self.gate.require_authenticated(q.user_id).await.denial_message() {
            self.send(q.chat_id, Reply::text(denied)).await;
            return;
        }

        let reply = match CallbackToken::parse(&q.data) {
            Ok(token) => self.workflow.execute(&token).await,
            Err(e) => {
                tracing::warn!(user_id = q.user_id.0, error = %e, "rejected callback payload");
                Reply::text(INVALID_COMMAND)
            }
        };
        self.send(q.chat_id, reply).await;
    }

    async fn run(&self, command: MenuCommand, user_id: UserId, args: &str) -> Reply {
        if command.requires_auth() {
            if let Some(denied) = self.gate.require_authenticated(user_id).await.denial_message() {
                tracing::info!(user_id = user_id.0, ?command, "rejected unauthenticated command");
                return Reply::text(denied);
            }
        }

        match command {
            MenuCommand::Start => greeting(),
            MenuCommand::Login => Reply::text(self.gate.login(user_id, args).await),
            MenuCommand::ReauthRouter => self.workflow.reauthenticate_router().await,
            MenuCommand::BlacklistMac => self.workflow.render_blacklist().await,
            MenuCommand::WhitelistMac => self.workflow.render_whitelist().await,
            MenuCommand::ClearBlacklist => self.workflow.clear_blacklist().await,
        }
    }

    async fn send(&self, chat_id: ChatId, reply: Reply) {
        let res = match self.fit_to_messenger(reply) {
            Reply::Keyboard { text, keyboard } => {
                self.messenger
                    .send_reply_keyboard(chat_id, &text, keyboard)
                    .await
            }
            Reply::Text(text) => self.messenger.send_text(chat_id, &text).await,
            Reply::Menu { text, keyboard } => {
                self.messenger
                    .send_inline_keyboard(chat_id, &text, keyboard)
                    .await
            }
        };
        if let Err(e) = res {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
        }
    }

    /// Downgrade a reply to what the messenger can deliver.
    fn fit_to_messenger(&self, reply: Reply) -> Reply {
        let caps = self.messenger.capabilities();
        match reply {
            Reply::Keyboard { text, .. } if !caps.supports_reply_keyboards => Reply::Text(text),
            Reply::Menu { text, mut keyboard } => {
                keyboard.buttons.retain(|b| {
                    let fits = b.callback_data.len() <= caps.max_callback_data_len;
                    if !fits {
                        tracing::warn!(label = %b.label, "callback data too long; dropping button");
                    }
                    fits
                });
                if keyboard.is_empty() {
                    return Reply::text(NO_USABLE_DEVICES);
                }
                if !caps.supports_inline_keyboards {
                    let labels: Vec<String> =
                        keyboard.buttons.into_iter().map(|b| b.label).collect();
                    return Reply::Text(format!("{text}\n{}", labels.join("\n")));
                }
                Reply::Menu { text, keyboard }
            }
            other => other,
        }
    }
}
