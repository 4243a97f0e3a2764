use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::CallbackQuery};

use yip_core::{
    auth::CredentialGate, config::Config, dispatcher::Dispatcher as CommandDispatcher,
    messaging::port::MessagingPort, name_cache::NameCache, ports::RouterPort,
    workflow::DeviceWorkflow,
};

use crate::{updates, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<CommandDispatcher>,
}

impl AppState {
    pub fn new(
        cfg: &Config,
        router: Arc<dyn RouterPort>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let gate = Arc::new(CredentialGate::new(cfg.telegram_password.clone()));
        let names = Arc::new(NameCache::new());
        let workflow = DeviceWorkflow::new(router, names);
        Self {
            dispatcher: Arc::new(CommandDispatcher::new(gate, workflow, messenger)),
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>, router: Arc<dyn RouterPort>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "bot started"),
        Err(e) => tracing::warn!(error = %e, "get_me failed"),
    }
    tracing::info!(router = %cfg.router_url, "using router bridge");

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState::new(&cfg, router, messenger));

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(Update::filter_message().endpoint(handle_message));

    // Updates are dispatched concurrently; the core keeps its own locks.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    state.dispatcher.handle(updates::from_callback(&q)).await;
    Ok(())
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(update) = updates::from_message(&msg) {
        state.dispatcher.handle(update).await;
    }
    Ok(())
}
