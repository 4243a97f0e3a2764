//! Device listing menus and the actions behind their buttons.
//!
//! Render step: ask the router for a device set and turn it into an inline
//! menu whose buttons carry a [`CallbackToken`]. Execute step: apply the
//! decoded token through the router. Router errors are logged and mapped to
//! fixed replies; they never reach the user verbatim.

use std::sync::Arc;

use crate::{
    callback::{Action, CallbackToken},
    domain::{Device, MacAddress},
    messaging::types::{InlineButton, InlineKeyboard, ReplyKeyboard},
    name_cache::NameCache,
    ports::RouterPort,
};

pub const CHOOSE_TO_BLOCK: &str = "Choose the device to block:";
pub const CHOOSE_TO_UNBLOCK: &str = "Choose the device to unblock:";
pub const LIST_FAILED: &str = "Failed to list devices";
pub const BLACKLIST_FAILED: &str = "Failed to show blacklist";
pub const NOTHING_TO_BLOCK: &str = "No devices are connected";
pub const NOTHING_TO_UNBLOCK: &str = "No devices are blocked";
pub const REAUTH_OK: &str = "Router reauthenticated successfully";
pub const REAUTH_FAILED: &str = "Failed to reauthenticate the router";
pub const CLEAR_OK: &str = "All devices are allowed now";
pub const CLEAR_FAILED: &str = "Failed to clear MAC filters";
pub const BLOCK_FAILED: &str = "Failed to block the device";
pub const UNBLOCK_FAILED: &str = "Failed to unblock the device";
pub const NO_USABLE_DEVICES: &str = "No devices with a valid MAC address";

/// What a handler wants sent back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Menu {
        text: String,
        keyboard: InlineKeyboard,
    },
    /// Text that also installs a persistent reply keyboard.
    Keyboard {
        text: String,
        keyboard: ReplyKeyboard,
    },
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }
}

pub struct DeviceWorkflow {
    router: Arc<dyn RouterPort>,
    names: Arc<NameCache>,
}

impl DeviceWorkflow {
    pub fn new(router: Arc<dyn RouterPort>, names: Arc<NameCache>) -> Self {
        Self { router, names }
    }

    /// Menu of allowed devices; picking one blocks it.
    pub async fn render_blacklist(&self) -> Reply {
        let devices = match self.router.list_devices().await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "list_devices failed");
                return Reply::text(LIST_FAILED);
            }
        };

        for d in &devices {
            self.names.remember(&d.mac, &d.name).await;
        }
        let cached_names = self.names.len().await;
        tracing::debug!(
            devices = devices.len(),
            cached_names,
            "allowed devices listed"
        );

        if devices.is_empty() {
            return Reply::text(NOTHING_TO_BLOCK);
        }

        menu(CHOOSE_TO_BLOCK, Action::Block, &devices)
    }

    /// Menu of denied devices; picking one unblocks it.
    pub async fn render_whitelist(&self) -> Reply {
        let mut devices = match self.router.get_filtered_devices().await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "get_filtered_devices failed");
                return Reply::text(BLACKLIST_FAILED);
            }
        };

        if devices.is_empty() {
            return Reply::text(NOTHING_TO_UNBLOCK);
        }

        for d in devices.iter_mut() {
            let cached = self.names.lookup(&d.mac).await;
            if !cached.is_empty() {
                d.name = cached;
            }
        }

        menu(CHOOSE_TO_UNBLOCK, Action::Unblock, &devices)
    }

    /// Apply a decoded button press.
    ///
    /// Repeated delivery of the same token is left to the router: a second
    /// successful call is reported as success again.
    pub async fn execute(&self, token: &CallbackToken) -> Reply {
        let mac = token.mac();
        let result = match token.action() {
            Action::Block => self.router.filter_device_by_mac(mac).await,
            Action::Unblock => self.router.unfilter_device_by_mac(mac).await,
        };

        match (token.action(), result) {
            (Action::Block, Ok(())) => {
                tracing::info!(mac = %mac, "device blocked");
                Reply::text(format!("Device {mac} blocked successfully"))
            }
            (Action::Unblock, Ok(())) => {
                tracing::info!(mac = %mac, "device unblocked");
                Reply::text(format!("Device {mac} unblocked successfully"))
            }
            (action, Err(e)) => {
                tracing::warn!(mac = %mac, %action, error = %e, "router mutation failed");
                Reply::text(match action {
                    Action::Block => BLOCK_FAILED,
                    Action::Unblock => UNBLOCK_FAILED,
                })
            }
        }
    }

    pub async fn reauthenticate_router(&self) -> Reply {
        match self.router.refresh_token().await {
            Ok(()) => Reply::text(REAUTH_OK),
            Err(e) => {
                tracing::warn!(error = %e, "refresh_token failed");
                Reply::text(REAUTH_FAILED)
            }
        }
    }

    pub async fn clear_blacklist(&self) -> Reply {
        match self.router.clear_mac_filters().await {
            Ok(()) => Reply::text(CLEAR_OK),
            Err(e) => {
                tracing::warn!(error = %e, "clear_mac_filters failed");
                Reply::text(CLEAR_FAILED)
            }
        }
    }
}

fn menu(text: &str, action: Action, devices: &[Device]) -> Reply {
    let mut buttons = Vec::with_capacity(devices.len());
    for d in devices {
        let token = match MacAddress::parse(&d.mac).and_then(|mac| {
            let token = CallbackToken::new(action, mac);
            token.encode()
        }) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(mac = %d.mac, error = %e, "skipping device with unusable mac");
                continue;
            }
        };
        buttons.push(InlineButton {
            label: d.label(),
            callback_data: token,
        });
    }

    if buttons.is_empty() {
        return Reply::text(NO_USABLE_DEVICES);
    }

    Reply::Menu {
        text: text.to_string(),
        keyboard: InlineKeyboard::new(buttons),
    }
}
