//! Fakes shared by the core test modules.

use std::sync::{
    atomic::{AtomicBool, AtomicI32, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, Device, MacAddress, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities, ReplyKeyboard},
    },
    ports::RouterPort,
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouterCall {
    RefreshToken,
    ListDevices,
    GetFilteredDevices,
    Filter(MacAddress),
    Unfilter(MacAddress),
    ClearMacFilters,
}

#[derive(Default)]
pub struct FakeRouter {
    allowed: Mutex<Vec<Device>>,
    denied: Mutex<Vec<Device>>,
    failing: AtomicBool,
    calls: Mutex<Vec<RouterCall>>,
}

impl FakeRouter {
    pub fn set_allowed(&self, devices: Vec<Device>) {
        *self.allowed.lock().unwrap() = devices;
    }

    pub fn set_denied(&self, devices: Vec<Device>) {
        *self.denied.lock().unwrap() = devices;
    }

    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RouterCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RouterCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::External("router unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RouterPort for FakeRouter {
    async fn refresh_token(&self) -> Result<()> {
        self.record(RouterCall::RefreshToken)
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.record(RouterCall::ListDevices)?;
        Ok(self.allowed.lock().unwrap().clone())
    }

    async fn get_filtered_devices(&self) -> Result<Vec<Device>> {
        self.record(RouterCall::GetFilteredDevices)?;
        Ok(self.denied.lock().unwrap().clone())
    }

    async fn filter_device_by_mac(&self, mac: &MacAddress) -> Result<()> {
        self.record(RouterCall::Filter(mac.clone()))
    }

    async fn unfilter_device_by_mac(&self, mac: &MacAddress) -> Result<()> {
        self.record(RouterCall::Unfilter(mac.clone()))
    }

    async fn clear_mac_filters(&self) -> Result<()> {
        self.record(RouterCall::ClearMacFilters)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text(ChatId, String),
    ReplyKeyboard(ChatId, String, ReplyKeyboard),
    InlineKeyboard(ChatId, String, InlineKeyboard),
    Ack(String),
}

pub struct FakeMessenger {
    caps: MessagingCapabilities,
    next_id: AtomicI32,
    sent: Mutex<Vec<Sent>>,
}

impl Default for FakeMessenger {
    fn default() -> Self {
        Self::with_capabilities(MessagingCapabilities {
            supports_inline_keyboards: true,
            supports_reply_keyboards: true,
            max_callback_data_len: 64,
        })
    }
}

impl FakeMessenger {
    pub fn with_capabilities(caps: MessagingCapabilities) -> Self {
        Self {
            caps,
            next_id: AtomicI32::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn acks(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Ack(_)))
            .count()
    }

    /// Texts of every outbound message (acks excluded).
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(_, t) | Sent::ReplyKeyboard(_, t, _) | Sent::InlineKeyboard(_, t, _) => {
                    Some(t)
                }
                Sent::Ack(_) => None,
            })
            .collect()
    }

    fn push(&self, chat_id: ChatId, sent: Sent) -> MessageRef {
        self.sent.lock().unwrap().push(sent);
        MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        }
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        self.caps
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        Ok(self.push(chat_id, Sent::Text(chat_id, text.to_string())))
    }

    async fn send_reply_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: ReplyKeyboard,
    ) -> Result<MessageRef> {
        Ok(self.push(
            chat_id,
            Sent::ReplyKeyboard(chat_id, text.to_string(), keyboard),
        ))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        Ok(self.push(
            chat_id,
            Sent::InlineKeyboard(chat_id, text.to_string(), keyboard),
        ))
    }

    async fn answer_callback_query(&self, callback_id: &str, _text: Option<&str>) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Ack(callback_id.to_string()));
        Ok(())
    }
}
