//! Inline-button payloads.
//!
//! A token is encoded as a two-element JSON array, e.g.
//! `["block","11:22:33:44:55:66"]`, which stays under Telegram's 64-byte
//! `callback_data` limit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{domain::MacAddress, errors::Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Block,
    Unblock,
}

impl Action {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().trim_start_matches('/') {
            "block" => Ok(Action::Block),
            "unblock" => Ok(Action::Unblock),
            other => Err(Error::Protocol(format!("unknown callback action: {other}"))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Block => f.write_str("block"),
            Action::Unblock => f.write_str("unblock"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackToken(pub Action, pub MacAddress);

impl CallbackToken {
    pub fn new(action: Action, mac: MacAddress) -> Self {
        Self(action, mac)
    }

    pub fn action(&self) -> Action {
        self.0
    }

    pub fn mac(&self) -> &MacAddress {
        &self.1
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(data: &str) -> Result<Self> {
        serde_json::from_str(data.trim())
            .map_err(|e| Error::Protocol(format!("invalid callback payload: {e}")))
    }

    /// Decode raw callback data: the JSON array form, or the positional
    /// `action|mac` form (optionally prefixed with `\f`).
    pub fn parse(data: &str) -> Result<Self> {
        let data = data.trim_start_matches('\u{c}').trim();
        if data.starts_with('[') {
            return Self::decode(data);
        }
        let args: Vec<String> = data.split('|').map(str::to_string).collect();
        Self::from_args(&args)
    }

    /// Decode from positional arguments `[action, mac]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let [action, mac] = args else {
            return Err(Error::Protocol(format!(
                "expected 2 callback arguments, got {}",
                args.len()
            )));
        };
        let action = Action::parse(action)?;
        let mac = MacAddress::parse(mac).map_err(|e| Error::Protocol(e.to_string()))?;
        Ok(Self(action, mac))
    }
}
