use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// MAC address in canonical form (`AA:BB:CC:DD:EE:FF`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

fn mac_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(([0-9A-F]{2}:){5}|([0-9A-F]{2}-){5})[0-9A-F]{2}$").expect("valid mac regex")
    })
}

impl MacAddress {
    /// Parse a MAC written with `:` or `-` separators, in any case.
    pub fn parse(raw: &str) -> Result<Self> {
        let upper = Self::normalize_key(raw);
        if !mac_pattern().is_match(&upper) {
            return Err(Error::InvalidMac(raw.to_string()));
        }
        Ok(Self(upper.replace('-', ":")))
    }

    /// Lookup key used for caching; idempotent and case-insensitive.
    pub fn normalize_key(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

/// Which router listing a device came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterState {
    Allowed,
    Denied,
}

/// A device as reported by the router.
///
/// `mac` is kept verbatim so labels show what the router returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    pub mac: String,
    pub name: String,
    pub state: FilterState,
}

impl Device {
    pub fn allowed(mac: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            name: name.into(),
            state: FilterState::Allowed,
        }
    }

    pub fn denied(mac: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            name: name.into(),
            state: FilterState::Denied,
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.mac, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_parse_canonicalizes() {
        let mac = MacAddress::parse(" aa-bb-cc-dd-ee-0f ").unwrap();
        assert_eq!(mac.as_str(), "AA:BB:CC:DD:EE:0F");
        assert_eq!(MacAddress::parse(mac.as_str()).unwrap(), mac);
    }

    #[test]
    fn mac_parse_rejects_garbage() {
        for bad in ["", "AA:BB:CC:DD:EE", "AA:BB:CC:DD:EE:GG", "AA:BB-CC:DD:EE:FF", "block"] {
            assert!(MacAddress::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn normalize_key_is_idempotent() {
        let once = MacAddress::normalize_key("aa:bb:cc:dd:ee:ff");
        assert_eq!(once, "AA:BB:CC:DD:EE:FF");
        assert_eq!(MacAddress::normalize_key(&once), once);
    }

    #[test]
    fn label_shows_mac_and_name() {
        assert_eq!(
            Device::allowed("11:22:33:44:55:66", "phone").label(),
            "11:22:33:44:55:66 (phone)"
        );
    }
}
