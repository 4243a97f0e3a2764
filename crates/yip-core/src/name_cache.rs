use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::MacAddress;

/// Last known display name per MAC address.
///
/// The router's "filtered devices" listing usually lacks names, so names seen
/// while a device was still allowed are kept here and reused later.
#[derive(Default)]
pub struct NameCache {
    names: Mutex<HashMap<String, String>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `name` for `mac`. Empty names never overwrite a cached one.
    pub async fn remember(&self, mac: &str, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        self.names
            .lock()
            .await
            .insert(MacAddress::normalize_key(mac), name.to_string());
    }

    /// Cached name for `mac`, or an empty string.
    pub async fn lookup(&self, mac: &str) -> String {
        self.names
            .lock()
            .await
            .get(&MacAddress::normalize_key(mac))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.names.lock().await.len()
    }
}
