use async_trait::async_trait;

use crate::{
    domain::{Device, MacAddress},
    Result,
};

/// Hexagonal port for the router backend.
///
/// Implementations own token handling and transport; the bot core only sees
/// success or an opaque error.
#[async_trait]
pub trait RouterPort: Send + Sync {
    async fn refresh_token(&self) -> Result<()>;

    /// Devices currently allowed on the network.
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// Devices currently denied by the MAC filter.
    async fn get_filtered_devices(&self) -> Result<Vec<Device>>;

    async fn filter_device_by_mac(&self, mac: &MacAddress) -> Result<()>;

    async fn unfilter_device_by_mac(&self, mac: &MacAddress) -> Result<()>;

    async fn clear_mac_filters(&self) -> Result<()>;
}
