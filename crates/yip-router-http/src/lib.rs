//! Router backend adapter over a small JSON HTTP bridge.
//!
//! Endpoints (relative to the configured base URL):
//! - `POST   /token/refresh`
//! - `GET    /devices`        allowed devices
//! - `GET    /filters`        denied devices
//! - `POST   /filters/{mac}`  deny
//! - `DELETE /filters/{mac}`  allow
//! - `DELETE /filters`        allow everything

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use yip_core::{
    config::Config,
    domain::{Device, FilterState, MacAddress},
    errors::Error,
    ports::RouterPort,
    Result,
};

#[derive(Debug, Deserialize)]
struct DeviceDto {
    mac_address: String,
    #[serde(default)]
    name: Option<String>,
}

impl DeviceDto {
    fn into_device(self, state: FilterState) -> Device {
        Device {
            mac: self.mac_address,
            name: self.name.unwrap_or_default(),
            state,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpRouter {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl HttpRouter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("router http client build failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.router_url.clone(),
            cfg.router_api_key.clone(),
            cfg.router_timeout,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let req = match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        };

        let resp = req
            .send()
            .await
            .map_err(|e| Error::External(format!("router {what} request error: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body = body.chars().take(200).collect::<String>();
            return Err(Error::External(format!(
                "router {what} failed: HTTP {status}: {body}"
            )));
        }
        Ok(resp)
    }

    async fn fetch_devices(&self, path: &str, state: FilterState) -> Result<Vec<Device>> {
        let resp = self.send(self.http.get(self.url(path)), path).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("router {path} read error: {e}")))?;
        parse_devices(&body, state)
    }
}

fn parse_devices(body: &str, state: FilterState) -> Result<Vec<Device>> {
    let dtos: Vec<DeviceDto> = serde_json::from_str(body)?;
    Ok(dtos.into_iter().map(|d| d.into_device(state)).collect())
}

#[async_trait]
impl RouterPort for HttpRouter {
    async fn refresh_token(&self) -> Result<()> {
        self.send(self.http.post(self.url("/token/refresh")), "refresh_token")
            .await?;
        tracing::info!("router token refreshed");
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.fetch_devices("/devices", FilterState::Allowed).await
    }

    async fn get_filtered_devices(&self) -> Result<Vec<Device>> {
        self.fetch_devices("/filters", FilterState::Denied).await
    }

    async fn filter_device_by_mac(&self, mac: &MacAddress) -> Result<()> {
        let url = self.url(&format!("/filters/{mac}"));
        self.send(self.http.post(url), "filter").await?;
        Ok(())
    }

    async fn unfilter_device_by_mac(&self, mac: &MacAddress) -> Result<()> {
        let url = self.url(&format!("/filters/{mac}"));
        self.send(self.http.delete(url), "unfilter").await?;
        Ok(())
    }

    async fn clear_mac_filters(&self) -> Result<()> {
        self.send(self.http.delete(self.url("/filters")), "clear_filters")
            .await?;
        Ok(())
    }
}
