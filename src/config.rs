use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::WxPayError;

const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Supplies the paying user's network address when the caller omits it,
/// typically from the request context of an enclosing web framework.
pub trait ClientIpProvider: Send + Sync {
    fn client_ip(&self) -> Option<String>;
}

impl<F> ClientIpProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn client_ip(&self) -> Option<String> {
        self()
    }
}

pub struct ClientConfig {
    pub app_id: String,
    pub mch_id: String,
    /// API key used only as signing material; never transmitted.
    pub mch_key: String,
    pub notify_url: String,
    pub timeout: Duration,
    pub base_url: String,
    pub http_client: Option<reqwest::Client>,
    pub client_ip_provider: Option<Arc<dyn ClientIpProvider>>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("mch_key", &"<redacted>")
            .field("notify_url", &self.notify_url)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .field("client_ip_provider", &self.client_ip_provider.is_some())
            .finish()
    }
}

pub struct ClientConfigBuilder {
    app_id: Option<String>,
    mch_id: Option<String>,
    mch_key: Option<String>,
    notify_url: Option<String>,
    timeout: Option<Duration>,
    base_url: Option<String>,
    http_client: Option<reqwest::Client>,
    client_ip_provider: Option<Arc<dyn ClientIpProvider>>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            app_id: None,
            mch_id: None,
            mch_key: None,
            notify_url: None,
            timeout: None,
            base_url: None,
            http_client: None,
            client_ip_provider: None,
        }
    }
}

impl ClientConfigBuilder {
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn mch_id(mut self, mch_id: impl Into<String>) -> Self {
        self.mch_id = Some(mch_id.into());
        self
    }

    pub fn mch_key(mut self, mch_key: impl Into<String>) -> Self {
        self.mch_key = Some(mch_key.into());
        self
    }

    pub fn notify_url(mut self, notify_url: impl Into<String>) -> Self {
        self.notify_url = Some(notify_url.into());
        self
    }

    /// Per-request timeout for both transports. Defaults to 20 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// HTTP client for the plain transport. Client-certificate calls always
    /// build their own client around the merchant identity.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn client_ip_provider(mut self, provider: impl ClientIpProvider + 'static) -> Self {
        self.client_ip_provider = Some(Arc::new(provider));
        self
    }

    pub fn build(self) -> Result<ClientConfig, WxPayError> {
        let app_id = self
            .app_id
            .ok_or_else(|| WxPayError::Config("app_id is required".into()))?;
        let mch_id = self
            .mch_id
            .ok_or_else(|| WxPayError::Config("mch_id is required".into()))?;
        let mch_key = self
            .mch_key
            .ok_or_else(|| WxPayError::Config("mch_key is required".into()))?;
        let notify_url = self
            .notify_url
            .ok_or_else(|| WxPayError::Config("notify_url is required".into()))?;

        if mch_key.len() != 32 {
            return Err(WxPayError::Config(format!(
                "mch_key must be 32 bytes, got {}",
                mch_key.len()
            )));
        }

        Ok(ClientConfig {
            app_id,
            mch_id,
            mch_key,
            notify_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            http_client: self.http_client,
            client_ip_provider: self.client_ip_provider,
        })
    }
}
