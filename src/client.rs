use bytes::Bytes;
use tracing::{debug, warn};

use crate::cert::manager::ClientCertManager;
use crate::config::ClientConfig;
use crate::crypto::sign::sign_md5;
use crate::crypto::verify::verify_md5;
use crate::error::WxPayError;
use crate::fields::FieldMap;
use crate::model::cert::CertPair;
use crate::xml;

/// A response body from the plain transport: decoded fields when the body
/// is a well-formed envelope, the raw bytes otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Fields(FieldMap),
    Raw(Bytes),
}

pub struct WxPayClient {
    pub(crate) config: ClientConfig,
    pub(crate) http: reqwest::Client,
    pub(crate) cert_manager: ClientCertManager,
}

impl WxPayClient {
    /// Create a new client bound to one merchant configuration.
    pub fn new(config: ClientConfig) -> Result<Self, WxPayError> {
        let http = match config.http_client.clone() {
            Some(http) => http,
            None => reqwest::Client::builder().build()?,
        };
        let cert_manager = ClientCertManager::new(config.timeout);
        Ok(Self {
            config,
            http,
            cert_manager,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn mch_id(&self) -> &str {
        &self.config.mch_id
    }

    pub fn notify_url(&self) -> &str {
        &self.config.notify_url
    }

    /// Sign a mapping with the merchant key. Any `sign` field is ignored.
    pub fn sign(&self, fields: &FieldMap) -> String {
        sign_md5(fields, &self.config.mch_key)
    }

    /// Check the `sign` field of a mapping against the merchant key.
    pub fn verify(&self, fields: &FieldMap) -> Result<bool, WxPayError> {
        verify_md5(fields, &self.config.mch_key)
    }

    /// POST an envelope over plain HTTPS.
    ///
    /// HTTP error statuses are not failures: the gateway puts an envelope in
    /// 4xx/5xx bodies too. A body that does not decode is returned raw.
    pub(crate) async fn post_plain(
        &self,
        path: &str,
        fields: &FieldMap,
    ) -> Result<Envelope, WxPayError> {
        let url = self.endpoint_url(path);
        debug!(%url, "sending plain request");
        let resp = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(xml::encode(fields)?)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            warn!(%url, %status, "gateway answered with HTTP error status");
        }

        match xml::decode(&body) {
            Ok(decoded) => Ok(Envelope::Fields(decoded)),
            Err(e) => {
                debug!(%url, error = %e, len = body.len(), "response is not an XML envelope");
                Ok(Envelope::Raw(body))
            }
        }
    }

    /// POST an envelope over HTTPS authenticated with the merchant certificate.
    ///
    /// These endpoints always answer with an envelope, so a body that does
    /// not decode is `WxPayError::MalformedEnvelope`.
    pub(crate) async fn post_with_client_cert(
        &self,
        path: &str,
        fields: &FieldMap,
        cert: &CertPair,
    ) -> Result<FieldMap, WxPayError> {
        let http = self.cert_manager.client_for(cert).await?;
        let url = self.endpoint_url(path);
        debug!(%url, "sending client-certificate request");
        let resp = http
            .post(&url)
            .timeout(self.config.timeout)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(xml::encode(fields)?)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            warn!(%url, %status, "gateway answered with HTTP error status");
        }
        xml::decode(&body)
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

pub(crate) fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
