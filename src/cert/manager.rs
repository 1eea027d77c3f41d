use std::path::Path;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};
use x509_cert::der::DecodePem;

use crate::cert::store::{ClientIdentity, InMemoryIdentityStore};
use crate::error::WxPayError;
use crate::model::cert::CertPair;

/// Hands out HTTP clients that authenticate with a merchant certificate.
///
/// Certificate files are read the first time a pair is used; the resulting
/// client is shared by later calls with the same pair.
pub struct ClientCertManager {
    store: RwLock<InMemoryIdentityStore>,
    timeout: Duration,
}

impl ClientCertManager {
    pub fn new(timeout: Duration) -> Self {
        Self {
            store: RwLock::new(InMemoryIdentityStore::new()),
            timeout,
        }
    }

    pub async fn client_for(&self, pair: &CertPair) -> Result<reqwest::Client, WxPayError> {
        if let Some(identity) = self.store.read().await.get(pair) {
            return Ok(identity.http.clone());
        }

        // Load outside the lock; a concurrent load of the same pair just
        // replaces an equivalent entry.
        let identity = load_identity(pair, self.timeout).await?;
        let http = identity.http.clone();
        self.store.write().await.insert(identity);
        Ok(http)
    }

    /// Drop a cached identity, e.g. after the certificate was rotated on disk.
    pub async fn evict(&self, pair: &CertPair) -> bool {
        self.store.write().await.remove(pair).is_some()
    }

    pub async fn cached(&self) -> usize {
        self.store.read().await.len()
    }
}

async fn load_identity(pair: &CertPair, timeout: Duration) -> Result<ClientIdentity, WxPayError> {
    debug!(cert = %pair.cert_path.display(), "loading merchant client certificate");
    let cert_pem = read_pem(&pair.cert_path).await?;
    let key_pem = read_pem(&pair.key_path).await?;

    let serial_no = certificate_serial(&cert_pem)?;

    let identity = reqwest::Identity::from_pkcs8_pem(&cert_pem, &key_pem)
        .map_err(|e| WxPayError::CertError(format!("build client identity: {e}")))?;
    let http = reqwest::Client::builder()
        .identity(identity)
        .timeout(timeout)
        .build()
        .map_err(|e| WxPayError::CertError(format!("build TLS client: {e}")))?;

    info!(serial_no, "merchant client certificate loaded");
    Ok(ClientIdentity {
        cert_pair: pair.clone(),
        serial_no,
        http,
    })
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, WxPayError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| WxPayError::CertError(format!("read {}: {e}", path.display())))
}

/// Parse the certificate PEM and return its serial number as uppercase hex.
fn certificate_serial(cert_pem: &[u8]) -> Result<String, WxPayError> {
    let cert = x509_cert::Certificate::from_pem(cert_pem)
        .map_err(|e| WxPayError::CertError(format!("parse X.509 certificate: {e}")))?;

    Ok(cert
        .tbs_certificate
        .serial_number
        .as_bytes()
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect())
}
