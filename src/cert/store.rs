use std::collections::HashMap;

use crate::model::cert::CertPair;

/// A loaded merchant identity and the HTTP client presenting it.
#[derive(Clone)]
pub struct ClientIdentity {
    pub cert_pair: CertPair,
    pub serial_no: String,
    pub http: reqwest::Client,
}

/// Read-mostly cache of loaded identities keyed by their file paths.
pub struct InMemoryIdentityStore {
    identities: HashMap<CertPair, ClientIdentity>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            identities: HashMap::new(),
        }
    }

    pub fn get(&self, pair: &CertPair) -> Option<&ClientIdentity> {
        self.identities.get(pair)
    }

    pub fn insert(&mut self, identity: ClientIdentity) {
        self.identities
            .insert(identity.cert_pair.clone(), identity);
    }

    pub fn remove(&mut self, pair: &CertPair) -> Option<ClientIdentity> {
        self.identities.remove(pair)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}
