#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use hwkey_yubi::errors::VaultError;
use hwkey_yubi::vault::{KeyIdentifier, RawKeyRecord, Vault, VaultConfig, VaultSession};

static LOGGER: OnceLock<()> = OnceLock::new();

pub fn init() {
    LOGGER.get_or_init(|| {
        SimpleLogger::new()
            .with_level(LevelFilter::Info)
            .with_module_level("hwkey_yubi", LevelFilter::Trace)
            .init().unwrap();
    });
    log::debug!("-------------------------------------------------------")
}

pub fn config() -> VaultConfig {
    VaultConfig::new("127.0.0.1:12345", "password")
}

/// Public key of a secret as the vault stores it, i.e. `X || Y`
pub fn vault_key_of(secret: &SecretKey) -> Vec<u8> {
    let pk = PublicKey::from_secret_key(&Secp256k1::new(), secret);
    pk.serialize_uncompressed()[1..].to_vec()
}

/// In-memory vault with a set of stored keys
#[derive(Default)]
pub struct MemoryVault {
    keys: HashMap<KeyIdentifier, RawKeyRecord>,
    pub offline: bool,
    pub sessions: Arc<AtomicUsize>,
    pub fetches: Arc<AtomicUsize>,
}

impl MemoryVault {
    pub fn new() -> Self {
        MemoryVault::default()
    }

    pub fn store(&mut self, key_id: &str, algorithm: u8, key: &[u8]) {
        let key_id = KeyIdentifier::new(key_id).unwrap();
        let record = RawKeyRecord::from_parts(key_id.clone(), algorithm, 1, key).unwrap();
        self.keys.insert(key_id, record);
    }

    /// Count of sessions currently open
    pub fn open_sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

impl Vault for MemoryVault {
    type Session = MemorySession;

    fn connect(&self, config: &VaultConfig) -> Result<MemorySession, VaultError> {
        if self.offline {
            return Err(VaultError::Unavailable);
        }
        config.validate()?;
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession {
            keys: self.keys.clone(),
            sessions: self.sessions.clone(),
            fetches: self.fetches.clone(),
            open: true,
        })
    }
}

pub struct MemorySession {
    keys: HashMap<KeyIdentifier, RawKeyRecord>,
    sessions: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
    open: bool,
}

impl VaultSession for MemorySession {
    fn fetch_key(&self, key_id: &KeyIdentifier) -> Result<RawKeyRecord, VaultError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.open {
            return Err(VaultError::SessionExpired);
        }
        self.keys.get(key_id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(key_id.to_string()))
    }

    fn close(&mut self) -> Result<(), VaultError> {
        if self.open {
            self.open = false;
            self.sessions.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
