/*
Copyright 2025 EmeraldPay

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/
use std::{env, fmt};
use std::time::Duration;
use crate::errors::VaultError;

pub const ENV_CONNECTOR: &str = "YUBIHSM_CONNECTOR";
pub const ENV_PASSWORD: &str = "YUBIHSM_PASSWORD";
pub const ENV_AUTH_KEY_ID: &str = "YUBIHSM_AUTH_KEY_ID";
pub const ENV_DOMAINS: &str = "YUBIHSM_DOMAINS";
pub const ENV_TIMEOUT_MS: &str = "YUBIHSM_TIMEOUT_MS";

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:12345";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Parameters of a session to the vault
#[derive(Clone, PartialEq, Eq)]
pub struct VaultConfig {
    address: String,
    password: String,
    auth_key_id: u16,
    key_import_domains: u16,
    timeout: Duration,
}

impl VaultConfig {

    /// Config with the default auth key (1), the first domain only and the default timeout
    pub fn new<A: Into<String>, P: Into<String>>(address: A, password: P) -> VaultConfig {
        VaultConfig {
            address: address.into(),
            password: password.into(),
            auth_key_id: 1,
            key_import_domains: 1,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_auth_key_id(self, auth_key_id: u16) -> VaultConfig {
        VaultConfig { auth_key_id, ..self }
    }

    pub fn with_key_import_domains(self, key_import_domains: u16) -> VaultConfig {
        VaultConfig { key_import_domains, ..self }
    }

    pub fn with_timeout(self, timeout: Duration) -> VaultConfig {
        VaultConfig { timeout, ..self }
    }

    ///
    /// Create from environment variables. `YUBIHSM_PASSWORD` is required, other values fall back to defaults:
    /// `YUBIHSM_CONNECTOR` is `127.0.0.1:12345`, `YUBIHSM_AUTH_KEY_ID` and `YUBIHSM_DOMAINS` are `1`,
    /// `YUBIHSM_TIMEOUT_MS` is `5000`.
    pub fn from_env() -> Result<VaultConfig, VaultError> {
        VaultConfig::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`VaultConfig::from_env`] but reads values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<VaultConfig, VaultError>
        where F: Fn(&str) -> Option<String> {
        let address = lookup(ENV_CONNECTOR).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let password = lookup(ENV_PASSWORD)
            .ok_or_else(|| VaultError::ConfigError(format!("{} is not set", ENV_PASSWORD)))?;
        let mut config = VaultConfig::new(address, password);
        if let Some(v) = lookup(ENV_AUTH_KEY_ID) {
            config.auth_key_id = parse_u16(ENV_AUTH_KEY_ID, &v)?;
        }
        if let Some(v) = lookup(ENV_DOMAINS) {
            config.key_import_domains = parse_u16(ENV_DOMAINS, &v)?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_MS) {
            let ms = v.trim().parse::<u64>()
                .map_err(|_| VaultError::ConfigError(format!("{} is not a number: {}", ENV_TIMEOUT_MS, v)))?;
            config.timeout = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the parameters before opening a connection
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.address.trim().is_empty() {
            return Err(VaultError::ConfigError("Empty address".to_string()));
        }
        if self.password.is_empty() {
            return Err(VaultError::ConfigError("Empty password".to_string()));
        }
        if self.auth_key_id == 0 {
            return Err(VaultError::ConfigError("Auth key id 0 is reserved".to_string()));
        }
        if self.key_import_domains == 0 {
            return Err(VaultError::ConfigError("No domains selected".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(VaultError::ConfigError("Zero timeout".to_string()));
        }
        Ok(())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Password for the auth key. Never log it.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn auth_key_id(&self) -> u16 {
        self.auth_key_id
    }

    /// Bitmask of vault domains where keys are searched, bit 0 is the domain 1
    pub fn key_import_domains(&self) -> u16 {
        self.key_import_domains
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .field("auth_key_id", &self.auth_key_id)
            .field("key_import_domains", &format_args!("{:#06x}", self.key_import_domains))
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_u16(name: &str, value: &str) -> Result<u16, VaultError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    parsed.map_err(|_| VaultError::ConfigError(format!("{} is not a 16-bit number: {}", name, value)))
}
