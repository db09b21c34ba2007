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

//! # Vault connector over HTTP
//!
//! Talks JSON to a connector gateway in front of the HSM:
//!
//! - `POST /session` with `{auth_key_id, password, domains}` opens a session and responds with `{session_id}`
//! - `POST /session/{id}/public-key` with `{object_id}` responds with `{object_id, algorithm, domains, public_key}`,
//!   where `algorithm` is the YubiHSM algorithm code and `public_key` is hex of the key in the vault's format
//! - `DELETE /session/{id}` closes the session
//!
//! Each request is limited by the timeout from [`VaultConfig`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use ureq::{Agent, AgentBuilder};
use crate::errors::VaultError;
use crate::vault::config::VaultConfig;
use crate::vault::connect::{Vault, VaultSession};
use crate::vault::record::{KeyIdentifier, RawKeyRecord};

// no Debug, it holds the password
#[derive(Serialize)]
struct SessionRequest<'a> {
    auth_key_id: u16,
    password: &'a str,
    domains: u16,
}

#[derive(Deserialize, Clone, Debug)]
struct SessionResponse {
    session_id: u32,
}

#[derive(Serialize, Clone, Debug)]
struct PublicKeyRequest {
    object_id: u16,
}

#[derive(Deserialize, Clone, Debug)]
struct PublicKeyResponse {
    object_id: u16,
    algorithm: u8,
    domains: u16,
    public_key: String,
}

/// Connects to a vault through an HTTP connector gateway
#[derive(Clone, Debug, Default)]
pub struct HttpConnector {}

impl HttpConnector {
    pub fn new() -> Self {
        HttpConnector {}
    }
}

impl Vault for HttpConnector {
    type Session = HttpSession;

    fn connect(&self, config: &VaultConfig) -> Result<HttpSession, VaultError> {
        config.validate()?;
        let base = base_url(config.address());
        let agent = AgentBuilder::new()
            .timeout(config.timeout())
            .build();
        debug!("Open vault session at {} with auth key {}", base, config.auth_key_id());
        let req = SessionRequest {
            auth_key_id: config.auth_key_id(),
            password: config.password(),
            domains: config.key_import_domains(),
        };
        let resp: SessionResponse = post(&agent, &format!("{}/session", base), req, "session")?;
        trace!("Vault session {} is open", resp.session_id);
        Ok(HttpSession {
            agent,
            base,
            session_id: resp.session_id,
            closed: false,
        })
    }
}

/// Session opened by [`HttpConnector`]
pub struct HttpSession {
    agent: Agent,
    base: String,
    session_id: u32,
    closed: bool,
}

impl HttpSession {
    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base, self.session_id, path)
    }
}

impl VaultSession for HttpSession {
    fn fetch_key(&self, key_id: &KeyIdentifier) -> Result<RawKeyRecord, VaultError> {
        if self.closed {
            return Err(VaultError::SessionExpired);
        }
        let object_id = object_id(key_id)?;
        debug!("Get public key 0x{:04x} from session {}", object_id, self.session_id);
        let resp: PublicKeyResponse = post(
            &self.agent,
            &self.url("/public-key"),
            PublicKeyRequest { object_id },
            key_id.as_str(),
        )?;
        if resp.object_id != object_id {
            return Err(VaultError::EncodingError(
                format!("Requested key 0x{:04x} but received 0x{:04x}", object_id, resp.object_id)
            ));
        }
        let key = hex::decode(&resp.public_key)?;
        RawKeyRecord::from_parts(key_id.clone(), resp.algorithm, resp.domains, &key)
    }

    fn close(&mut self) -> Result<(), VaultError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        trace!("Close vault session {}", self.session_id);
        match self.agent.delete(&self.url("")).call() {
            Ok(_) => Ok(()),
            // already closed on the vault side
            Err(ureq::Error::Status(404, _)) | Err(ureq::Error::Status(410, _)) => Ok(()),
            Err(e) => Err(convert_error(e, "session")),
        }
    }
}

/// Vault connector address, with `http://` added when there is no scheme
fn base_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

/// Key identifier is a hex of 16-bit object id, optionally prefixed with `0x`
fn object_id(key_id: &KeyIdentifier) -> Result<u16, VaultError> {
    let value = key_id.as_str();
    let value = value.strip_prefix("0x").unwrap_or(value);
    u16::from_str_radix(value, 16)
        .map_err(|_| VaultError::InputError(format!("Key id is not a 16-bit hex value: {}", key_id)))
}

fn post<T: Serialize, R: DeserializeOwned>(agent: &Agent, url: &str, command: T, context: &str) -> Result<R, VaultError> {
    let resp = agent.post(url).send_json(command)
        .map_err(|e| convert_error(e, context))?;
    resp.into_json::<R>()
        .map_err(|e| VaultError::EncodingError(format!("Invalid response: {}", e)))
}

fn convert_error(err: ureq::Error, context: &str) -> VaultError {
    match err {
        ureq::Error::Status(code, _) => status_error(code, context),
        ureq::Error::Transport(t) => match t.kind() {
            ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Dns => {
                debug!("Vault is not reachable: {}", t);
                VaultError::Unavailable
            }
            _ => VaultError::CommError(format!("Failed to make a request: {}", t)),
        },
    }
}

fn status_error(code: u16, context: &str) -> VaultError {
    match code {
        401 | 403 => VaultError::AuthError(format!("HTTP Status: {}", code)),
        404 => VaultError::NotFound(context.to_string()),
        410 | 440 => VaultError::SessionExpired,
        _ => VaultError::CommError(format!("HTTP Status: {}", code)),
    }
}
