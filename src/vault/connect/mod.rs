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
use std::ops::Deref;
use crate::errors::VaultError;
use crate::vault::config::VaultConfig;
use crate::vault::record::{KeyIdentifier, RawKeyRecord};

#[cfg(feature = "http")]
pub mod http;
#[cfg(test)]
pub mod mock;

#[cfg(feature = "http")]
pub use {
    http::{HttpConnector, HttpSession},
};

/// Client of a key vault
pub trait Vault {

    type Session: VaultSession;

    ///
    /// Opens an authenticated session. The session keeps the vault resources until it's closed,
    /// so prefer [`Vault::open_scoped`] which closes it automatically.
    fn connect(&self, config: &VaultConfig) -> Result<Self::Session, VaultError>;

    /// Opens a session which is closed when it goes out of scope
    fn open_scoped(&self, config: &VaultConfig) -> Result<ScopedSession<Self::Session>, VaultError> {
        self.connect(config).map(ScopedSession::new)
    }
}

/// An open session to the vault
pub trait VaultSession {

    ///
    /// Get the public part of the key stored under the identifier
    fn fetch_key(&self, key_id: &KeyIdentifier) -> Result<RawKeyRecord, VaultError>;

    ///
    /// Close the session. The session must not be used after that, and closing it again must be a no-op.
    fn close(&mut self) -> Result<(), VaultError>;
}

///
/// Session that is closed exactly once, either with [`ScopedSession::release`] or when dropped
pub struct ScopedSession<S: VaultSession> {
    session: Option<S>,
}

impl<S: VaultSession> ScopedSession<S> {

    pub fn new(session: S) -> Self {
        Self { session: Some(session) }
    }

    /// Close the session now and report the result
    pub fn release(mut self) -> Result<(), VaultError> {
        match self.session.take() {
            Some(mut session) => session.close(),
            None => Ok(()),
        }
    }
}

impl<S: VaultSession> Deref for ScopedSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        // the session is taken only by release() and drop(), both consume the scope
        match &self.session {
            Some(session) => session,
            None => unreachable!("Session is already released"),
        }
    }
}

impl<S: VaultSession> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!("Closing vault session");
            if let Err(e) = session.close() {
                warn!("Failed to close vault session: {}", e);
            }
        }
    }
}
