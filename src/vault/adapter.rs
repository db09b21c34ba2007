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

//! # Attach a vault key as a secp256k1 signing key
//!
//! There are two ways to attach a key:
//!
//! - [`KeyAdapter::attach_unverified`] just reads the key. It proves only that _some_ secp256k1 key is stored under
//!   the identifier, not that it's the key the user expects. Use it to check a key that is already known, i.e.
//!   to compare with the public key stored with an account, but never to create a new account.
//! - [`KeyAdapter::attach_with_confirmation`] additionally shows the key fingerprint to the operator and returns the
//!   key only if it's approved. That's the way to bind a new account to an HSM key.

use crate::errors::AttachError;
use crate::vault::config::VaultConfig;
use crate::vault::connect::{Vault, VaultSession};
use crate::vault::key::{CompressedPublicKey, KeyFingerprint, SigningKey, SigningKeyHandle};
use crate::vault::record::{EcCurve, KeyIdentifier, PublicKeyMaterial, RawKeyRecord};

/// Operator approval of a key before it's attached
pub trait KeyConfirmation {
    ///
    /// Show the key details to the operator. Returns `true` only if the operator confirmed that's the expected key.
    fn confirm(&self, key_id: &KeyIdentifier, pub_key: &CompressedPublicKey, fingerprint: &KeyFingerprint) -> bool;
}

impl<F> KeyConfirmation for F where F: Fn(&KeyIdentifier, &CompressedPublicKey, &KeyFingerprint) -> bool {
    fn confirm(&self, key_id: &KeyIdentifier, pub_key: &CompressedPublicKey, fingerprint: &KeyFingerprint) -> bool {
        self(key_id, pub_key, fingerprint)
    }
}

/// Attaches secp256k1 keys stored in a vault
pub struct KeyAdapter<V: Vault> {
    vault: V,
}

impl<V: Vault> KeyAdapter<V> {

    pub fn new(vault: V) -> Self {
        KeyAdapter { vault }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    ///
    /// Read the public key stored under `key_id` without user verification.
    ///
    /// Success means only that a secp256k1 key with this identifier exists. Nobody checked it's the _intended_ key,
    /// so it can be used to verify a known public key but never to create new accounts; use
    /// [`KeyAdapter::attach_with_confirmation`] for that.
    pub fn attach_unverified(&self, config: &VaultConfig, key_id: &KeyIdentifier) -> Result<SigningKeyHandle, AttachError> {
        attach_unverified(&self.vault, config, key_id)
    }

    ///
    /// Read the public key stored under `key_id` and ask the operator to confirm it by its fingerprint.
    /// The key is returned only if confirmed.
    pub fn attach_with_confirmation(&self,
                                    config: &VaultConfig,
                                    key_id: &KeyIdentifier,
                                    confirmation: &dyn KeyConfirmation) -> Result<SigningKeyHandle, AttachError> {
        let handle = attach_unverified(&self.vault, config, key_id)?;
        let fingerprint = handle.fingerprint();
        debug!("Ask to confirm key {} with fingerprint {}", key_id, fingerprint);
        if !confirmation.confirm(key_id, handle.pub_key(), &fingerprint) {
            info!("Key {} is rejected by operator", key_id);
            return Err(AttachError::Rejected { key_id: key_id.clone(), fingerprint });
        }
        Ok(handle)
    }
}

///
/// Same as [`KeyAdapter::attach_unverified`], reads the key with the provided vault client.
/// The vault session is closed before the function returns, on success and on any error.
pub fn attach_unverified<V: Vault>(vault: &V, config: &VaultConfig, key_id: &KeyIdentifier) -> Result<SigningKeyHandle, AttachError> {
    let record = fetch_record(vault, config, key_id)?;
    let pub_key = compress_record(key_id, &record)?;
    trace!("Attached key {} as {}", key_id, pub_key);
    Ok(SigningKeyHandle::new(key_id.clone(), pub_key))
}

fn fetch_record<V: Vault>(vault: &V, config: &VaultConfig, key_id: &KeyIdentifier) -> Result<RawKeyRecord, AttachError> {
    let session = vault.open_scoped(config)
        .map_err(|cause| AttachError::Connect { cause })?;
    debug!("Fetch key {}", key_id);
    let record = session.fetch_key(key_id)
        .map_err(|cause| AttachError::Lookup { key_id: key_id.clone(), cause })?;
    if let Err(e) = session.release() {
        warn!("Failed to close vault session after reading key {}: {}", key_id, e);
    }
    Ok(record)
}

///
/// Convert the public key of a record into a compressed secp256k1 key. The record must contain an EC point,
/// which must be on secp256k1.
pub fn compress_record(key_id: &KeyIdentifier, record: &RawKeyRecord) -> Result<CompressedPublicKey, AttachError> {
    let point = match &record.public_key {
        PublicKeyMaterial::Ec(point) => point,
        PublicKeyMaterial::Ed25519(_) | PublicKeyMaterial::Rsa { .. } => {
            return Err(AttachError::WrongKeyType { key_id: key_id.clone(), algorithm: record.algorithm });
        }
    };
    let pub_key = CompressedPublicKey::from_coordinates(&point.x, &point.y)
        .map_err(|cause| AttachError::InvalidCurvePoint { key_id: key_id.clone(), cause })?;
    if point.curve != EcCurve::Secp256k1 {
        warn!("Key {} is stored as {:?} but it's a valid secp256k1 point", key_id, point.curve);
    }
    Ok(pub_key)
}
