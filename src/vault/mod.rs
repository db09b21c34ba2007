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

//! # Access to secp256k1 keys stored in an HSM backed key vault
//!
//! The vault keeps the private part; this module only reads the public key of a stored object,
//! checks it's a secp256k1 point and keeps it as a [`SigningKeyHandle`].
//!
//! ```no_run
//! use hwkey_yubi::vault::{KeyAdapter, KeyIdentifier, SigningKey, VaultConfig};
//! use hwkey_yubi::vault::connect::HttpConnector;
//!
//! let config = VaultConfig::from_env().unwrap();
//! let adapter = KeyAdapter::new(HttpConnector::new());
//! let handle = adapter.attach_unverified(&config, &KeyIdentifier::new("1729").unwrap()).unwrap();
//! println!("{}", handle.pub_key());
//! ```

pub mod config;
pub mod record;
pub mod key;
pub mod adapter;
pub mod connect;

pub use {
    config::VaultConfig,
    record::{Algorithm, EcCurve, EcPoint, KeyIdentifier, PublicKeyMaterial, RawKeyRecord},
    key::{CompressedPublicKey, KeyFingerprint, SigningKey, SigningKeyHandle},
    adapter::{attach_unverified, KeyAdapter, KeyConfirmation},
    connect::{ScopedSession, Vault, VaultSession},
};
