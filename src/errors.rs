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
use std::{fmt, error};
use crate::vault::{Algorithm, KeyFingerprint, KeyIdentifier};

/// Errors produced by a vault client
#[derive(Debug, PartialEq, Clone)]
pub enum VaultError {
    /// Vault connector is unreachable
    Unavailable,
    /// Authentication rejected by the vault
    AuthError(String),
    /// Error from the transport
    CommError(String),
    /// Vault response cannot be decoded
    EncodingError(String),
    /// No key stored under the identifier
    NotFound(String),
    /// Session is closed or expired on the vault side
    SessionExpired,
    /// Invalid connection parameters
    ConfigError(String),
    /// On invalid input to the library
    InputError(String),
}

impl From<hex::FromHexError> for VaultError {
    fn from(err: hex::FromHexError) -> Self {
        VaultError::EncodingError(format!("Invalid hex: {}", err))
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VaultError::Unavailable => write!(f, "Vault unavailable"),
            VaultError::AuthError(s) => write!(f, "Vault authentication failed: {}", s),
            VaultError::CommError(s) => write!(f, "Vault communication error: {}", s),
            VaultError::EncodingError(s) => write!(f, "Vault encoding error: {}", s),
            VaultError::NotFound(s) => write!(f, "Key not found: {}", s),
            VaultError::SessionExpired => write!(f, "Vault session expired"),
            VaultError::ConfigError(s) => write!(f, "Invalid vault config: {}", s),
            VaultError::InputError(s) => write!(f, "Invalid input: {}", s),
        }
    }
}

impl error::Error for VaultError {}

/// Errors of a public key encoding
#[derive(Debug, PartialEq, Clone)]
pub enum KeyError {
    /// Compressed key is not 33 bytes
    InvalidLength(usize),
    /// First byte is not a SEC1 compressed prefix
    InvalidPrefix(u8),
    /// Coordinate doesn't fit into 32 bytes
    CoordinateOverflow(usize),
    /// Point doesn't satisfy the secp256k1 curve equation
    NotOnCurve,
    InvalidHex(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyError::InvalidLength(len) => write!(f, "Expected 33 bytes of compressed key, got {}", len),
            KeyError::InvalidPrefix(b) => write!(f, "Invalid compressed key prefix: 0x{:02x}", b),
            KeyError::CoordinateOverflow(len) => write!(f, "Coordinate of {} bytes is larger than 32 bytes", len),
            KeyError::NotOnCurve => write!(f, "Point is not on secp256k1"),
            KeyError::InvalidHex(s) => write!(f, "Invalid hex: {}", s),
        }
    }
}

impl error::Error for KeyError {}

/// Failure to attach an HSM key. None of them leaves a key handle behind.
#[derive(Debug, PartialEq, Clone)]
pub enum AttachError {
    /// Cannot open a session to the vault
    Connect { cause: VaultError },
    /// Session is open, but the key cannot be read
    Lookup { key_id: KeyIdentifier, cause: VaultError },
    /// Key exists, but it's not an elliptic curve key
    WrongKeyType { key_id: KeyIdentifier, algorithm: Algorithm },
    /// Coordinates provided by the vault are not a secp256k1 point
    InvalidCurvePoint { key_id: KeyIdentifier, cause: KeyError },
    /// Operator didn't approve the key
    Rejected { key_id: KeyIdentifier, fingerprint: KeyFingerprint },
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttachError::Connect { cause } =>
                write!(f, "Cannot connect to vault: {}", cause),
            AttachError::Lookup { key_id, cause } =>
                write!(f, "Cannot read key {}: {}", key_id, cause),
            AttachError::WrongKeyType { key_id, algorithm } =>
                write!(f, "Key {} is {:?}, an EC key expected", key_id, algorithm),
            AttachError::InvalidCurvePoint { key_id, cause } =>
                write!(f, "Key {} is not a secp256k1 key: {}", key_id, cause),
            AttachError::Rejected { key_id, fingerprint } =>
                write!(f, "Key {} ({}) rejected by operator", key_id, fingerprint),
        }
    }
}

impl error::Error for AttachError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            AttachError::Connect { cause } => Some(cause),
            AttachError::Lookup { cause, .. } => Some(cause),
            AttachError::InvalidCurvePoint { cause, .. } => Some(cause),
            AttachError::WrongKeyType { .. } | AttachError::Rejected { .. } => None,
        }
    }
}
