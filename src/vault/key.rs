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
use std::{fmt, str::FromStr};
use std::convert::TryFrom;
use bitcoin::secp256k1::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::de::Error as _;
use sha2::{Digest, Sha256};
use ripemd::Ripemd160;
use crate::errors::KeyError;
use crate::vault::record::KeyIdentifier;

/// Size of a SEC1 compressed key
pub const COMPRESSED_KEY_SIZE: usize = 33;
/// Size of a SEC1 uncompressed key
pub const UNCOMPRESSED_KEY_SIZE: usize = 65;

const COORDINATE_SIZE: usize = 32;

///
/// A secp256k1 public key in the SEC1 compressed form, i.e. `0x02` or `0x03` (parity of Y) followed by 32 bytes of X.
/// It can be created only from a point which is actually on the curve.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct CompressedPublicKey(PublicKey);

impl CompressedPublicKey {

    ///
    /// Make the SEC1 uncompressed encoding (`0x04 || X || Y`) of a point. Coordinates are big-endian,
    /// shorter ones are padded with zeroes and leading zeroes of a longer one are ignored.
    pub fn encode_uncompressed(x: &[u8], y: &[u8]) -> Result<[u8; UNCOMPRESSED_KEY_SIZE], KeyError> {
        let mut result = [0u8; UNCOMPRESSED_KEY_SIZE];
        result[0] = 0x04;
        copy_coordinate(x, &mut result[1..1 + COORDINATE_SIZE])?;
        copy_coordinate(y, &mut result[1 + COORDINATE_SIZE..])?;
        Ok(result)
    }

    /// Parse a SEC1 uncompressed point, which must be on secp256k1
    pub fn from_uncompressed(value: &[u8; UNCOMPRESSED_KEY_SIZE]) -> Result<CompressedPublicKey, KeyError> {
        PublicKey::from_slice(value)
            .map(CompressedPublicKey)
            .map_err(|_| KeyError::NotOnCurve)
    }

    /// Parse the point coordinates, checking they satisfy the secp256k1 curve equation
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<CompressedPublicKey, KeyError> {
        let uncompressed = CompressedPublicKey::encode_uncompressed(x, y)?;
        CompressedPublicKey::from_uncompressed(&uncompressed)
    }

    pub fn to_bytes(&self) -> [u8; COMPRESSED_KEY_SIZE] {
        self.0.serialize()
    }

    /// Restore the full point as `0x04 || X || Y`
    pub fn decompress(&self) -> [u8; UNCOMPRESSED_KEY_SIZE] {
        self.0.serialize_uncompressed()
    }

    pub fn as_public_key(&self) -> &PublicKey {
        &self.0
    }
}

fn copy_coordinate(value: &[u8], target: &mut [u8]) -> Result<(), KeyError> {
    let start = value.iter().position(|b| *b != 0).unwrap_or(value.len());
    let value = &value[start..];
    if value.len() > target.len() {
        return Err(KeyError::CoordinateOverflow(value.len()));
    }
    let offset = target.len() - value.len();
    target[offset..].copy_from_slice(value);
    Ok(())
}

impl From<PublicKey> for CompressedPublicKey {
    fn from(value: PublicKey) -> Self {
        CompressedPublicKey(value)
    }
}

impl TryFrom<&[u8]> for CompressedPublicKey {
    type Error = KeyError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != COMPRESSED_KEY_SIZE {
            return Err(KeyError::InvalidLength(value.len()));
        }
        if value[0] != 0x02 && value[0] != 0x03 {
            return Err(KeyError::InvalidPrefix(value[0]));
        }
        PublicKey::from_slice(value)
            .map(CompressedPublicKey)
            .map_err(|_| KeyError::NotOnCurve)
    }
}

impl FromStr for CompressedPublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| KeyError::InvalidHex(e.to_string()))?;
        CompressedPublicKey::try_from(bytes.as_slice())
    }
}

impl fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedPublicKey({})", self)
    }
}

impl Serialize for CompressedPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CompressedPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        CompressedPublicKey::from_str(&value).map_err(D::Error::custom)
    }
}

/// HASH160 (RIPEMD-160 over SHA-256) of a compressed key
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyFingerprint([u8; 20]);

impl KeyFingerprint {
    pub fn of(key: &CompressedPublicKey) -> KeyFingerprint {
        let sha = Sha256::digest(key.to_bytes());
        let hash = Ripemd160::digest(sha);
        let mut result = [0u8; 20];
        result.copy_from_slice(&hash);
        KeyFingerprint(result)
    }

    pub fn to_bytes(&self) -> [u8; 20] {
        self.0
    }
}

impl fmt::Display for KeyFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Key that can be used by a signer. Here it only provides the public key.
pub trait SigningKey {
    fn pub_key(&self) -> &CompressedPublicKey;
}

///
/// Reference to a secp256k1 key stored in the vault. Keeps only the public key, so it can be persisted with
/// account details and shown later without the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeyHandle {
    key_id: KeyIdentifier,
    pub_key: CompressedPublicKey,
}

impl SigningKeyHandle {
    pub(crate) fn new(key_id: KeyIdentifier, pub_key: CompressedPublicKey) -> SigningKeyHandle {
        SigningKeyHandle { key_id, pub_key }
    }

    pub fn key_id(&self) -> &KeyIdentifier {
        &self.key_id
    }

    pub fn fingerprint(&self) -> KeyFingerprint {
        KeyFingerprint::of(&self.pub_key)
    }
}

impl SigningKey for SigningKeyHandle {
    fn pub_key(&self) -> &CompressedPublicKey {
        &self.pub_key
    }
}
