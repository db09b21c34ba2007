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

//! Key records as they're stored in the vault

use std::{fmt, str::FromStr};
use std::convert::TryFrom;
use crate::errors::VaultError;

/// Identifier of a key stored in the vault. The value is opaque here, it's up to the vault how to interpret it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyIdentifier(String);

impl KeyIdentifier {
    pub fn new<S: AsRef<str>>(value: S) -> Result<KeyIdentifier, VaultError> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(VaultError::InputError("Empty key identifier".to_string()));
        }
        Ok(KeyIdentifier(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyIdentifier {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyIdentifier::new(s)
    }
}

impl TryFrom<String> for KeyIdentifier {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        KeyIdentifier::new(value)
    }
}

impl From<KeyIdentifier> for String {
    fn from(value: KeyIdentifier) -> Self {
        value.0
    }
}

/// Asymmetric key algorithms, with the codes used by YubiHSM
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Algorithm {
    Rsa2048 = 9,
    Rsa3072 = 10,
    Rsa4096 = 11,
    EcP256 = 12,
    EcP384 = 13,
    EcP521 = 14,
    EcK256 = 15,
    EcBp256 = 16,
    EcBp384 = 17,
    EcBp512 = 18,
    Ed25519 = 46,
    EcP224 = 47,
}

impl Algorithm {

    /// Curve of the algorithm, or `None` if it's not an EC algorithm
    pub fn ec_curve(&self) -> Option<EcCurve> {
        match self {
            Algorithm::EcP224 => Some(EcCurve::P224),
            Algorithm::EcP256 => Some(EcCurve::P256),
            Algorithm::EcP384 => Some(EcCurve::P384),
            Algorithm::EcP521 => Some(EcCurve::P521),
            Algorithm::EcK256 => Some(EcCurve::Secp256k1),
            Algorithm::EcBp256 => Some(EcCurve::Brainpool256),
            Algorithm::EcBp384 => Some(EcCurve::Brainpool384),
            Algorithm::EcBp512 => Some(EcCurve::Brainpool512),
            _ => None,
        }
    }

    /// Size of RSA modulus in bytes
    fn rsa_modulus_len(&self) -> Option<usize> {
        match self {
            Algorithm::Rsa2048 => Some(256),
            Algorithm::Rsa3072 => Some(384),
            Algorithm::Rsa4096 => Some(512),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = VaultError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let algorithm = match value {
            9 => Algorithm::Rsa2048,
            10 => Algorithm::Rsa3072,
            11 => Algorithm::Rsa4096,
            12 => Algorithm::EcP256,
            13 => Algorithm::EcP384,
            14 => Algorithm::EcP521,
            15 => Algorithm::EcK256,
            16 => Algorithm::EcBp256,
            17 => Algorithm::EcBp384,
            18 => Algorithm::EcBp512,
            46 => Algorithm::Ed25519,
            47 => Algorithm::EcP224,
            _ => return Err(VaultError::EncodingError(format!("Unsupported key algorithm: {}", value))),
        };
        Ok(algorithm)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P224,
    P256,
    P384,
    P521,
    Secp256k1,
    Brainpool256,
    Brainpool384,
    Brainpool512,
}

impl EcCurve {
    /// Size of a single coordinate in bytes
    pub fn coordinate_len(&self) -> usize {
        match self {
            EcCurve::P224 => 28,
            EcCurve::P256 | EcCurve::Secp256k1 | EcCurve::Brainpool256 => 32,
            EcCurve::P384 | EcCurve::Brainpool384 => 48,
            EcCurve::P521 => 66,
            EcCurve::Brainpool512 => 64,
        }
    }
}

/// Affine point as reported by the vault, coordinates are big-endian
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcPoint {
    pub curve: EcCurve,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

/// Public part of a stored key
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    Ec(EcPoint),
    Ed25519([u8; 32]),
    Rsa { modulus: Vec<u8> },
}

/// Key record returned by the vault
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawKeyRecord {
    pub key_id: KeyIdentifier,
    pub algorithm: Algorithm,
    /// Domains the key belongs to
    pub domains: u16,
    pub public_key: PublicKeyMaterial,
}

impl RawKeyRecord {

    ///
    /// Build from the public key bytes in the vault's native format: `X || Y` for EC keys, 32 bytes for Ed25519
    /// and the modulus for RSA keys.
    pub fn from_parts(key_id: KeyIdentifier, algorithm: u8, domains: u16, key: &[u8]) -> Result<RawKeyRecord, VaultError> {
        let algorithm = Algorithm::try_from(algorithm)?;
        let public_key = if let Some(curve) = algorithm.ec_curve() {
            let coord_len = curve.coordinate_len();
            if key.len() != coord_len * 2 {
                return Err(VaultError::EncodingError(
                    format!("EC key size {} != {} for {:?}", key.len(), coord_len * 2, curve)
                ));
            }
            PublicKeyMaterial::Ec(EcPoint {
                curve,
                x: key[..coord_len].to_vec(),
                y: key[coord_len..].to_vec(),
            })
        } else if let Some(modulus_len) = algorithm.rsa_modulus_len() {
            if key.len() != modulus_len {
                return Err(VaultError::EncodingError(
                    format!("RSA modulus size {} != {}", key.len(), modulus_len)
                ));
            }
            PublicKeyMaterial::Rsa { modulus: key.to_vec() }
        } else {
            let key: [u8; 32] = key.try_into()
                .map_err(|_| VaultError::EncodingError(format!("Ed25519 key size {} != 32", key.len())))?;
            PublicKeyMaterial::Ed25519(key)
        };
        Ok(RawKeyRecord { key_id, algorithm, domains, public_key })
    }

    ///
    /// Decode a _Get Public Key_ response of the vault, which is the algorithm code followed by the key bytes
    pub fn decode(key_id: KeyIdentifier, domains: u16, data: &[u8]) -> Result<RawKeyRecord, VaultError> {
        match data.split_first() {
            None => Err(VaultError::EncodingError("Empty data".to_string())),
            Some((algorithm, key)) => RawKeyRecord::from_parts(key_id, *algorithm, domains, key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATOR_XY: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
                                483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    fn key_id() -> KeyIdentifier {
        KeyIdentifier::new("1729").unwrap()
    }

    #[test]
    fn key_identifier_kept_as_is() {
        let act = KeyIdentifier::new(" 1729").unwrap();
        assert_eq!(act.as_str(), " 1729");
        assert_eq!(act.to_string(), " 1729");
        assert_ne!(act, key_id());
    }

    #[test]
    fn key_identifier_cannot_be_empty() {
        assert!(KeyIdentifier::new("").is_err());
        assert!(KeyIdentifier::new("   ").is_err());
        assert!(KeyIdentifier::from_str("").is_err());
    }

    #[test]
    fn key_identifier_serde_as_string() {
        let json = serde_json::to_string(&key_id()).unwrap();
        assert_eq!(json, "\"1729\"");
        let parsed: KeyIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key_id());
        assert!(serde_json::from_str::<KeyIdentifier>("\"\"").is_err());
    }

    #[test]
    fn algorithm_codes() {
        assert_eq!(Algorithm::try_from(15).unwrap(), Algorithm::EcK256);
        assert_eq!(Algorithm::EcK256 as u8, 15);
        assert_eq!(Algorithm::try_from(46).unwrap(), Algorithm::Ed25519);
        assert_eq!(Algorithm::try_from(47).unwrap(), Algorithm::EcP224);
        assert!(Algorithm::try_from(0).is_err());
        assert!(Algorithm::try_from(19).is_err());
    }

    #[test]
    fn ec_curves_only_for_ec_algorithms() {
        assert_eq!(Algorithm::EcK256.ec_curve(), Some(EcCurve::Secp256k1));
        assert_eq!(Algorithm::EcP521.ec_curve(), Some(EcCurve::P521));
        assert_eq!(Algorithm::Ed25519.ec_curve(), None);
        assert_eq!(Algorithm::Rsa2048.ec_curve(), None);
    }

    #[test]
    fn decode_secp256k1_key() {
        let mut data = vec![15u8];
        data.extend(hex::decode(GENERATOR_XY).unwrap());
        let act = RawKeyRecord::decode(key_id(), 1, &data).unwrap();
        assert_eq!(act.algorithm, Algorithm::EcK256);
        assert_eq!(act.domains, 1);
        match act.public_key {
            PublicKeyMaterial::Ec(point) => {
                assert_eq!(point.curve, EcCurve::Secp256k1);
                assert_eq!(hex::encode(point.x), &GENERATOR_XY[..64]);
                assert_eq!(hex::encode(point.y), &GENERATOR_XY[64..]);
            }
            other => panic!("Not an EC key: {:?}", other),
        }
    }

    #[test]
    fn decode_p384_key() {
        let key = [0x11u8; 96];
        let act = RawKeyRecord::from_parts(key_id(), 13, 1, &key).unwrap();
        match act.public_key {
            PublicKeyMaterial::Ec(point) => {
                assert_eq!(point.curve, EcCurve::P384);
                assert_eq!(point.x.len(), 48);
                assert_eq!(point.y.len(), 48);
            }
            other => panic!("Not an EC key: {:?}", other),
        }
    }

    #[test]
    fn decode_ed25519_key() {
        let act = RawKeyRecord::from_parts(key_id(), 46, 1, &[7u8; 32]).unwrap();
        assert_eq!(act.public_key, PublicKeyMaterial::Ed25519([7u8; 32]));
    }

    #[test]
    fn decode_rsa_key() {
        let act = RawKeyRecord::from_parts(key_id(), 9, 3, &[1u8; 256]).unwrap();
        assert_eq!(act.algorithm, Algorithm::Rsa2048);
        assert_eq!(act.domains, 3);
        assert!(matches!(act.public_key, PublicKeyMaterial::Rsa { ref modulus } if modulus.len() == 256));
    }

    #[test]
    fn rejects_cut_keys() {
        assert!(RawKeyRecord::from_parts(key_id(), 15, 1, &[1u8; 63]).is_err());
        assert!(RawKeyRecord::from_parts(key_id(), 46, 1, &[1u8; 31]).is_err());
        assert!(RawKeyRecord::from_parts(key_id(), 11, 1, &[1u8; 256]).is_err());
        assert!(RawKeyRecord::decode(key_id(), 1, &[]).is_err());
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let act = RawKeyRecord::from_parts(key_id(), 200, 1, &[1u8; 64]);
        assert!(matches!(act, Err(VaultError::EncodingError(_))));
    }
}
