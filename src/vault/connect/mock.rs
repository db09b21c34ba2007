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

//! Mock vault implementation for testing

use std::cell::RefCell;
use std::rc::Rc;
use crate::errors::VaultError;
use crate::vault::config::VaultConfig;
use crate::vault::connect::{Vault, VaultSession};
use crate::vault::record::{KeyIdentifier, RawKeyRecord};

/// Public key of the secp256k1 generator point, as the vault returns it (algorithm code + X + Y)
pub const GENERATOR_RECORD: &str = "0f\
    79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
    483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

/// Mock vault keeping a single record and counting calls
pub struct MockVault {
    pub record: Result<RawKeyRecord, VaultError>,
    pub connect_error: Option<VaultError>,
    pub close_error: Option<VaultError>,
    pub connect_count: RefCell<usize>,
    pub fetch_count: Rc<RefCell<usize>>,
    pub close_count: Rc<RefCell<usize>>,
}

impl Default for MockVault {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVault {
    /// Create a MockVault with the generator point stored as key `1729`
    pub fn new() -> Self {
        let record = RawKeyRecord::decode(
            KeyIdentifier::new("1729").unwrap(),
            1,
            &hex::decode(GENERATOR_RECORD).unwrap(),
        ).unwrap();
        Self::with_record(record)
    }

    pub fn with_record(record: RawKeyRecord) -> Self {
        MockVault {
            record: Ok(record),
            connect_error: None,
            close_error: None,
            connect_count: RefCell::new(0),
            fetch_count: Rc::new(RefCell::new(0)),
            close_count: Rc::new(RefCell::new(0)),
        }
    }

    /// Create a MockVault that fails each lookup
    pub fn with_fetch_error(error: VaultError) -> Self {
        MockVault {
            record: Err(error),
            ..Self::new()
        }
    }

    /// Create a MockVault that cannot be connected
    pub fn new_unavailable() -> Self {
        MockVault {
            connect_error: Some(VaultError::Unavailable),
            ..Self::new()
        }
    }
}

impl Vault for MockVault {
    type Session = MockSession;

    fn connect(&self, config: &VaultConfig) -> Result<MockSession, VaultError> {
        *self.connect_count.borrow_mut() += 1;
        if let Some(err) = &self.connect_error {
            return Err(err.clone());
        }
        config.validate()?;
        Ok(MockSession {
            record: self.record.clone(),
            close_error: self.close_error.clone(),
            fetch_count: self.fetch_count.clone(),
            close_count: self.close_count.clone(),
            closed: false,
        })
    }
}

pub struct MockSession {
    record: Result<RawKeyRecord, VaultError>,
    close_error: Option<VaultError>,
    fetch_count: Rc<RefCell<usize>>,
    close_count: Rc<RefCell<usize>>,
    closed: bool,
}

impl VaultSession for MockSession {
    fn fetch_key(&self, key_id: &KeyIdentifier) -> Result<RawKeyRecord, VaultError> {
        *self.fetch_count.borrow_mut() += 1;
        if self.closed {
            return Err(VaultError::SessionExpired);
        }
        let record = self.record.clone()?;
        if &record.key_id != key_id {
            return Err(VaultError::NotFound(key_id.to_string()));
        }
        Ok(record)
    }

    fn close(&mut self) -> Result<(), VaultError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        *self.close_count.borrow_mut() += 1;
        match &self.close_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
