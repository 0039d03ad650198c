// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Deterministic collection deployment.
//!
//! Collection contracts are clones of one template, deployed to
//! content-addressed locations: the salt is a hash of the immutable
//! deployment parameters and the address is the CREATE2 derivation of that
//! salt, so anyone can compute where a collection will live from its
//! `(name, symbol, base_uri)` alone, before it exists. Receipts rely on
//! this to reference collections that have not been deployed yet.
//!
//! The salt-to-address map is append-only: one salt maps to at most one
//! deployed clone, ever.

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::RwLock,
};

use alloy::primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};

/// Version tag mixed into every salt; bumping it re-keys the address space.
pub const TEMPLATE_VERSION: &str = "NFTFactory_v1";

/// Errors returned by collection deployment
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("collection already deployed for salt {salt}: {address}")]
    AlreadyDeployed { salt: B256, address: Address },
}

/// The immutable parameters a collection clone is initialized with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionParams {
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
}

/// One entry of the append-only deployment map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRecord {
    pub salt: B256,
    pub address: Address,
}

/// Deploys collection clones to deterministic addresses and records them.
#[derive(Debug)]
pub struct CollectionFactory {
    /// The factory's own address, part of the CREATE2 derivation
    address: Address,
    /// Hash of the collection template's init code
    init_code_hash: B256,
    records: RwLock<HashMap<B256, CloneRecord>>,
}

impl CollectionFactory {
    pub fn new(address: Address, init_code_hash: B256) -> Self {
        Self {
            address,
            init_code_hash,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Derives the deployment salt for `params`.
    ///
    /// Pure: identical parameters always yield an identical salt. The
    /// packing is `keccak256(TEMPLATE_VERSION) ++ name ++ symbol ++
    /// base_uri`, hashed.
    pub fn derive_salt(params: &CollectionParams) -> B256 {
        let version_hash = keccak256(TEMPLATE_VERSION.as_bytes());
        let mut packed = Vec::with_capacity(
            32 + params.name.len() + params.symbol.len() + params.base_uri.len(),
        );
        packed.extend_from_slice(version_hash.as_slice());
        packed.extend_from_slice(params.name.as_bytes());
        packed.extend_from_slice(params.symbol.as_bytes());
        packed.extend_from_slice(params.base_uri.as_bytes());
        keccak256(&packed)
    }

    /// The address a clone with this salt occupies, deployed or not.
    pub fn predict_address(&self, salt: B256) -> Address {
        self.address.create2(salt, self.init_code_hash)
    }

    /// Deploys the clone for `params` and records it.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::AlreadyDeployed`] if a clone for the same
    /// salt exists; the existing record is left untouched.
    pub fn deploy(&self, params: &CollectionParams) -> Result<Address, FactoryError> {
        let salt = Self::derive_salt(params);
        let mut records = self.records.write().unwrap();
        match records.entry(salt) {
            Entry::Occupied(existing) => Err(FactoryError::AlreadyDeployed {
                salt,
                address: existing.get().address,
            }),
            Entry::Vacant(slot) => {
                let address = self.address.create2(salt, self.init_code_hash);
                slot.insert(CloneRecord { salt, address });
                Ok(address)
            }
        }
    }

    /// Looks up the deployed clone for `salt`.
    ///
    /// `None` means "not yet deployed", not an error.
    pub fn resolve(&self, salt: B256) -> Option<Address> {
        self.records
            .read()
            .unwrap()
            .get(&salt)
            .map(|record| record.address)
    }
}
