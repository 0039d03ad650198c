// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0
#![doc = include_str!("../README.md")]
//! ## Getting started
//!
//! Take a look at the [`manager`] module to see how to drive a settlement
//! and implement the needed context adapters, and at [`factory`] for
//! deterministic collection deployment.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::{dyn_abi::Eip712Domain, sol_types::eip712_domain};

mod error;
pub mod factory;
pub mod fees;
pub mod manager;

pub use error::Error;
use error::Result;

fn get_current_timestamp_u64() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| Error::InvalidSystemTime {
            source_error_message: err.to_string(),
        })?
        .as_secs())
}

/// The EIP712 domain separator builder for the settlement protocol.
///
/// All verifier receipts are signed and verified against this domain; the
/// counterparty permits are NOT. Those use the payment asset's and the
/// collection's own domains.
///
/// The domain separator is defined as:
/// - `name`: "Marketplace"
/// - `version`: "v1"
/// - `chain_id`: The chain ID of the chain the marketplace settles on.
/// - `verifying_contract`: The address of the marketplace itself.
pub fn market_eip712_domain(
    chain_id: u64,
    verifying_contract_address: alloy::primitives::Address,
) -> Eip712Domain {
    eip712_domain! {
        name: "Marketplace",
        version: "v1",
        chain_id: chain_id,
        verifying_contract: verifying_contract_address,
    }
}
