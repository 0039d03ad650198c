// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, U256},
};
use async_trait::async_trait;

/// Read access to the collateral permit domains and counters.
///
/// Counterparty permits are signed against each asset's *own* EIP712 domain
/// and nonce space: the payment token's for spend permits, the
/// collection's for transfer permits. The manager reconstructs those
/// domains through this adapter to verify permits it did not generate.
/// Permit counters are never conflated with the protocol nonce counters of
/// [`super::NonceRead`].
///
/// # Example
///
/// For example code see [crate::manager::context::memory::InMemoryMarket]
#[async_trait]
pub trait PermitRead: Send + Sync {
    /// Defines the user-specified error type.
    ///
    /// This error type should implement the `Error` and `Debug` traits from
    /// the standard library.
    /// Errors of this type are returned to the user when an operation fails.
    type AdapterError: std::error::Error + std::fmt::Debug + Send + Sync + 'static;

    /// The EIP712 domain spend permits on `token` are signed against
    async fn payment_permit_domain(
        &self,
        token: Address,
    ) -> Result<Eip712Domain, Self::AdapterError>;

    /// The next spend-permit nonce of `owner` on `token`
    async fn payment_permit_nonce(
        &self,
        token: Address,
        owner: Address,
    ) -> Result<U256, Self::AdapterError>;

    /// The EIP712 domain transfer permits on `collection` are signed against
    async fn collection_permit_domain(
        &self,
        collection: Address,
    ) -> Result<Eip712Domain, Self::AdapterError>;

    /// The next transfer-permit nonce of `owner` on `collection`
    async fn collection_permit_nonce(
        &self,
        collection: Address,
        owner: Address,
    ) -> Result<U256, Self::AdapterError>;
}
