// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::Address;
use async_trait::async_trait;

/// Read access to the governance registry.
///
/// The registry owns the trusted identities and the accepted payment-asset
/// set; the manager only reads them. Registration, verifier rotation and
/// marketplace binding are an administrative concern outside this library.
///
/// # Example
///
/// For example code see [crate::manager::context::memory::InMemoryMarket]
#[async_trait]
pub trait GovernanceRead: Send + Sync {
    /// Defines the user-specified error type.
    ///
    /// This error type should implement the `Error` and `Debug` traits from
    /// the standard library.
    /// Errors of this type are returned to the user when an operation fails.
    type AdapterError: std::error::Error + std::fmt::Debug + Send + Sync + 'static;

    /// The address every service cut is paid to
    async fn treasury(&self) -> Result<Address, Self::AdapterError>;

    /// The identity whose countersignature makes a receipt redeemable
    async fn verifier(&self) -> Result<Address, Self::AdapterError>;

    /// The authoritative marketplace contract address
    async fn marketplace(&self) -> Result<Address, Self::AdapterError>;

    /// Whether `asset` is accepted for settlement
    async fn is_payment_token(&self, asset: Address) -> Result<bool, Self::AdapterError>;
}
