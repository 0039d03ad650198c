// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

/// Advances the protocol nonce of `subject` from `expected` to
/// `expected + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceCommit {
    pub subject: Address,
    pub expected: U256,
}

/// Consumes one counterparty permit, advancing its counter by exactly one.
///
/// The variants keep the three signature spaces of a settlement apart:
/// spend permits live with the payment token, transfer permits with the
/// collection, and the verifier receipt with the protocol counter in
/// [`NonceCommit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermitCommit {
    /// A delegated-spend permit on a payment token
    Spend {
        token: Address,
        owner: Address,
        nonce: U256,
    },
    /// A delegated-transfer permit on a collection
    Transfer {
        collection: Address,
        owner: Address,
        nonce: U256,
    },
}

/// One payment-asset transfer out of the buyer's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub to: Address,
    pub amount: U256,
}

/// One item transfer from the seller to the buyer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub token_id: U256,
    pub amount: U256,
}

/// Every mutation of one settlement, applied all-or-nothing.
///
/// The manager's gates are read-only; this plan is the only thing that
/// touches state. `payouts` are drawn from `buyer`'s balance on
/// `payment_token`; `deliveries` move from `seller` to `buyer` on
/// `nft_contract`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub nonce: NonceCommit,
    pub permits: Vec<PermitCommit>,
    pub payment_token: Address,
    pub nft_contract: Address,
    pub buyer: Address,
    pub seller: Address,
    pub payouts: Vec<Payout>,
    pub deliveries: Vec<Delivery>,
}

/// Applies settlement plans.
///
/// # Example
///
/// For example code see [crate::manager::context::memory::InMemoryMarket]
#[async_trait]
pub trait SettlementExecutor: Send + Sync {
    /// Defines the user-specified error type.
    ///
    /// This error type should implement the `Error` and `Debug` traits from
    /// the standard library.
    /// Errors of this type are returned to the user when an operation fails.
    type AdapterError: std::error::Error + std::fmt::Debug + Send + Sync + 'static;

    /// Applies the whole plan or none of it.
    ///
    /// Implementations must be commit-or-abort: if any nonce has gone
    /// stale, any permit counter does not match, or any transfer cannot be
    /// covered, no counter advances and no balance moves. A failure here
    /// must leave observable state as if the settlement was never
    /// attempted.
    async fn execute(&self, plan: &SettlementPlan) -> Result<(), Self::AdapterError>;
}
