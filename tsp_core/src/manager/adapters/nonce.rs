// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

/// Read access to the per-subject protocol nonce counters.
///
/// Counters start at zero, only ever advance, and advance exactly once per
/// settlement, inside the [`super::SettlementPlan`] commit, never here.
///
/// # Example
///
/// For example code see [crate::manager::context::memory::InMemoryMarket]
#[async_trait]
pub trait NonceRead: Send + Sync {
    /// Defines the user-specified error type.
    ///
    /// This error type should implement the `Error` and `Debug` traits from
    /// the standard library.
    /// Errors of this type are returned to the user when an operation fails.
    type AdapterError: std::error::Error + std::fmt::Debug + Send + Sync + 'static;

    /// The next expected nonce for `subject`
    async fn next_nonce(&self, subject: Address) -> Result<U256, Self::AdapterError>;
}
