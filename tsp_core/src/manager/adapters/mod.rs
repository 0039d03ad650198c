// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Context adapters for the settlement manager.
//!
//! Each adapter should be defined by the user of the library based on their
//! specific storage and transfer requirements. The manager only ever reads
//! through [`GovernanceRead`], [`NonceRead`] and [`PermitRead`]; every
//! mutation travels in one [`SettlementPlan`] applied by
//! [`SettlementExecutor`].

mod executor;
mod governance;
mod nonce;
mod permit;

pub use executor::{Delivery, NonceCommit, Payout, PermitCommit, SettlementExecutor, SettlementPlan};
pub use governance::GovernanceRead;
pub use nonce::NonceRead;
pub use permit::PermitRead;
