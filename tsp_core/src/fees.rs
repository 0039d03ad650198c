// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-point fee arithmetic.
//!
//! All cuts are integer basis-point fractions of the sale price with a fixed
//! denominator of 10 000. Both divisions truncate, and the seller receives
//! the remainder, so `service_cut + royalty_cut + seller_proceeds` is always
//! exactly the sale price and truncation never mints value.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{error::Result, Error};

/// Cuts are expressed in basis points of this denominator.
pub const FEE_DENOMINATOR: u64 = 10_000;

/// How one settled item's sale price splits between the parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// `amount × unitPrice`
    pub total: U256,
    /// Marketplace cut, paid to the treasury
    pub service_cut: U256,
    /// Creator cut, paid to the address embedded in the token identifier
    pub royalty_cut: U256,
    /// Remainder, paid to the seller
    pub seller_proceeds: U256,
}

impl FeeBreakdown {
    /// Splits `amount × unit_price` between treasury, creator and seller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeeOverflow`] if the two rates together exceed the
    /// full sale price, and [`Error::AmountOverflow`] if any product
    /// overflows 256 bits.
    pub fn resolve(
        amount: U256,
        unit_price: U256,
        service_fee_bps: u16,
        royalty_bps: u16,
    ) -> Result<Self> {
        if u32::from(service_fee_bps) + u32::from(royalty_bps) > FEE_DENOMINATOR as u32 {
            return Err(Error::FeeOverflow {
                service_fee_bps,
                royalty_bps,
            });
        }

        let total = amount.checked_mul(unit_price).ok_or(Error::AmountOverflow)?;
        let denominator = U256::from(FEE_DENOMINATOR);
        let service_cut = total
            .checked_mul(U256::from(service_fee_bps))
            .ok_or(Error::AmountOverflow)?
            / denominator;
        let royalty_cut = total
            .checked_mul(U256::from(royalty_bps))
            .ok_or(Error::AmountOverflow)?
            / denominator;

        // The two truncated cuts never exceed total once the bps sum is
        // capped at the denominator.
        let seller_proceeds = total - service_cut - royalty_cut;

        Ok(Self {
            total,
            service_cut,
            royalty_cut,
            seller_proceeds,
        })
    }
}
