// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Packed token identifier codec.
//!
//! A token identifier embeds its royalty rate, type tag, supply cap,
//! reserved bits and creator address at fixed offsets of one 256-bit
//! integer, so any holder of the identifier can recover the royalty
//! obligation without an auxiliary lookup table:
//!
//! ```text
//! | royalty bps | type tag | supply cap | reserved | creator address |
//! |   16 bits   |  16 bits |   32 bits  |  32 bits |     160 bits    |
//! ```

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Royalty rates are basis points; 10 000 bps is 100%.
pub const MAX_ROYALTY_BPS: u16 = 10_000;

const ROYALTY_SHIFT: usize = 240;
const TYPE_SHIFT: usize = 224;
const SUPPLY_SHIFT: usize = 192;
const RESERVED_SHIFT: usize = 160;

/// Errors returned when packing a token identifier
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenIdError {
    #[error("field overflow: royalty of {royalty_bps} bps exceeds {MAX_ROYALTY_BPS}")]
    FieldOverflow { royalty_bps: u16 },
}

/// The unpacked fields of a token identifier
///
/// Field widths are the encoding contract: every value representable here
/// except `royalty_bps > 10_000` packs into an identifier and unpacks back
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Creator-owed fee in basis points, at most [`MAX_ROYALTY_BPS`]
    pub royalty_bps: u16,
    /// Token-standard tag, `1155` for the collectible template
    pub token_type: u16,
    /// Maximum mintable supply of this identifier
    pub supply_cap: u32,
    /// Reserved for future use, round-tripped verbatim
    pub reserved: u32,
    /// Address the royalty cut is paid to
    pub creator: Address,
}

impl TokenDescriptor {
    /// Packs the descriptor into a token identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIdError::FieldOverflow`] if the royalty rate exceeds
    /// 100%. The remaining fields cannot overflow their widths by type.
    pub fn encode(&self) -> Result<U256, TokenIdError> {
        if self.royalty_bps > MAX_ROYALTY_BPS {
            return Err(TokenIdError::FieldOverflow {
                royalty_bps: self.royalty_bps,
            });
        }
        Ok((U256::from(self.royalty_bps) << ROYALTY_SHIFT)
            | (U256::from(self.token_type) << TYPE_SHIFT)
            | (U256::from(self.supply_cap) << SUPPLY_SHIFT)
            | (U256::from(self.reserved) << RESERVED_SHIFT)
            | U256::from_be_bytes(self.creator.into_word().0))
    }

    /// Unpacks a token identifier. Total: every 256-bit value decodes.
    pub fn decode(token_id: U256) -> Self {
        let creator_word = B256::from(token_id & (U256::MAX >> 96));
        Self {
            royalty_bps: (token_id >> ROYALTY_SHIFT).to::<u16>(),
            token_type: ((token_id >> TYPE_SHIFT) & U256::from(u16::MAX)).to::<u16>(),
            supply_cap: ((token_id >> SUPPLY_SHIFT) & U256::from(u32::MAX)).to::<u32>(),
            reserved: ((token_id >> RESERVED_SHIFT) & U256::from(u32::MAX)).to::<u32>(),
            creator: Address::from_word(creator_word),
        }
    }
}

#[cfg(test)]
mod token_id_unit_test {
    use alloy::primitives::address;
    use rstest::*;

    use super::*;

    #[fixture]
    fn creator() -> Address {
        address!("abababababababababababababababababababab")
    }

    #[rstest]
    #[case::collectible(250, 1155, 200_000, 0)]
    #[case::zeroed(0, 0, 0, 0)]
    #[case::saturated(10_000, u16::MAX, u32::MAX, u32::MAX)]
    fn descriptor_round_trips(
        creator: Address,
        #[case] royalty_bps: u16,
        #[case] token_type: u16,
        #[case] supply_cap: u32,
        #[case] reserved: u32,
    ) {
        let descriptor = TokenDescriptor {
            royalty_bps,
            token_type,
            supply_cap,
            reserved,
            creator,
        };
        let token_id = descriptor.encode().unwrap();
        assert_eq!(TokenDescriptor::decode(token_id), descriptor);
    }

    #[rstest]
    fn royalty_above_full_price_is_rejected(creator: Address) {
        let descriptor = TokenDescriptor {
            royalty_bps: MAX_ROYALTY_BPS + 1,
            token_type: 1155,
            supply_cap: 1,
            reserved: 0,
            creator,
        };
        assert_eq!(
            descriptor.encode(),
            Err(TokenIdError::FieldOverflow {
                royalty_bps: MAX_ROYALTY_BPS + 1
            })
        );
    }

    #[rstest]
    fn creator_occupies_the_low_bits(creator: Address) {
        let descriptor = TokenDescriptor {
            royalty_bps: 250,
            token_type: 1155,
            supply_cap: 200_000,
            reserved: 0,
            creator,
        };
        let token_id = descriptor.encode().unwrap();
        assert_eq!(Address::from_word(B256::from(token_id << 96 >> 96)), creator);
        assert_eq!(TokenDescriptor::decode(token_id).royalty_bps, 250);
    }
}
