// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Receipt family countersigned by the marketplace verifier.

use alloy::{
    primitives::{Address, U256},
    sol,
};
use serde::{Deserialize, Serialize};
use tsp_eip712_message::{Eip712SignedMessage, SignatureComponents};

/// A receipt countersigned by the trusted verifier
pub type SignedReceipt = Eip712SignedMessage<Receipt>;

/// A bulk receipt countersigned by the trusted verifier
pub type SignedBulkReceipt = Eip712SignedMessage<BulkReceipt>;

sol! {
    /// One party's off-chain consent, embedded in the receipt header as the
    /// split signature of a permit over the party's own asset domain
    ///
    /// We use camelCase for field names to match the Ethereum ABI encoding
    #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
    struct User {
        /// Address the permit signature must recover to
        address addr;
        /// Recovery byte of the permit signature
        uint8 v;
        /// Unix Epoch timestamp in seconds after which the permit is dead
        uint256 deadline;
        /// First half of the permit signature
        bytes32 r;
        /// Second half of the permit signature
        bytes32 s;
    }

    /// Binds the two permits to a specific collection / payment-asset pair
    #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
    struct Header {
        User buyer;
        User seller;
        address nftContract;
        address paymentToken;
    }

    /// A single settlement line: `amount` units of `tokenId` at `unitPrice`
    #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
    struct Item {
        uint256 amount;
        uint256 tokenId;
        uint256 unitPrice;
        string tokenURI;
    }

    /// Parallel sequences generalizing [`Item`] to N settlement lines
    #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
    struct Bulk {
        uint256[] amounts;
        uint256[] tokenIds;
        uint256[] unitPrices;
        string[] tokenURIs;
    }

    /// The unit the verifier countersigns for a single-item settlement
    #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
    struct Receipt {
        Header header;
        Item item;
        /// Protocol nonce, one consumed per settlement
        uint256 nonce;
        /// Unix Epoch timestamp in seconds after which the receipt is dead
        uint256 deadline;
    }

    /// The unit the verifier countersigns for a batch settlement
    #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
    struct BulkReceipt {
        Header header;
        Bulk bulk;
        uint256 nonce;
        uint256 deadline;
    }
}

impl User {
    /// Returns a user entry carrying `signature` over the party's permit
    pub fn new(addr: Address, deadline: U256, signature: SignatureComponents) -> Self {
        Self {
            addr,
            v: signature.v,
            deadline,
            r: signature.r,
            s: signature.s,
        }
    }

    /// The embedded permit signature in component form
    pub fn signature_components(&self) -> SignatureComponents {
        SignatureComponents {
            r: self.r,
            s: self.s,
            v: self.v,
        }
    }
}

impl Item {
    /// The nominal settlement amount, `amount × unitPrice`
    ///
    /// `None` on 256-bit overflow.
    pub fn sale_price(&self) -> Option<U256> {
        self.amount.checked_mul(self.unitPrice)
    }
}

impl Bulk {
    /// Returns the shared length of the four sequences, or `None` if they
    /// disagree
    pub fn aligned_len(&self) -> Option<usize> {
        let len = self.amounts.len();
        (self.tokenIds.len() == len
            && self.unitPrices.len() == len
            && self.tokenURIs.len() == len)
            .then_some(len)
    }

    /// The aggregate nominal settlement amount across all lines
    ///
    /// `None` on 256-bit overflow.
    pub fn sale_price(&self) -> Option<U256> {
        self.amounts
            .iter()
            .zip(self.unitPrices.iter())
            .try_fold(U256::ZERO, |acc, (amount, unit_price)| {
                acc.checked_add(amount.checked_mul(*unit_price)?)
            })
    }
}
