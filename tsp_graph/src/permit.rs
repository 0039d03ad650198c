// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Permit schemas signed by the counterparties.
//!
//! Each permit is verified against the *asset's own* EIP712 domain (the
//! payment token's for spend permits, the collection's for transfer
//! permits), not the marketplace domain. Both schemas keep the Solidity
//! type name `Permit`, so they live in separate modules.

/// Delegated-spend permit over a payment asset.
pub mod payment {
    use alloy::sol;
    use serde::{Deserialize, Serialize};

    sol! {
        /// One-time authorization for `spender` to move `value` of the
        /// signing owner's payment-asset balance
        #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
        struct Permit {
            address owner;
            address spender;
            uint256 value;
            uint256 nonce;
            uint256 deadline;
        }
    }
}

/// Delegated-transfer permit over a collection.
pub mod collection {
    use alloy::sol;
    use serde::{Deserialize, Serialize};

    sol! {
        /// One-time authorization for `spender` to move the signing owner's
        /// items on the collection
        #[derive(Debug, Serialize, Deserialize, Eq, PartialEq)]
        struct Permit {
            address owner;
            address spender;
            uint256 nonce;
            uint256 deadline;
        }
    }
}
