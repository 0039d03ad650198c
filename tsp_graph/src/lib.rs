// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Triton settlement protocol structs
//!
//! These structs are the wire contract of the settlement protocol: the
//! receipt family countersigned by the verifier, the permit schemas the
//! counterparties sign against their own asset domains, and the packed
//! token identifier that carries royalty and creator metadata.
//!
//! Field order and naming follow the Ethereum ABI encoding; changing either
//! invalidates every previously issued signature.

pub mod permit;
mod receipt;
pub mod token_id;

pub use receipt::{
    Bulk, BulkReceipt, Header, Item, Receipt, SignedBulkReceipt, SignedReceipt, User,
};
pub use token_id::{TokenDescriptor, TokenIdError};
