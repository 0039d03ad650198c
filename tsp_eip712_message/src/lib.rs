// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # EIP712 signed message
//!
//! This crate contains the `Eip712SignedMessage` struct which is used to sign
//! and verify messages using the EIP712 standard, together with
//! `SignatureComponents`, the split `(r, s, v)` form in which counterparty
//! signatures travel inside settlement receipts.
//!
//! # Example
//! ```rust
//! use alloy::{
//!     primitives::Address,
//!     signers::local::PrivateKeySigner,
//!     sol,
//!     sol_types::eip712_domain,
//! };
//! use tsp_eip712_message::Eip712SignedMessage;
//!
//! sol! {
//!     struct Order {
//!         address maker;
//!         uint256 price;
//!     }
//! }
//!
//! let domain_separator = eip712_domain! {
//!     name: "Marketplace",
//!     version: "v1",
//!     chain_id: 1,
//!     verifying_contract: Address::from([0x11u8; 20]),
//! };
//! let wallet = PrivateKeySigner::random();
//! let wallet_address = wallet.address();
//! let message = Order { maker: wallet_address, price: alloy::primitives::U256::from(100) };
//!
//! let signed_message = Eip712SignedMessage::new(&domain_separator, message, &wallet).unwrap();
//! let signer = signed_message.recover_signer(&domain_separator).unwrap();
//!
//! assert_eq!(signer, wallet_address);
//! ```

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, Signature, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
    sol_types::SolStruct,
};
use serde::{Deserialize, Serialize};

/// Errors returned by creation of messages and signature recovery
#[derive(thiserror::Error, Debug)]
pub enum Eip712Error {
    /// `alloy` wallet error
    #[error(transparent)]
    WalletError(#[from] alloy::signers::Error),

    /// `alloy` signature error
    #[error(transparent)]
    SignatureError(#[from] alloy::primitives::SignatureError),

    /// The `v` byte of a split signature is not a recovery id
    #[error("invalid recovery byte: {v} (expected 0, 1, 27 or 28)")]
    InvalidRecoveryByte { v: u8 },
}

/// EIP712 signed message
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Eip712SignedMessage<M: SolStruct> {
    /// Message to be signed
    pub message: M,
    /// ECDSA Signature of eip712 hash of message
    pub signature: Signature,
}

/// Unique identifier for a message
///
/// This is the domain-separated EIP712 signing hash of the message contents,
/// excluding the signature. Two identical messages signed by different
/// signers share the same id, so it identifies the terms, not the signer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub B256);

impl<M: SolStruct> Eip712SignedMessage<M> {
    /// Creates a signed message with signed EIP712 hash of `message` using `signing_wallet`
    ///
    /// # Errors
    ///
    /// Returns [`Eip712Error::WalletError`] if could not sign using the wallet
    ///
    pub fn new(
        domain_separator: &Eip712Domain,
        message: M,
        signing_wallet: &PrivateKeySigner,
    ) -> Result<Self, Eip712Error> {
        let recovery_message_hash = message.eip712_signing_hash(domain_separator);

        let signature = signing_wallet.sign_hash_sync(&recovery_message_hash)?;

        Ok(Self { message, signature })
    }

    /// Recovers and returns the signer of the message from the signature.
    pub fn recover_signer(&self, domain_separator: &Eip712Domain) -> Result<Address, Eip712Error> {
        let recovery_message_hash = self.message.eip712_signing_hash(domain_separator);
        let recovered_address = self
            .signature
            .recover_address_from_prehash(&recovery_message_hash)?;
        Ok(recovered_address)
    }

    /// Returns the domain-separated digest identifying the message terms.
    pub fn unique_hash(&self, domain_separator: &Eip712Domain) -> MessageId {
        MessageId(self.message.eip712_signing_hash(domain_separator))
    }
}

/// An ECDSA signature split into its `(r, s, v)` components.
///
/// Counterparty authorizations are embedded in receipts field by field rather
/// than as a 65-byte blob, so the components are a first-class type here.
/// `v` is accepted in both raw parity (0/1) and Ethereum (27/28) form.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SignatureComponents {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl SignatureComponents {
    /// Signs the EIP712 hash of `message` and returns the split signature.
    pub fn sign<M: SolStruct>(
        domain_separator: &Eip712Domain,
        message: &M,
        signing_wallet: &PrivateKeySigner,
    ) -> Result<Self, Eip712Error> {
        let hash = message.eip712_signing_hash(domain_separator);
        let signature = signing_wallet.sign_hash_sync(&hash)?;
        Ok(Self::from_signature(&signature))
    }

    /// Splits a compact signature into components, with `v` in Ethereum form.
    pub fn from_signature(signature: &Signature) -> Self {
        Self {
            r: B256::from(signature.r()),
            s: B256::from(signature.s()),
            v: 27 + signature.v() as u8,
        }
    }

    /// Reassembles the components into a compact signature.
    ///
    /// # Errors
    ///
    /// Returns [`Eip712Error::InvalidRecoveryByte`] if `v` is not a recovery id.
    pub fn as_signature(&self) -> Result<Signature, Eip712Error> {
        let parity = match self.v {
            0 | 27 => false,
            1 | 28 => true,
            v => return Err(Eip712Error::InvalidRecoveryByte { v }),
        };
        Ok(Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            parity,
        ))
    }

    /// Recovers the address that produced these components over `prehash`.
    pub fn recover_address_from_prehash(&self, prehash: &B256) -> Result<Address, Eip712Error> {
        Ok(self.as_signature()?.recover_address_from_prehash(prehash)?)
    }
}
