// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the settlement error type
//!

use std::result::Result as StdResult;

use alloy::primitives::{Address, U256};
use thiserror::Error as ThisError;
use tsp_eip712_message::Eip712Error;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("verifier signature recovered to {recovered}, trusted verifier is {expected}")]
    InvalidVerifierSignature {
        recovered: Address,
        expected: Address,
    },
    #[error("receipt expired: deadline {deadline} is before current time {current_timestamp}")]
    ReceiptExpired {
        deadline: U256,
        current_timestamp: u64,
    },
    #[error("nonce mismatch: receipt carries {presented}, next expected is {expected}")]
    NonceMismatch { presented: U256, expected: U256 },
    #[error("payment asset {asset} is not registered for settlement")]
    UnregisteredAsset { asset: Address },
    #[error("buyer permit does not verify for {owner}")]
    InvalidBuyerPermit { owner: Address },
    #[error("buyer permit expired: deadline {deadline} is before current time {current_timestamp}")]
    BuyerPermitExpired {
        deadline: U256,
        current_timestamp: u64,
    },
    #[error("seller permit does not verify for {owner}")]
    InvalidSellerPermit { owner: Address },
    #[error("seller permit expired: deadline {deadline} is before current time {current_timestamp}")]
    SellerPermitExpired {
        deadline: U256,
        current_timestamp: u64,
    },
    #[error(
        "fee overflow: service fee of {service_fee_bps} bps plus royalty of {royalty_bps} bps \
         exceeds the full sale price"
    )]
    FeeOverflow {
        service_fee_bps: u16,
        royalty_bps: u16,
    },
    #[error(
        "bulk sequences disagree in length: {amounts} amounts, {token_ids} token ids, \
         {unit_prices} unit prices, {token_uris} token URIs"
    )]
    LengthMismatch {
        amounts: usize,
        token_ids: usize,
        unit_prices: usize,
        token_uris: usize,
    },
    #[error("attached value {attached} is neither zero nor the settlement total {expected}")]
    AttachedValueMismatch { attached: U256, expected: U256 },
    #[error("settlement amount overflows 256 bits")]
    AmountOverflow,
    #[error(transparent)]
    SignatureError(#[from] Eip712Error),
    #[error("failed to get current system time: {source_error_message} ")]
    InvalidSystemTime { source_error_message: String },
    #[error("error from adapter: {source_error}")]
    AdapterError { source_error: anyhow::Error },
}

pub type Result<T> = StdResult<T, Error>;
