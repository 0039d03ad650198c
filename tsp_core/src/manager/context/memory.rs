// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory context implementation for the settlement manager.
//!
//! This module provides an in-memory implementation of the manager context.
//! It is useful for testing and development purposes: payment-asset
//! balances, collection holdings, permit counters and protocol nonces all
//! live behind one lock, so a settlement plan commits or aborts as a unit.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, U256},
};
use async_trait::async_trait;
use thiserror::Error;

use crate::manager::adapters::{
    GovernanceRead, NonceRead, PermitCommit, PermitRead, SettlementExecutor, SettlementPlan,
};

#[derive(Debug, Error)]
pub enum InMemoryError {
    #[error("unknown payment token {token}")]
    UnknownPaymentToken { token: Address },
    #[error("unknown collection {collection}")]
    UnknownCollection { collection: Address },
    #[error("stale protocol nonce for {subject}")]
    StaleNonce { subject: Address },
    #[error("stale permit nonce for {owner}")]
    StalePermitNonce { owner: Address },
    #[error("{owner} holds {held} of the payment token, cannot cover {needed}")]
    InsufficientBalance {
        owner: Address,
        held: U256,
        needed: U256,
    },
    #[error("{owner} does not hold {needed} of token {token_id}")]
    InsufficientHoldings {
        owner: Address,
        token_id: U256,
        needed: U256,
    },
}

/// A registered payment asset: its permit domain inputs and its ledger
#[derive(Debug, Default)]
struct PaymentTokenState {
    name: String,
    version: String,
    balances: HashMap<Address, U256>,
    permit_nonces: HashMap<Address, U256>,
}

/// A known collection: its permit domain inputs and its holdings
#[derive(Debug, Default)]
struct CollectionState {
    name: String,
    version: String,
    /// token id -> owner -> amount held
    holdings: HashMap<U256, HashMap<Address, U256>>,
    permit_nonces: HashMap<Address, U256>,
}

#[derive(Debug)]
struct MarketState {
    chain_id: u64,
    treasury: Address,
    verifier: Address,
    marketplace: Address,
    payment_tokens: HashMap<Address, PaymentTokenState>,
    collections: HashMap<Address, CollectionState>,
    nonces: HashMap<Address, U256>,
}

/// In-memory market: governance facts plus every ledger a settlement
/// touches, shareable across clones as needed
#[derive(Clone)]
pub struct InMemoryMarket {
    state: Arc<RwLock<MarketState>>,
}

impl InMemoryMarket {
    pub fn new(chain_id: u64, treasury: Address, verifier: Address, marketplace: Address) -> Self {
        Self {
            state: Arc::new(RwLock::new(MarketState {
                chain_id,
                treasury,
                verifier,
                marketplace,
                payment_tokens: HashMap::new(),
                collections: HashMap::new(),
                nonces: HashMap::new(),
            })),
        }
    }

    /// Registers `token` for settlement under its permit domain inputs.
    pub fn register_payment_token(&self, token: Address, name: &str, version: &str) {
        let mut state = self.state.write().unwrap();
        state.payment_tokens.insert(
            token,
            PaymentTokenState {
                name: name.to_owned(),
                version: version.to_owned(),
                ..Default::default()
            },
        );
    }

    /// Makes `collection` known under its permit domain inputs.
    pub fn register_collection(&self, collection: Address, name: &str, version: &str) {
        let mut state = self.state.write().unwrap();
        state.collections.insert(
            collection,
            CollectionState {
                name: name.to_owned(),
                version: version.to_owned(),
                ..Default::default()
            },
        );
    }

    pub fn increase_balance(
        &self,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), InMemoryError> {
        let mut state = self.state.write().unwrap();
        let asset = state
            .payment_tokens
            .get_mut(&token)
            .ok_or(InMemoryError::UnknownPaymentToken { token })?;
        *asset.balances.entry(owner).or_default() += amount;
        Ok(())
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        let state = self.state.read().unwrap();
        state
            .payment_tokens
            .get(&token)
            .and_then(|asset| asset.balances.get(&owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn mint_items(
        &self,
        collection: Address,
        token_id: U256,
        owner: Address,
        amount: U256,
    ) -> Result<(), InMemoryError> {
        let mut state = self.state.write().unwrap();
        let collection_state = state
            .collections
            .get_mut(&collection)
            .ok_or(InMemoryError::UnknownCollection { collection })?;
        *collection_state
            .holdings
            .entry(token_id)
            .or_default()
            .entry(owner)
            .or_default() += amount;
        Ok(())
    }

    pub fn holdings_of(&self, collection: Address, token_id: U256, owner: Address) -> U256 {
        let state = self.state.read().unwrap();
        state
            .collections
            .get(&collection)
            .and_then(|collection_state| collection_state.holdings.get(&token_id))
            .and_then(|owners| owners.get(&owner))
            .copied()
            .unwrap_or_default()
    }
}

impl MarketState {
    fn permit_domain(
        &self,
        name: &str,
        version: &str,
        verifying_contract: Address,
    ) -> Eip712Domain {
        Eip712Domain::new(
            Some(name.to_owned().into()),
            Some(version.to_owned().into()),
            Some(U256::from(self.chain_id)),
            Some(verifying_contract),
            None,
        )
    }

    /// Validates every precondition of `plan` without touching anything.
    fn check_plan(&self, plan: &SettlementPlan) -> Result<(), InMemoryError> {
        let current = self
            .nonces
            .get(&plan.nonce.subject)
            .copied()
            .unwrap_or_default();
        if current != plan.nonce.expected {
            return Err(InMemoryError::StaleNonce {
                subject: plan.nonce.subject,
            });
        }

        for permit in &plan.permits {
            match permit {
                PermitCommit::Spend {
                    token,
                    owner,
                    nonce,
                } => {
                    let asset = self
                        .payment_tokens
                        .get(token)
                        .ok_or(InMemoryError::UnknownPaymentToken { token: *token })?;
                    if asset.permit_nonces.get(owner).copied().unwrap_or_default() != *nonce {
                        return Err(InMemoryError::StalePermitNonce { owner: *owner });
                    }
                }
                PermitCommit::Transfer {
                    collection,
                    owner,
                    nonce,
                } => {
                    let collection_state = self.collections.get(collection).ok_or(
                        InMemoryError::UnknownCollection {
                            collection: *collection,
                        },
                    )?;
                    if collection_state
                        .permit_nonces
                        .get(owner)
                        .copied()
                        .unwrap_or_default()
                        != *nonce
                    {
                        return Err(InMemoryError::StalePermitNonce { owner: *owner });
                    }
                }
            }
        }

        let asset = self
            .payment_tokens
            .get(&plan.payment_token)
            .ok_or(InMemoryError::UnknownPaymentToken {
                token: plan.payment_token,
            })?;
        let held = asset
            .balances
            .get(&plan.buyer)
            .copied()
            .unwrap_or_default();
        let mut remaining = held;
        for payout in &plan.payouts {
            remaining =
                remaining
                    .checked_sub(payout.amount)
                    .ok_or(InMemoryError::InsufficientBalance {
                        owner: plan.buyer,
                        held,
                        needed: payout.amount,
                    })?;
        }

        let collection_state =
            self.collections
                .get(&plan.nft_contract)
                .ok_or(InMemoryError::UnknownCollection {
                    collection: plan.nft_contract,
                })?;
        let mut needed_per_token: HashMap<U256, U256> = HashMap::new();
        for delivery in &plan.deliveries {
            *needed_per_token.entry(delivery.token_id).or_default() += delivery.amount;
        }
        for (token_id, needed) in needed_per_token {
            let held = collection_state
                .holdings
                .get(&token_id)
                .and_then(|owners| owners.get(&plan.seller))
                .copied()
                .unwrap_or_default();
            if held < needed {
                return Err(InMemoryError::InsufficientHoldings {
                    owner: plan.seller,
                    token_id,
                    needed,
                });
            }
        }

        Ok(())
    }

    /// Applies `plan`. Infallible once [`Self::check_plan`] has passed.
    fn apply_plan(&mut self, plan: &SettlementPlan) {
        *self.nonces.entry(plan.nonce.subject).or_default() += U256::from(1);

        for permit in &plan.permits {
            match permit {
                PermitCommit::Spend { token, owner, .. } => {
                    let asset = self.payment_tokens.get_mut(token).unwrap();
                    *asset.permit_nonces.entry(*owner).or_default() += U256::from(1);
                }
                PermitCommit::Transfer {
                    collection, owner, ..
                } => {
                    let collection_state = self.collections.get_mut(collection).unwrap();
                    *collection_state.permit_nonces.entry(*owner).or_default() += U256::from(1);
                }
            }
        }

        let asset = self.payment_tokens.get_mut(&plan.payment_token).unwrap();
        for payout in &plan.payouts {
            *asset.balances.entry(plan.buyer).or_default() -= payout.amount;
            *asset.balances.entry(payout.to).or_default() += payout.amount;
        }

        let collection_state = self.collections.get_mut(&plan.nft_contract).unwrap();
        for delivery in &plan.deliveries {
            let owners = collection_state.holdings.entry(delivery.token_id).or_default();
            *owners.entry(plan.seller).or_default() -= delivery.amount;
            *owners.entry(plan.buyer).or_default() += delivery.amount;
        }
    }
}

#[async_trait]
impl GovernanceRead for InMemoryMarket {
    type AdapterError = InMemoryError;

    async fn treasury(&self) -> Result<Address, Self::AdapterError> {
        Ok(self.state.read().unwrap().treasury)
    }

    async fn verifier(&self) -> Result<Address, Self::AdapterError> {
        Ok(self.state.read().unwrap().verifier)
    }

    async fn marketplace(&self) -> Result<Address, Self::AdapterError> {
        Ok(self.state.read().unwrap().marketplace)
    }

    async fn is_payment_token(&self, asset: Address) -> Result<bool, Self::AdapterError> {
        Ok(self.state.read().unwrap().payment_tokens.contains_key(&asset))
    }
}

#[async_trait]
impl NonceRead for InMemoryMarket {
    type AdapterError = InMemoryError;

    async fn next_nonce(&self, subject: Address) -> Result<U256, Self::AdapterError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .nonces
            .get(&subject)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PermitRead for InMemoryMarket {
    type AdapterError = InMemoryError;

    async fn payment_permit_domain(
        &self,
        token: Address,
    ) -> Result<Eip712Domain, Self::AdapterError> {
        let state = self.state.read().unwrap();
        let asset = state
            .payment_tokens
            .get(&token)
            .ok_or(InMemoryError::UnknownPaymentToken { token })?;
        Ok(state.permit_domain(&asset.name, &asset.version, token))
    }

    async fn payment_permit_nonce(
        &self,
        token: Address,
        owner: Address,
    ) -> Result<U256, Self::AdapterError> {
        let state = self.state.read().unwrap();
        let asset = state
            .payment_tokens
            .get(&token)
            .ok_or(InMemoryError::UnknownPaymentToken { token })?;
        Ok(asset.permit_nonces.get(&owner).copied().unwrap_or_default())
    }

    async fn collection_permit_domain(
        &self,
        collection: Address,
    ) -> Result<Eip712Domain, Self::AdapterError> {
        let state = self.state.read().unwrap();
        let collection_state = state
            .collections
            .get(&collection)
            .ok_or(InMemoryError::UnknownCollection { collection })?;
        Ok(state.permit_domain(
            &collection_state.name,
            &collection_state.version,
            collection,
        ))
    }

    async fn collection_permit_nonce(
        &self,
        collection: Address,
        owner: Address,
    ) -> Result<U256, Self::AdapterError> {
        let state = self.state.read().unwrap();
        let collection_state = state
            .collections
            .get(&collection)
            .ok_or(InMemoryError::UnknownCollection { collection })?;
        Ok(collection_state
            .permit_nonces
            .get(&owner)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SettlementExecutor for InMemoryMarket {
    type AdapterError = InMemoryError;

    async fn execute(&self, plan: &SettlementPlan) -> Result<(), Self::AdapterError> {
        let mut state = self.state.write().unwrap();
        state.check_plan(plan)?;
        state.apply_plan(plan);
        Ok(())
    }
}
