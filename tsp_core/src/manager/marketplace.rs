// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, U256},
    sol_types::SolStruct,
};
use serde::{Deserialize, Serialize};
use tsp_eip712_message::{Eip712SignedMessage, MessageId};
use tsp_graph::{permit, Header, SignedBulkReceipt, SignedReceipt, TokenDescriptor, User};

use super::adapters::{
    Delivery, GovernanceRead, NonceCommit, NonceRead, Payout, PermitCommit, PermitRead,
    SettlementExecutor, SettlementPlan,
};
use crate::{error::Result, fees::FeeBreakdown, get_current_timestamp_u64, Error};

/// One settled line of the emitted settlement record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledItem {
    pub token_id: U256,
    pub amount: U256,
    pub unit_price: U256,
    pub fees: FeeBreakdown,
}

/// The record emitted exactly once per successful settlement.
///
/// This is the externally observable audit trail; persistence of it is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Domain-separated digest of the redeemed receipt
    pub receipt_digest: MessageId,
    pub buyer: Address,
    pub seller: Address,
    pub payment_token: Address,
    pub nft_contract: Address,
    /// Native value attached to the call, zero for pure permit settlement
    pub attached_value: U256,
    pub items: Vec<SettledItem>,
}

impl Settlement {
    /// Aggregate sale price across all settled items
    pub fn total(&self) -> U256 {
        self.items.iter().map(|item| item.fees.total).sum()
    }

    /// Aggregate treasury cut across all settled items
    pub fn service_cut(&self) -> U256 {
        self.items.iter().map(|item| item.fees.service_cut).sum()
    }

    /// Aggregate creator royalty across all settled items
    pub fn royalty_cut(&self) -> U256 {
        self.items.iter().map(|item| item.fees.royalty_cut).sum()
    }

    /// Aggregate seller proceeds across all settled items
    pub fn seller_proceeds(&self) -> U256 {
        self.items.iter().map(|item| item.fees.seller_proceeds).sum()
    }
}

/// The settlement manager.
///
/// Verifies countersigned receipts against the protocol domain and the two
/// embedded permits against their asset domains, then settles through the
/// context in one commit-or-abort step. Owns no state besides its
/// configuration; everything it reads or mutates goes through the context
/// adapters.
pub struct Marketplace<E> {
    /// Context that implements adapters
    context: E,

    /// Domain separator all verifier receipts are checked against
    domain_separator: Eip712Domain,

    /// The marketplace's own address: permit spender and nonce subject
    address: Address,

    /// Treasury cut of every sale, in basis points
    service_fee_bps: u16,
}

impl<E> Marketplace<E> {
    /// Creates a new manager with the provided `context`.
    ///
    /// `address` must be the verifying contract of `domain_separator`;
    /// counterparty permits name it as spender and the protocol nonce is
    /// counted against it.
    pub fn new(
        domain_separator: Eip712Domain,
        address: Address,
        service_fee_bps: u16,
        context: E,
    ) -> Self {
        Self {
            context,
            domain_separator,
            address,
            service_fee_bps,
        }
    }
}

fn adapter_error(err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::AdapterError {
        source_error: anyhow::Error::new(err),
    }
}

impl<E> Marketplace<E>
where
    E: GovernanceRead + NonceRead + PermitRead + SettlementExecutor,
{
    /// Settles a single-item receipt.
    ///
    /// The gates run in a fixed order (verifier signature, receipt expiry,
    /// protocol nonce, asset acceptance, buyer permit, seller permit, fee
    /// resolution) and are read-only; the first failing gate aborts with
    /// its error kind and observable state unchanged. All mutations travel
    /// in one [`SettlementPlan`] applied by the context.
    ///
    /// `attached_value` must be zero or exactly the settlement total.
    pub async fn redeem(
        &self,
        signed_receipt: SignedReceipt,
        attached_value: U256,
    ) -> Result<Settlement> {
        let receipt_digest = self.check_verifier(&signed_receipt).await?;
        let receipt = &signed_receipt.message;

        let now = get_current_timestamp_u64()?;
        if receipt.deadline < U256::from(now) {
            return Err(Error::ReceiptExpired {
                deadline: receipt.deadline,
                current_timestamp: now,
            });
        }

        let nonce = self.check_nonce(receipt.nonce).await?;
        self.check_payment_token(receipt.header.paymentToken).await?;

        let total = receipt.item.sale_price().ok_or(Error::AmountOverflow)?;
        let buyer_permit = self.check_buyer_permit(&receipt.header, total, now).await?;
        let seller_permit = self.check_seller_permit(&receipt.header, now).await?;

        let descriptor = TokenDescriptor::decode(receipt.item.tokenId);
        let fees = FeeBreakdown::resolve(
            receipt.item.amount,
            receipt.item.unitPrice,
            self.service_fee_bps,
            descriptor.royalty_bps,
        )?;
        check_attached_value(attached_value, total)?;

        let treasury = self.context.treasury().await.map_err(adapter_error)?;
        let plan = SettlementPlan {
            nonce,
            permits: vec![buyer_permit, seller_permit],
            payment_token: receipt.header.paymentToken,
            nft_contract: receipt.header.nftContract,
            buyer: receipt.header.buyer.addr,
            seller: receipt.header.seller.addr,
            payouts: vec![
                Payout {
                    to: treasury,
                    amount: fees.service_cut,
                },
                Payout {
                    to: descriptor.creator,
                    amount: fees.royalty_cut,
                },
                Payout {
                    to: receipt.header.seller.addr,
                    amount: fees.seller_proceeds,
                },
            ],
            deliveries: vec![Delivery {
                token_id: receipt.item.tokenId,
                amount: receipt.item.amount,
            }],
        };
        self.context.execute(&plan).await.map_err(adapter_error)?;

        let settlement = Settlement {
            receipt_digest,
            buyer: receipt.header.buyer.addr,
            seller: receipt.header.seller.addr,
            payment_token: receipt.header.paymentToken,
            nft_contract: receipt.header.nftContract,
            attached_value,
            items: vec![SettledItem {
                token_id: receipt.item.tokenId,
                amount: receipt.item.amount,
                unit_price: receipt.item.unitPrice,
                fees,
            }],
        };
        log::debug!(
            "settled receipt {:?}: {} item(s), total {}",
            receipt_digest,
            settlement.items.len(),
            total
        );
        Ok(settlement)
    }

    /// Settles a bulk receipt: N items under one header and one protocol
    /// nonce.
    ///
    /// The four parallel sequences must share one length. The buyer permit
    /// covers the aggregate sale price; fees resolve per element, so items
    /// may carry different creators and royalty rates. Aggregate cuts equal
    /// the element-wise application of the single-item protocol.
    pub async fn redeem_bulk(
        &self,
        signed_receipt: SignedBulkReceipt,
        attached_value: U256,
    ) -> Result<Settlement> {
        let receipt_digest = self.check_verifier(&signed_receipt).await?;
        let receipt = &signed_receipt.message;

        let now = get_current_timestamp_u64()?;
        if receipt.deadline < U256::from(now) {
            return Err(Error::ReceiptExpired {
                deadline: receipt.deadline,
                current_timestamp: now,
            });
        }

        let nonce = self.check_nonce(receipt.nonce).await?;
        self.check_payment_token(receipt.header.paymentToken).await?;

        let bulk = &receipt.bulk;
        let len = bulk.aligned_len().ok_or(Error::LengthMismatch {
            amounts: bulk.amounts.len(),
            token_ids: bulk.tokenIds.len(),
            unit_prices: bulk.unitPrices.len(),
            token_uris: bulk.tokenURIs.len(),
        })?;

        let total = bulk.sale_price().ok_or(Error::AmountOverflow)?;
        let buyer_permit = self.check_buyer_permit(&receipt.header, total, now).await?;
        let seller_permit = self.check_seller_permit(&receipt.header, now).await?;

        let treasury = self.context.treasury().await.map_err(adapter_error)?;
        let mut service_total = U256::ZERO;
        let mut proceeds_total = U256::ZERO;
        let mut payouts = Vec::with_capacity(len + 2);
        let mut deliveries = Vec::with_capacity(len);
        let mut items = Vec::with_capacity(len);
        for index in 0..len {
            let amount = bulk.amounts[index];
            let token_id = bulk.tokenIds[index];
            let unit_price = bulk.unitPrices[index];

            let descriptor = TokenDescriptor::decode(token_id);
            let fees =
                FeeBreakdown::resolve(amount, unit_price, self.service_fee_bps, descriptor.royalty_bps)?;

            service_total = service_total
                .checked_add(fees.service_cut)
                .ok_or(Error::AmountOverflow)?;
            proceeds_total = proceeds_total
                .checked_add(fees.seller_proceeds)
                .ok_or(Error::AmountOverflow)?;
            payouts.push(Payout {
                to: descriptor.creator,
                amount: fees.royalty_cut,
            });
            deliveries.push(Delivery { token_id, amount });
            items.push(SettledItem {
                token_id,
                amount,
                unit_price,
                fees,
            });
        }
        payouts.push(Payout {
            to: treasury,
            amount: service_total,
        });
        payouts.push(Payout {
            to: receipt.header.seller.addr,
            amount: proceeds_total,
        });
        check_attached_value(attached_value, total)?;

        let plan = SettlementPlan {
            nonce,
            permits: vec![buyer_permit, seller_permit],
            payment_token: receipt.header.paymentToken,
            nft_contract: receipt.header.nftContract,
            buyer: receipt.header.buyer.addr,
            seller: receipt.header.seller.addr,
            payouts,
            deliveries,
        };
        self.context.execute(&plan).await.map_err(adapter_error)?;

        let settlement = Settlement {
            receipt_digest,
            buyer: receipt.header.buyer.addr,
            seller: receipt.header.seller.addr,
            payment_token: receipt.header.paymentToken,
            nft_contract: receipt.header.nftContract,
            attached_value,
            items,
        };
        log::debug!(
            "settled bulk receipt {:?}: {} item(s), total {}",
            receipt_digest,
            settlement.items.len(),
            total
        );
        Ok(settlement)
    }

    /// Recovers the countersignature over the domain-separated digest and
    /// requires it to be the trusted verifier's.
    async fn check_verifier<M: SolStruct + Sync>(
        &self,
        signed: &Eip712SignedMessage<M>,
    ) -> Result<MessageId> {
        let expected = self.context.verifier().await.map_err(adapter_error)?;
        let recovered = signed.recover_signer(&self.domain_separator)?;
        if recovered != expected {
            return Err(Error::InvalidVerifierSignature {
                recovered,
                expected,
            });
        }
        Ok(signed.unique_hash(&self.domain_separator))
    }

    /// Requires `presented` to be the next protocol nonce; the advance
    /// itself happens in the plan commit.
    async fn check_nonce(&self, presented: U256) -> Result<NonceCommit> {
        let expected = self
            .context
            .next_nonce(self.address)
            .await
            .map_err(adapter_error)?;
        if presented != expected {
            return Err(Error::NonceMismatch {
                presented,
                expected,
            });
        }
        Ok(NonceCommit {
            subject: self.address,
            expected,
        })
    }

    async fn check_payment_token(&self, asset: Address) -> Result<()> {
        if !self
            .context
            .is_payment_token(asset)
            .await
            .map_err(adapter_error)?
        {
            return Err(Error::UnregisteredAsset { asset });
        }
        Ok(())
    }

    /// Verifies the buyer's delegated-spend permit for exactly `total` of
    /// the payment token, reconstructed on the token's own domain.
    async fn check_buyer_permit(
        &self,
        header: &Header,
        total: U256,
        now: u64,
    ) -> Result<PermitCommit> {
        let buyer = &header.buyer;
        if buyer.deadline < U256::from(now) {
            return Err(Error::BuyerPermitExpired {
                deadline: buyer.deadline,
                current_timestamp: now,
            });
        }

        let domain = self
            .context
            .payment_permit_domain(header.paymentToken)
            .await
            .map_err(adapter_error)?;
        let nonce = self
            .context
            .payment_permit_nonce(header.paymentToken, buyer.addr)
            .await
            .map_err(adapter_error)?;
        let message = permit::payment::Permit {
            owner: buyer.addr,
            spender: self.address,
            value: total,
            nonce,
            deadline: buyer.deadline,
        };
        if recover_permit_signer(buyer, &message, &domain) != Some(buyer.addr) {
            return Err(Error::InvalidBuyerPermit { owner: buyer.addr });
        }
        Ok(PermitCommit::Spend {
            token: header.paymentToken,
            owner: buyer.addr,
            nonce,
        })
    }

    /// Verifies the seller's delegated-transfer permit, reconstructed on
    /// the collection's own domain.
    async fn check_seller_permit(&self, header: &Header, now: u64) -> Result<PermitCommit> {
        let seller = &header.seller;
        if seller.deadline < U256::from(now) {
            return Err(Error::SellerPermitExpired {
                deadline: seller.deadline,
                current_timestamp: now,
            });
        }

        let domain = self
            .context
            .collection_permit_domain(header.nftContract)
            .await
            .map_err(adapter_error)?;
        let nonce = self
            .context
            .collection_permit_nonce(header.nftContract, seller.addr)
            .await
            .map_err(adapter_error)?;
        let message = permit::collection::Permit {
            owner: seller.addr,
            spender: self.address,
            nonce,
            deadline: seller.deadline,
        };
        if recover_permit_signer(seller, &message, &domain) != Some(seller.addr) {
            return Err(Error::InvalidSellerPermit { owner: seller.addr });
        }
        Ok(PermitCommit::Transfer {
            collection: header.nftContract,
            owner: seller.addr,
            nonce,
        })
    }
}

/// Recovers the signer of `user`'s embedded components over `message` on
/// `domain`. `None` covers both a mangled signature and a wrong one; the
/// caller maps either to its permit error kind.
fn recover_permit_signer<M: SolStruct>(
    user: &User,
    message: &M,
    domain: &Eip712Domain,
) -> Option<Address> {
    let digest = message.eip712_signing_hash(domain);
    user.signature_components()
        .recover_address_from_prehash(&digest)
        .ok()
}

fn check_attached_value(attached: U256, expected: U256) -> Result<()> {
    if !attached.is_zero() && attached != expected {
        return Err(Error::AttachedValueMismatch { attached, expected });
    }
    Ok(())
}
