// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{address, keccak256, Address, U256},
    signers::local::PrivateKeySigner,
};
use tsp_core::{
    factory::{CollectionFactory, CollectionParams},
    manager::{context::memory::InMemoryMarket, Marketplace},
    market_eip712_domain,
};
use tsp_eip712_message::{Eip712SignedMessage, SignatureComponents};
use tsp_graph::{
    permit, Bulk, BulkReceipt, Header, Item, Receipt, SignedBulkReceipt, SignedReceipt,
    TokenDescriptor, User,
};

pub const CHAIN_ID: u64 = 31337;
pub const SERVICE_FEE_BPS: u16 = 250;
pub const TOKEN_URI: &str = "https://triton.com/token";

pub struct TestMarket {
    pub marketplace: Marketplace<InMemoryMarket>,
    pub context: InMemoryMarket,
    pub domain: Eip712Domain,
    pub verifier: PrivateKeySigner,
    pub buyer: PrivateKeySigner,
    pub seller: PrivateKeySigner,
    pub creator: Address,
    pub treasury: Address,
    pub payment_token: Address,
    pub collection: Address,
    pub marketplace_address: Address,
}

/// One market with a registered payment token and a factory-deployed
/// collection, mirroring the governance wiring a deployment would do.
pub fn setup() -> TestMarket {
    let verifier = PrivateKeySigner::random();
    let buyer = PrivateKeySigner::random();
    let seller = PrivateKeySigner::random();
    let creator = address!("abababababababababababababababababababab");
    let treasury = address!("7e57000000000000000000000000000000000001");
    let marketplace_address = address!("cccccccccccccccccccccccccccccccccccccccc");
    let payment_token = address!("1234567890abcdef1234567890abcdef12345678");

    let context = InMemoryMarket::new(CHAIN_ID, treasury, verifier.address(), marketplace_address);
    context.register_payment_token(payment_token, "PaymentToken", "1");

    let factory = CollectionFactory::new(
        address!("fac7000000000000000000000000000000000000"),
        keccak256(b"collectible-template"),
    );
    let collection = factory
        .deploy(&CollectionParams {
            name: "Triton".into(),
            symbol: "TNT".into(),
            base_uri: String::new(),
        })
        .unwrap();
    context.register_collection(collection, "Triton", "v1");

    let domain = market_eip712_domain(CHAIN_ID, marketplace_address);
    let marketplace = Marketplace::new(
        domain.clone(),
        marketplace_address,
        SERVICE_FEE_BPS,
        context.clone(),
    );

    TestMarket {
        marketplace,
        context,
        domain,
        verifier,
        buyer,
        seller,
        creator,
        treasury,
        payment_token,
        collection,
        marketplace_address,
    }
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn far_deadline() -> U256 {
    U256::from(now() + 600)
}

/// A collectible identifier carrying `royalty_bps` owed to `creator`.
pub fn collectible_token_id(royalty_bps: u16, creator: Address) -> U256 {
    TokenDescriptor {
        royalty_bps,
        token_type: 1155,
        supply_cap: 200_000,
        reserved: 0,
        creator,
    }
    .encode()
    .unwrap()
}

pub fn payment_permit_domain(token: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some("PaymentToken".into()),
        Some("1".into()),
        Some(U256::from(CHAIN_ID)),
        Some(token),
        None,
    )
}

pub fn collection_permit_domain(collection: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some("Triton".into()),
        Some("v1".into()),
        Some(U256::from(CHAIN_ID)),
        Some(collection),
        None,
    )
}

/// Signs the buyer's spend permit for `value` and embeds it in a header
/// entry.
pub fn buyer_user(
    wallet: &PrivateKeySigner,
    token: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    deadline: U256,
) -> User {
    let message = permit::payment::Permit {
        owner: wallet.address(),
        spender,
        value,
        nonce,
        deadline,
    };
    let components =
        SignatureComponents::sign(&payment_permit_domain(token), &message, wallet).unwrap();
    User::new(wallet.address(), deadline, components)
}

/// Signs the seller's transfer permit and embeds it in a header entry.
pub fn seller_user(
    wallet: &PrivateKeySigner,
    collection: Address,
    spender: Address,
    nonce: U256,
    deadline: U256,
) -> User {
    let message = permit::collection::Permit {
        owner: wallet.address(),
        spender,
        nonce,
        deadline,
    };
    let components =
        SignatureComponents::sign(&collection_permit_domain(collection), &message, wallet).unwrap();
    User::new(wallet.address(), deadline, components)
}

pub fn header_for(market: &TestMarket, total: U256, deadline: U256) -> Header {
    Header {
        buyer: buyer_user(
            &market.buyer,
            market.payment_token,
            market.marketplace_address,
            total,
            U256::ZERO,
            deadline,
        ),
        seller: seller_user(
            &market.seller,
            market.collection,
            market.marketplace_address,
            U256::ZERO,
            deadline,
        ),
        nftContract: market.collection,
        paymentToken: market.payment_token,
    }
}

pub fn single_receipt(
    market: &TestMarket,
    amount: u64,
    unit_price: u64,
    token_id: U256,
    nonce: U256,
    deadline: U256,
) -> Receipt {
    let total = U256::from(amount) * U256::from(unit_price);
    Receipt {
        header: header_for(market, total, deadline),
        item: Item {
            amount: U256::from(amount),
            tokenId: token_id,
            unitPrice: U256::from(unit_price),
            tokenURI: TOKEN_URI.into(),
        },
        nonce,
        deadline,
    }
}

/// Bulk receipt over `(amount, token_id, unit_price)` lines sharing one
/// header; the buyer permit covers the aggregate.
pub fn bulk_receipt(
    market: &TestMarket,
    lines: &[(u64, U256, u64)],
    nonce: U256,
    deadline: U256,
) -> BulkReceipt {
    let total = lines
        .iter()
        .map(|(amount, _, unit_price)| U256::from(*amount) * U256::from(*unit_price))
        .sum();
    BulkReceipt {
        header: header_for(market, total, deadline),
        bulk: Bulk {
            amounts: lines.iter().map(|(amount, _, _)| U256::from(*amount)).collect(),
            tokenIds: lines.iter().map(|(_, token_id, _)| *token_id).collect(),
            unitPrices: lines
                .iter()
                .map(|(_, _, unit_price)| U256::from(*unit_price))
                .collect(),
            tokenURIs: lines.iter().map(|_| TOKEN_URI.to_owned()).collect(),
        },
        nonce,
        deadline,
    }
}

pub fn sign_receipt(market: &TestMarket, receipt: Receipt) -> SignedReceipt {
    Eip712SignedMessage::new(&market.domain, receipt, &market.verifier).unwrap()
}

pub fn sign_bulk_receipt(market: &TestMarket, receipt: BulkReceipt) -> SignedBulkReceipt {
    Eip712SignedMessage::new(&market.domain, receipt, &market.verifier).unwrap()
}
