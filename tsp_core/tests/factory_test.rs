// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::{address, keccak256, Address, B256};
use rstest::*;
use tsp_core::factory::{CollectionFactory, CollectionParams, FactoryError};

#[fixture]
fn params() -> CollectionParams {
    CollectionParams {
        name: "Triton".into(),
        symbol: "TNT".into(),
        base_uri: String::new(),
    }
}

#[fixture]
fn factory() -> CollectionFactory {
    CollectionFactory::new(
        address!("fac7000000000000000000000000000000000000"),
        keccak256(b"collectible-template"),
    )
}

#[rstest]
fn identical_params_always_derive_the_same_salt(params: CollectionParams) {
    let salt = CollectionFactory::derive_salt(&params);
    assert_eq!(salt, CollectionFactory::derive_salt(&params));

    let renamed = CollectionParams {
        symbol: "TRI".into(),
        ..params
    };
    assert_ne!(salt, CollectionFactory::derive_salt(&renamed));
}

#[rstest]
fn address_is_predictable_before_deployment(factory: CollectionFactory, params: CollectionParams) {
    let salt = CollectionFactory::derive_salt(&params);
    let predicted = factory.predict_address(salt);

    // Not yet deployed: absence, not an error.
    assert_eq!(factory.resolve(salt), None);

    let deployed = factory.deploy(&params).unwrap();
    assert_eq!(deployed, predicted);
    assert_eq!(factory.resolve(salt), Some(deployed));
}

#[rstest]
fn a_salt_deploys_at_most_once(factory: CollectionFactory, params: CollectionParams) {
    let first = factory.deploy(&params).unwrap();
    let salt = CollectionFactory::derive_salt(&params);

    let err = factory.deploy(&params).unwrap_err();
    assert_eq!(
        err,
        FactoryError::AlreadyDeployed {
            salt,
            address: first
        }
    );

    // The original record is untouched.
    assert_eq!(factory.resolve(salt), Some(first));
}

#[rstest]
fn factories_at_different_addresses_do_not_collide(params: CollectionParams) {
    let salt = CollectionFactory::derive_salt(&params);
    let code_hash: B256 = keccak256(b"collectible-template");
    let a = CollectionFactory::new(Address::from([0xaa; 20]), code_hash);
    let b = CollectionFactory::new(Address::from([0xbb; 20]), code_hash);
    assert_ne!(a.predict_address(salt), b.predict_address(salt));
}
