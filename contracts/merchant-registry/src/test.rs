use soroban_sdk::{testutils::Address as _, Address, Env};

use crate::{
    MerchantRegistryContract, MerchantRegistryContractClient, RegistryError, VerificationStatus,
};

fn setup<'a>() -> (Env, MerchantRegistryContractClient<'a>, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let contract_id = env.register(MerchantRegistryContract, (admin.clone(),));
    let client = MerchantRegistryContractClient::new(&env, &contract_id);

    (env, client, admin)
}

#[test]
fn test_register_assigns_sequential_ids() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let payout = Address::generate(&env);

    let first = client.register_merchant(&owner, &payout);
    let second = client.register_merchant(&owner, &payout);

    assert_eq!(first, 1);
    assert_eq!(second, 2);

    let merchant = client.get_merchant(&first);
    assert_eq!(merchant.owner, owner);
    assert_eq!(merchant.payout_wallet, payout);
    assert_eq!(merchant.status, VerificationStatus::Pending);
}

#[test]
fn test_merchant_info_for_known_and_unknown_ids() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let payout = Address::generate(&env);
    let id = client.register_merchant(&owner, &payout);
    client.set_verification_status(&id, &1);

    let info = client.get_merchant_info(&id);
    assert!(info.exists);
    assert_eq!(info.payout_wallet, Some(payout));
    assert_eq!(info.verification_status, VerificationStatus::Verified);

    let missing = client.get_merchant_info(&42);
    assert!(!missing.exists);
    assert_eq!(missing.payout_wallet, None);
}

#[test]
fn test_invalid_status_code_rejected() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let id = client.register_merchant(&owner, &Address::generate(&env));

    let result = client.try_set_verification_status(&id, &4);
    assert_eq!(result, Err(Ok(RegistryError::InvalidStatus)));
    assert_eq!(
        client.get_merchant(&id).status,
        VerificationStatus::Pending
    );
}

#[test]
fn test_status_update_on_unknown_merchant() {
    let (_env, client, _admin) = setup();
    let result = client.try_set_verification_status(&7, &1);
    assert_eq!(result, Err(Ok(RegistryError::MerchantNotFound)));
}

#[test]
fn test_payout_wallet_update() {
    let (env, client, _admin) = setup();
    let owner = Address::generate(&env);
    let id = client.register_merchant(&owner, &Address::generate(&env));

    let new_wallet = Address::generate(&env);
    client.set_payout_wallet(&id, &new_wallet);

    assert_eq!(client.get_merchant(&id).payout_wallet, new_wallet);
}

#[test]
fn test_every_status_code_maps_to_its_variant() {
    let (env, client, _admin) = setup();
    let id = client.register_merchant(&Address::generate(&env), &Address::generate(&env));

    for (code, expected) in [
        (0, VerificationStatus::Pending),
        (1, VerificationStatus::Verified),
        (2, VerificationStatus::Rejected),
        (3, VerificationStatus::Suspended),
    ] {
        client.set_verification_status(&id, &code);
        assert_eq!(client.get_merchant_info(&id).verification_status, expected);
    }
}

#[test]
fn test_set_admin() {
    let (env, client, admin) = setup();
    assert_eq!(client.get_admin(), admin);

    let new_admin = Address::generate(&env);
    client.set_admin(&new_admin);
    assert_eq!(client.get_admin(), new_admin);
}
