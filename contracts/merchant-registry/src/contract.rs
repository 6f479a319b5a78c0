//! Merchant Registry Contract
//!
//! Keeps the merchant directory consumed by the payment processor: who a
//! merchant is, where its payouts go and whether it has passed verification.
//! The processor only ever reads from it through `get_merchant_info`.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, Symbol,
};

// Storage keys
pub const ADMIN: Symbol = symbol_short!("ADMIN");
pub const NEXT_ID: Symbol = symbol_short!("NEXTID");

const DAY_IN_LEDGERS: u32 = 17280;
const MERCHANT_TTL_AMOUNT: u32 = 90 * DAY_IN_LEDGERS;
const MERCHANT_TTL_THRESHOLD: u32 = MERCHANT_TTL_AMOUNT - DAY_IN_LEDGERS;

#[contract]
pub struct MerchantRegistryContract;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    Unauthorized = 1,
    MerchantNotFound = 2,
    InvalidStatus = 3,
}

/// Merchant trust level, set by the registry admin after off-chain review.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VerificationStatus {
    Pending = 0,
    Verified = 1,
    Rejected = 2,
    Suspended = 3,
}

impl VerificationStatus {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Verified),
            2 => Some(Self::Rejected),
            3 => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// Merchant record
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Merchant {
    pub id: u64,
    pub owner: Address,
    pub payout_wallet: Address,
    pub status: VerificationStatus,
    pub registered_at: u64,
}

/// Lookup answer served to the payment processor.
///
/// Unknown merchants are reported with `exists == false` rather than an
/// error so that callers decide how to treat them.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MerchantInfo {
    pub exists: bool,
    pub payout_wallet: Option<Address>,
    pub verification_status: VerificationStatus,
}

#[contracttype]
#[derive(Clone, Debug)]
pub enum DataKey {
    Merchant(u64),
}

#[contractimpl]
impl MerchantRegistryContract {
    /// Initialize the registry
    ///
    /// # Arguments
    /// * `admin` - Address allowed to change verification status
    pub fn __constructor(e: &Env, admin: Address) {
        e.storage().instance().set(&ADMIN, &admin);
        e.storage().instance().set(&NEXT_ID, &1u64);
    }

    /// Register a new merchant. Returns the assigned merchant id.
    ///
    /// New merchants start out `Pending` and cannot receive orders until the
    /// admin verifies them.
    ///
    /// # Arguments
    /// * `owner` - Account that controls the merchant record
    /// * `payout_wallet` - Destination for settled funds
    pub fn register_merchant(e: &Env, owner: Address, payout_wallet: Address) -> u64 {
        owner.require_auth();

        let id: u64 = e.storage().instance().get(&NEXT_ID).unwrap_or(1);
        e.storage().instance().set(&NEXT_ID, &(id + 1));

        let merchant = Merchant {
            id,
            owner: owner.clone(),
            payout_wallet: payout_wallet.clone(),
            status: VerificationStatus::Pending,
            registered_at: e.ledger().timestamp(),
        };
        Self::save(e, &merchant);

        e.events().publish(
            (symbol_short!("MERCHANT"), symbol_short!("register")),
            (id, owner, payout_wallet),
        );

        id
    }

    /// Point a merchant's payouts at a new wallet.
    ///
    /// Orders created before this call keep the wallet they snapshotted.
    pub fn set_payout_wallet(
        e: &Env,
        merchant_id: u64,
        payout_wallet: Address,
    ) -> Result<(), RegistryError> {
        let mut merchant = Self::load(e, merchant_id)?;
        merchant.owner.require_auth();

        merchant.payout_wallet = payout_wallet.clone();
        Self::save(e, &merchant);

        e.events().publish(
            (symbol_short!("MERCHANT"), symbol_short!("payout")),
            (merchant_id, payout_wallet),
        );
        Ok(())
    }

    /// Record the outcome of a merchant review.
    ///
    /// # Arguments
    /// * `merchant_id` - Merchant to update
    /// * `status_code` - 0 pending, 1 verified, 2 rejected, 3 suspended
    pub fn set_verification_status(
        e: &Env,
        merchant_id: u64,
        status_code: u32,
    ) -> Result<(), RegistryError> {
        Self::get_admin(e).require_auth();

        let status =
            VerificationStatus::from_code(status_code).ok_or(RegistryError::InvalidStatus)?;
        let mut merchant = Self::load(e, merchant_id)?;
        merchant.status = status;
        Self::save(e, &merchant);

        e.events().publish(
            (symbol_short!("MERCHANT"), symbol_short!("status")),
            (merchant_id, status_code),
        );
        Ok(())
    }

    /// Hand the admin role to another account.
    pub fn set_admin(e: &Env, new_admin: Address) {
        Self::get_admin(e).require_auth();
        e.storage().instance().set(&ADMIN, &new_admin);
    }

    pub fn get_admin(e: &Env) -> Address {
        e.storage()
            .instance()
            .get::<_, Address>(&ADMIN)
            .expect("admin not set")
    }

    /// Full merchant record
    pub fn get_merchant(e: &Env, merchant_id: u64) -> Result<Merchant, RegistryError> {
        Self::load(e, merchant_id)
    }

    /// Existence, payout wallet and verification status of a merchant
    pub fn get_merchant_info(e: &Env, merchant_id: u64) -> MerchantInfo {
        match Self::load(e, merchant_id) {
            Ok(merchant) => MerchantInfo {
                exists: true,
                payout_wallet: Some(merchant.payout_wallet),
                verification_status: merchant.status,
            },
            Err(_) => MerchantInfo {
                exists: false,
                payout_wallet: None,
                verification_status: VerificationStatus::Pending,
            },
        }
    }

    fn load(e: &Env, merchant_id: u64) -> Result<Merchant, RegistryError> {
        let key = DataKey::Merchant(merchant_id);
        let merchant = e
            .storage()
            .persistent()
            .get::<_, Merchant>(&key)
            .ok_or(RegistryError::MerchantNotFound)?;
        e.storage()
            .persistent()
            .extend_ttl(&key, MERCHANT_TTL_THRESHOLD, MERCHANT_TTL_AMOUNT);
        Ok(merchant)
    }

    fn save(e: &Env, merchant: &Merchant) {
        let key = DataKey::Merchant(merchant.id);
        e.storage().persistent().set(&key, merchant);
        e.storage()
            .persistent()
            .extend_ttl(&key, MERCHANT_TTL_THRESHOLD, MERCHANT_TTL_AMOUNT);
    }
}
