//! Read-only view of the merchant registry.

use soroban_sdk::{contractclient, contracttype, log, Address, Env};

use crate::error::ProcessorError;

/// Mirrors the registry's `VerificationStatus` wire layout.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VerificationStatus {
    Pending = 0,
    Verified = 1,
    Rejected = 2,
    Suspended = 3,
}

/// Mirrors the registry's `MerchantInfo` wire layout.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MerchantInfo {
    pub exists: bool,
    pub payout_wallet: Option<Address>,
    pub verification_status: VerificationStatus,
}

#[contractclient(name = "MerchantGateClient")]
pub trait MerchantGate {
    fn get_merchant_info(env: Env, merchant_id: u64) -> MerchantInfo;
}

/// Returns the payout wallet of a merchant that may receive orders.
pub fn verified_payout(
    e: &Env,
    registry: &Address,
    merchant_id: u64,
) -> Result<Address, ProcessorError> {
    let info = match MerchantGateClient::new(e, registry).try_get_merchant_info(&merchant_id) {
        Ok(Ok(info)) => info,
        _ => {
            log!(e, "merchant registry lookup failed", merchant_id);
            return Err(ProcessorError::MerchantNotFound);
        }
    };

    if !info.exists {
        return Err(ProcessorError::MerchantNotFound);
    }
    if info.verification_status != VerificationStatus::Verified {
        return Err(ProcessorError::MerchantNotVerified);
    }
    info.payout_wallet.ok_or(ProcessorError::MerchantNotFound)
}
