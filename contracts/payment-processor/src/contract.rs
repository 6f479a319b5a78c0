//! Payment Processor Contract
//!
//! Escrows stablecoin payments for merchant orders and releases them on
//! settlement, minus the platform fee. Orders move through
//! `Created -> Paid -> Settled | Refunded` or `Created -> Cancelled`; a
//! settled order may still be refunded if merchant and platform grant the
//! processor allowances to pull their shares back.
//!
//! Every state-mutating entry point writes its status change before any
//! token call, runs under `ReentrancyGuard`, and returns an error rather
//! than committing anything partially.

use soroban_sdk::{
    contract, contractimpl, log, panic_with_error, symbol_short, xdr::ToXdr, Address, BytesN,
    Env, String,
};
use stellar_access::ownable;
use stellar_contract_utils::pausable;
use stellar_macros::only_owner;

use crate::error::ProcessorError;
use crate::events::{self, OrderSettled};
use crate::fee;
use crate::merchant;
use crate::storage::{
    self, Order, OrderStatus, Settlement, MAX_BPS, MAX_EXPIRATION_WINDOW, MAX_METADATA_LEN,
    MAX_ORDER_UNITS, MIN_ORDER_TENTHS, SCHEMA_VERSION,
};
use crate::transfer::{self, ReentrancyGuard, TokenClient};

#[contract]
pub struct PaymentProcessorContract;

#[contractimpl]
impl PaymentProcessorContract {
    /// Initialize the payment processor
    ///
    /// # Arguments
    /// * `owner` - Admin address for the payment processor
    /// * `platform_wallet` - Receives the platform fee on settlement
    /// * `merchant_registry` - Contract answering merchant lookups
    /// * `fee_bps` - Platform fee out of `MAX_BPS` (e.g., 2_000 = 2%)
    pub fn __constructor(
        e: &Env,
        owner: Address,
        platform_wallet: Address,
        merchant_registry: Address,
        fee_bps: u32,
    ) {
        if fee_bps > MAX_BPS {
            panic_with_error!(e, ProcessorError::InvalidFeeRate);
        }
        let this = e.current_contract_address();
        if platform_wallet == this || merchant_registry == this {
            panic_with_error!(e, ProcessorError::InvalidAddress);
        }

        ownable::set_owner(e, &owner);
        storage::set_platform_wallet(e, &platform_wallet);
        storage::set_merchant_registry(e, &merchant_registry);
        storage::set_fee_bps(e, fee_bps);
        storage::set_expiration_window(e, storage::DEFAULT_EXPIRATION_WINDOW);
        storage::set_emergency_withdrawal_enabled(e, false);
        storage::set_schema_version(e, SCHEMA_VERSION);
    }

    // ------------------------------------------------------------------
    // Order lifecycle
    // ------------------------------------------------------------------

    /// Open a new order. No funds move until `pay_order`.
    ///
    /// # Arguments
    /// * `payer` - Account that will pay the order
    /// * `merchant_id` - Registry id of the receiving merchant
    /// * `token` - Allow-listed payment token
    /// * `amount` - Price in the token's smallest unit
    /// * `metadata_uri` - Reference to off-chain order details
    pub fn create_order(
        e: &Env,
        payer: Address,
        merchant_id: u64,
        token: Address,
        amount: i128,
        metadata_uri: String,
    ) -> Result<BytesN<32>, ProcessorError> {
        payer.require_auth();

        Self::guarded(e, || {
            if !storage::is_token_supported(e, &token) {
                return Err(ProcessorError::TokenNotSupported);
            }

            let token_client = TokenClient::new(e, &token);
            let decimals = token_client.decimals()?;
            Self::check_amount_bounds(amount, decimals)?;

            if metadata_uri.len() == 0 || metadata_uri.len() > MAX_METADATA_LEN {
                return Err(ProcessorError::InvalidMetadata);
            }

            if token_client.balance(&payer)? < amount {
                return Err(ProcessorError::InsufficientBalance);
            }

            let merchant_payout =
                merchant::verified_payout(e, &storage::merchant_registry(e), merchant_id)?;

            let nonce = storage::next_nonce(e, &payer);
            let created_at = e.ledger().timestamp();
            let expires_at = created_at.saturating_add(storage::expiration_window(e));
            let order_id = Self::derive_order_id(e, &payer, nonce, created_at);
            if storage::has_order(e, &order_id) {
                return Err(ProcessorError::DuplicateOrder);
            }

            let order = Order {
                id: order_id.clone(),
                payer: payer.clone(),
                token: token.clone(),
                merchant_id,
                merchant_payout,
                amount,
                status: OrderStatus::Created,
                created_at,
                expires_at,
                metadata_uri: metadata_uri.clone(),
            };
            storage::write_order(e, &order);

            events::order_created(e, &order);
            Ok(order_id)
        })
    }

    /// Pay a created order, moving `amount` into processor custody.
    ///
    /// Fails with `OrderExpired` once the expiration window has passed; the
    /// order then reads as cancelled.
    pub fn pay_order(e: &Env, payer: Address, order_id: BytesN<32>) -> Result<(), ProcessorError> {
        payer.require_auth();

        Self::guarded(e, || {
            let mut order = Self::load_order(e, &order_id)?;
            if order.status != OrderStatus::Created {
                return Err(ProcessorError::InvalidStatus);
            }
            if order.payer != payer {
                return Err(ProcessorError::Unauthorized);
            }
            if Self::is_expired(e, &order) {
                log!(e, "payment attempted after deadline", order_id.clone());
                return Err(ProcessorError::OrderExpired);
            }

            order.status = OrderStatus::Paid;
            storage::write_order(e, &order);

            transfer::send(e, &order.token, &payer, &e.current_contract_address(), order.amount)?;

            events::order_paid(e, &order);
            Ok(())
        })
    }

    /// Release a paid order: net to the merchant, fee to the platform.
    ///
    /// # Arguments
    /// * `caller` - The order's merchant payout wallet or the owner
    /// * `order_id` - Order to settle
    pub fn settle_order(
        e: &Env,
        caller: Address,
        order_id: BytesN<32>,
    ) -> Result<(), ProcessorError> {
        caller.require_auth();

        Self::guarded(e, || {
            let mut order = Self::load_order(e, &order_id)?;
            if order.status != OrderStatus::Paid {
                return Err(ProcessorError::InvalidStatus);
            }
            Self::check_merchant_or_owner(e, &caller, &order)?;

            let (fee, net) = fee::split(order.amount, storage::fee_bps(e), MAX_BPS)?;
            let platform_wallet = storage::platform_wallet(e);

            order.status = OrderStatus::Settled;
            storage::write_order(e, &order);
            storage::write_settlement(
                e,
                &order.id,
                &Settlement {
                    net,
                    fee,
                    platform_wallet: platform_wallet.clone(),
                },
            );

            let custody = e.current_contract_address();
            transfer::send(e, &order.token, &custody, &order.merchant_payout, net)?;
            transfer::send(e, &order.token, &custody, &platform_wallet, fee)?;

            events::order_settled(
                e,
                &order.id,
                OrderSettled {
                    merchant_payout: order.merchant_payout.clone(),
                    platform_wallet,
                    net,
                    fee,
                },
            );
            Ok(())
        })
    }

    /// Return an order's full amount to its payer.
    ///
    /// From `Paid` the escrowed funds are sent back directly. From `Settled`
    /// the net and fee are first pulled back from the merchant payout wallet
    /// and the platform wallet recorded at settlement; both must have
    /// approved the processor for their share.
    pub fn refund_order(
        e: &Env,
        caller: Address,
        order_id: BytesN<32>,
    ) -> Result<(), ProcessorError> {
        caller.require_auth();

        Self::guarded(e, || {
            let mut order = Self::load_order(e, &order_id)?;
            let previous = order.status;
            if previous != OrderStatus::Paid && previous != OrderStatus::Settled {
                return Err(ProcessorError::InvalidStatus);
            }
            Self::check_merchant_or_owner(e, &caller, &order)?;

            order.status = OrderStatus::Refunded;
            storage::write_order(e, &order);

            if previous == OrderStatus::Settled {
                let settlement =
                    storage::read_settlement(e, &order.id).ok_or(ProcessorError::InvalidStatus)?;
                transfer::pull(e, &order.token, &order.merchant_payout, settlement.net)?;
                transfer::pull(e, &order.token, &settlement.platform_wallet, settlement.fee)?;
            }

            transfer::send(
                e,
                &order.token,
                &e.current_contract_address(),
                &order.payer,
                order.amount,
            )?;

            events::order_refunded(e, &order, previous == OrderStatus::Settled);
            Ok(())
        })
    }

    /// Withdraw an unpaid order.
    pub fn cancel_order(
        e: &Env,
        payer: Address,
        order_id: BytesN<32>,
    ) -> Result<(), ProcessorError> {
        payer.require_auth();

        Self::guarded(e, || {
            let mut order = Self::load_order(e, &order_id)?;
            if order.status != OrderStatus::Created {
                return Err(ProcessorError::InvalidStatus);
            }
            if order.payer != payer {
                return Err(ProcessorError::Unauthorized);
            }

            order.status = OrderStatus::Cancelled;
            storage::write_order(e, &order);

            events::order_cancelled(e, &order);
            Ok(())
        })
    }

    /// Record the cancellation of an order whose payment deadline passed.
    ///
    /// Anyone may call this; it only commits what reads already report.
    pub fn expire_order(e: &Env, order_id: BytesN<32>) -> Result<(), ProcessorError> {
        Self::guarded(e, || {
            let mut order = Self::load_order(e, &order_id)?;
            if order.status != OrderStatus::Created {
                return Err(ProcessorError::InvalidStatus);
            }
            if !Self::is_expired(e, &order) {
                return Err(ProcessorError::OrderNotExpired);
            }

            order.status = OrderStatus::Cancelled;
            storage::write_order(e, &order);

            events::order_expired(e, &order);
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Order as it currently stands. A created order past its deadline is
    /// reported as cancelled.
    pub fn get_order(e: &Env, order_id: BytesN<32>) -> Result<Order, ProcessorError> {
        let mut order = Self::load_order(e, &order_id)?;
        if order.status == OrderStatus::Created && Self::is_expired(e, &order) {
            order.status = OrderStatus::Cancelled;
        }
        Ok(order)
    }

    pub fn get_settlement(e: &Env, order_id: BytesN<32>) -> Option<Settlement> {
        storage::read_settlement(e, &order_id)
    }

    /// Number of orders `payer` has created.
    pub fn get_nonce(e: &Env, payer: Address) -> u64 {
        storage::read_nonce(e, &payer)
    }

    /// `(fee, net)` split of `amount` at the current rate.
    pub fn quote_fee(e: &Env, amount: i128) -> Result<(i128, i128), ProcessorError> {
        fee::split(amount, storage::fee_bps(e), MAX_BPS)
    }

    pub fn is_token_supported(e: &Env, token: Address) -> bool {
        storage::is_token_supported(e, &token)
    }

    pub fn get_platform_wallet(e: &Env) -> Address {
        storage::platform_wallet(e)
    }

    pub fn get_merchant_registry(e: &Env) -> Address {
        storage::merchant_registry(e)
    }

    pub fn get_fee_bps(e: &Env) -> u32 {
        storage::fee_bps(e)
    }

    pub fn get_max_bps(_e: &Env) -> u32 {
        MAX_BPS
    }

    pub fn get_expiration_window(e: &Env) -> u64 {
        storage::expiration_window(e)
    }

    pub fn is_emergency_withdrawal_enabled(e: &Env) -> bool {
        storage::emergency_withdrawal_enabled(e)
    }

    pub fn paused(e: &Env) -> bool {
        pausable::paused(e)
    }

    pub fn owner(e: &Env) -> Option<Address> {
        ownable::get_owner(e)
    }

    pub fn schema_version(e: &Env) -> u32 {
        storage::schema_version(e)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    #[only_owner]
    pub fn set_token_supported(
        e: &Env,
        token: Address,
        supported: bool,
    ) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        storage::set_token_supported(e, &token, supported);
        events::allowlist_changed(e, &token, supported);
        Ok(())
    }

    #[only_owner]
    pub fn set_platform_wallet(e: &Env, wallet: Address) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        if wallet == e.current_contract_address() {
            return Err(ProcessorError::InvalidAddress);
        }
        let old = storage::platform_wallet(e);
        storage::set_platform_wallet(e, &wallet);
        events::protocol_address_changed(e, symbol_short!("wallet"), old, wallet);
        Ok(())
    }

    #[only_owner]
    pub fn set_merchant_registry(e: &Env, registry: Address) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        if registry == e.current_contract_address() {
            return Err(ProcessorError::InvalidAddress);
        }
        let old = storage::merchant_registry(e);
        storage::set_merchant_registry(e, &registry);
        events::protocol_address_changed(e, symbol_short!("registry"), old, registry);
        Ok(())
    }

    #[only_owner]
    pub fn set_fee_bps(e: &Env, fee_bps: u32) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        if fee_bps > MAX_BPS {
            return Err(ProcessorError::InvalidFeeRate);
        }
        let old = storage::fee_bps(e);
        storage::set_fee_bps(e, fee_bps);
        events::fee_rate_changed(e, old, fee_bps);
        Ok(())
    }

    #[only_owner]
    pub fn set_expiration_window(e: &Env, seconds: u64) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        if seconds > MAX_EXPIRATION_WINDOW {
            return Err(ProcessorError::ExpirationWindowTooLong);
        }
        let old = storage::expiration_window(e);
        storage::set_expiration_window(e, seconds);
        events::expiration_window_changed(e, old, seconds);
        Ok(())
    }

    #[only_owner]
    pub fn set_emergency_withdrawal_enabled(
        e: &Env,
        enabled: bool,
    ) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        storage::set_emergency_withdrawal_enabled(e, enabled);
        events::emergency_toggled(e, enabled);
        Ok(())
    }

    #[only_owner]
    pub fn pause(e: &Env) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        pausable::pause(e);
        Ok(())
    }

    #[only_owner]
    pub fn unpause(e: &Env) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        pausable::unpause(e);
        Ok(())
    }

    /// Move processor-held funds out while the system is halted.
    ///
    /// Only available when paused and when emergency withdrawal has been
    /// switched on. Ignores order bookkeeping entirely.
    #[only_owner]
    pub fn emergency_withdraw(
        e: &Env,
        token: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ProcessorError> {
        if !pausable::paused(e) {
            return Err(ProcessorError::NotPaused);
        }
        if !storage::emergency_withdrawal_enabled(e) {
            return Err(ProcessorError::EmergencyWithdrawalDisabled);
        }
        if !storage::is_token_supported(e, &token) {
            return Err(ProcessorError::TokenNotSupported);
        }
        let custody = e.current_contract_address();
        if to == custody {
            return Err(ProcessorError::InvalidAddress);
        }
        if amount <= 0 {
            return Err(ProcessorError::InvalidAmount);
        }

        if TokenClient::new(e, &token).balance(&custody)? < amount {
            return Err(ProcessorError::InsufficientBalance);
        }

        ReentrancyGuard::enter(e)?;
        transfer::send(e, &token, &custody, &to, amount)?;
        ReentrancyGuard::exit(e);

        events::emergency_withdrawal(e, &token, &to, amount);
        Ok(())
    }

    /// Start a two-step ownership handover; `new_owner` must accept before
    /// `live_until_ledger`.
    pub fn transfer_ownership(
        e: &Env,
        new_owner: Address,
        live_until_ledger: u32,
    ) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        ownable::transfer_ownership(e, &new_owner, live_until_ledger);
        Ok(())
    }

    pub fn accept_ownership(e: &Env) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        ownable::accept_ownership(e);
        Ok(())
    }

    /// Replace the contract code. Storage is kept; call `migrate` afterwards
    /// if the new code expects a newer schema.
    #[only_owner]
    pub fn upgrade(e: &Env, new_wasm_hash: BytesN<32>) -> Result<(), ProcessorError> {
        Self::ensure_unlocked(e)?;
        e.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    /// Bring stored state up to `SCHEMA_VERSION`. Returns the new version.
    #[only_owner]
    pub fn migrate(e: &Env) -> Result<u32, ProcessorError> {
        Self::ensure_unlocked(e)?;
        let current = storage::schema_version(e);
        if current >= SCHEMA_VERSION {
            return Err(ProcessorError::AlreadyMigrated);
        }

        for version in (current + 1)..=SCHEMA_VERSION {
            match version {
                // v1: expiration window and emergency switch became explicit
                1 => {
                    storage::set_expiration_window(e, storage::expiration_window(e));
                    storage::set_emergency_withdrawal_enabled(
                        e,
                        storage::emergency_withdrawal_enabled(e),
                    );
                }
                _ => {}
            }
            storage::set_schema_version(e, version);
        }
        Ok(SCHEMA_VERSION)
    }
}

impl PaymentProcessorContract {
    /// Runs `op` with the pause check and reentrancy lock every lifecycle
    /// entry point shares.
    fn guarded<T>(
        e: &Env,
        op: impl FnOnce() -> Result<T, ProcessorError>,
    ) -> Result<T, ProcessorError> {
        if pausable::paused(e) {
            return Err(ProcessorError::Paused);
        }
        ReentrancyGuard::enter(e)?;
        let result = op();
        ReentrancyGuard::exit(e);
        storage::extend_instance_ttl(e);
        result
    }

    /// Owner calls take no lock of their own but must not interleave with a
    /// lifecycle call that holds it.
    fn ensure_unlocked(e: &Env) -> Result<(), ProcessorError> {
        if ReentrancyGuard::is_entered(e) {
            return Err(ProcessorError::Reentrant);
        }
        Ok(())
    }

    fn load_order(e: &Env, order_id: &BytesN<32>) -> Result<Order, ProcessorError> {
        storage::read_order(e, order_id).ok_or(ProcessorError::OrderNotFound)
    }

    fn is_expired(e: &Env, order: &Order) -> bool {
        e.ledger().timestamp() > order.expires_at
    }

    fn check_merchant_or_owner(
        e: &Env,
        caller: &Address,
        order: &Order,
    ) -> Result<(), ProcessorError> {
        if *caller == order.merchant_payout || ownable::get_owner(e).as_ref() == Some(caller) {
            Ok(())
        } else {
            Err(ProcessorError::Unauthorized)
        }
    }

    /// Accepts amounts between half a token and 100_000 tokens.
    fn check_amount_bounds(amount: i128, decimals: u32) -> Result<(), ProcessorError> {
        let unit = 10i128
            .checked_pow(decimals)
            .ok_or(ProcessorError::InvalidAmount)?;
        let min = (unit
            .checked_mul(MIN_ORDER_TENTHS)
            .ok_or(ProcessorError::InvalidAmount)?
            / 10)
            .max(1);
        let max = unit
            .checked_mul(MAX_ORDER_UNITS)
            .ok_or(ProcessorError::InvalidAmount)?;
        if amount <= 0 || amount < min || amount > max {
            return Err(ProcessorError::InvalidAmount);
        }
        Ok(())
    }

    /// sha256(payer || nonce || network id || timestamp)
    fn derive_order_id(e: &Env, payer: &Address, nonce: u64, timestamp: u64) -> BytesN<32> {
        let mut preimage = payer.clone().to_xdr(e);
        preimage.extend_from_array(&nonce.to_be_bytes());
        preimage.extend_from_array(&e.ledger().network_id().to_array());
        preimage.extend_from_array(&timestamp.to_be_bytes());
        e.crypto().sha256(&preimage).to_bytes()
    }
}
