//! Completion signals watched by indexers.
//!
//! Topics are `(ORDER | CONFIG | EMERG, action, subject)`; payloads carry
//! whatever an indexer needs to rebuild the order without reading storage.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, String, Symbol};

use crate::storage::Order;

pub const ORDER: Symbol = symbol_short!("ORDER");
pub const CONFIG: Symbol = symbol_short!("CONFIG");
pub const EMERGENCY: Symbol = symbol_short!("EMERG");

/// Order created event
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderCreated {
    pub payer: Address,
    pub token: Address,
    pub merchant_id: u64,
    pub merchant_payout: Address,
    pub amount: i128,
    pub created_at: u64,
    pub metadata_uri: String,
}

/// Order settled event
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderSettled {
    pub merchant_payout: Address,
    pub platform_wallet: Address,
    pub net: i128,
    pub fee: i128,
}

pub fn order_created(e: &Env, order: &Order) {
    e.events().publish(
        (ORDER, symbol_short!("created"), order.id.clone()),
        OrderCreated {
            payer: order.payer.clone(),
            token: order.token.clone(),
            merchant_id: order.merchant_id,
            merchant_payout: order.merchant_payout.clone(),
            amount: order.amount,
            created_at: order.created_at,
            metadata_uri: order.metadata_uri.clone(),
        },
    );
}

pub fn order_paid(e: &Env, order: &Order) {
    e.events().publish(
        (ORDER, symbol_short!("paid"), order.id.clone()),
        (order.payer.clone(), order.amount),
    );
}

pub fn order_settled(e: &Env, order_id: &BytesN<32>, settled: OrderSettled) {
    e.events()
        .publish((ORDER, symbol_short!("settled"), order_id.clone()), settled);
}

pub fn order_refunded(e: &Env, order: &Order, from_settled: bool) {
    e.events().publish(
        (ORDER, symbol_short!("refunded"), order.id.clone()),
        (order.payer.clone(), order.amount, from_settled),
    );
}

pub fn order_cancelled(e: &Env, order: &Order) {
    e.events().publish(
        (ORDER, symbol_short!("cancelled"), order.id.clone()),
        order.payer.clone(),
    );
}

pub fn order_expired(e: &Env, order: &Order) {
    e.events().publish(
        (ORDER, symbol_short!("expired"), order.id.clone()),
        (order.payer.clone(), order.expires_at),
    );
}

pub fn allowlist_changed(e: &Env, token: &Address, supported: bool) {
    e.events().publish(
        (CONFIG, symbol_short!("allowlist"), token.clone()),
        supported,
    );
}

/// `kind` names the changed address: `wallet` or `registry`.
pub fn protocol_address_changed(e: &Env, kind: Symbol, old: Address, new: Address) {
    e.events()
        .publish((CONFIG, symbol_short!("protocol"), kind), (old, new));
}

pub fn fee_rate_changed(e: &Env, old: u32, new: u32) {
    e.events()
        .publish((CONFIG, symbol_short!("fee_rate")), (old, new));
}

pub fn expiration_window_changed(e: &Env, old: u64, new: u64) {
    e.events()
        .publish((CONFIG, symbol_short!("expiry")), (old, new));
}

pub fn emergency_toggled(e: &Env, enabled: bool) {
    e.events()
        .publish((EMERGENCY, symbol_short!("toggle")), enabled);
}

pub fn emergency_withdrawal(e: &Env, token: &Address, to: &Address, amount: i128) {
    e.events().publish(
        (EMERGENCY, symbol_short!("withdraw"), token.clone()),
        (to.clone(), amount),
    );
}
