use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, String, Symbol};

// Instance storage keys
pub const PLATFORM_WALLET: Symbol = symbol_short!("PWALLET");
pub const MERCHANT_REGISTRY: Symbol = symbol_short!("MREG");
pub const FEE_BPS: Symbol = symbol_short!("FEEBPS");
pub const EXPIRATION_WINDOW: Symbol = symbol_short!("EXPWIN");
pub const EMERGENCY_WITHDRAWAL: Symbol = symbol_short!("EMERG");
pub const SCHEMA_VERSION_KEY: Symbol = symbol_short!("SCHEMA");
pub const LOCKED: Symbol = symbol_short!("LOCKED");

/// Fee rate denominator: 100_000 bps is 100%, one step is 0.001%.
pub const MAX_BPS: u32 = 100_000;
pub const DEFAULT_EXPIRATION_WINDOW: u64 = 3_600;
pub const MAX_EXPIRATION_WINDOW: u64 = 86_400;
pub const MAX_METADATA_LEN: u32 = 256;
/// Order size limits in whole token units; the floor is half a unit.
pub const MIN_ORDER_TENTHS: i128 = 5;
pub const MAX_ORDER_UNITS: i128 = 100_000;
pub const SCHEMA_VERSION: u32 = 1;

const DAY_IN_LEDGERS: u32 = 17280;
pub const INSTANCE_TTL_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_TTL_THRESHOLD: u32 = INSTANCE_TTL_AMOUNT - DAY_IN_LEDGERS;
const RECORD_TTL_AMOUNT: u32 = 180 * DAY_IN_LEDGERS;
const RECORD_TTL_THRESHOLD: u32 = RECORD_TTL_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum OrderStatus {
    Created = 0,
    Paid = 1,
    Settled = 2,
    Refunded = 3,
    Cancelled = 4,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    pub id: BytesN<32>,
    pub payer: Address,
    pub token: Address,
    pub merchant_id: u64,
    /// Payout wallet as registered when the order was created.
    pub merchant_payout: Address,
    pub amount: i128,
    pub status: OrderStatus,
    pub created_at: u64,
    /// Last timestamp at which the order can still be paid. Fixed at
    /// creation so later window changes do not move it.
    pub expires_at: u64,
    pub metadata_uri: String,
}

/// How a settled order's amount was split. Kept so a later refund can pull
/// back exactly what each party received.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub net: i128,
    pub fee: i128,
    pub platform_wallet: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub enum DataKey {
    Order(BytesN<32>),
    Settlement(BytesN<32>),
    Nonce(Address),
    SupportedToken(Address),
}

pub fn extend_instance_ttl(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_AMOUNT);
}

fn extend_record_ttl(e: &Env, key: &DataKey) {
    e.storage()
        .persistent()
        .extend_ttl(key, RECORD_TTL_THRESHOLD, RECORD_TTL_AMOUNT);
}

// Orders

pub fn has_order(e: &Env, order_id: &BytesN<32>) -> bool {
    e.storage()
        .persistent()
        .has(&DataKey::Order(order_id.clone()))
}

pub fn read_order(e: &Env, order_id: &BytesN<32>) -> Option<Order> {
    let key = DataKey::Order(order_id.clone());
    let order = e.storage().persistent().get::<_, Order>(&key)?;
    extend_record_ttl(e, &key);
    Some(order)
}

pub fn write_order(e: &Env, order: &Order) {
    let key = DataKey::Order(order.id.clone());
    e.storage().persistent().set(&key, order);
    extend_record_ttl(e, &key);
}

pub fn read_settlement(e: &Env, order_id: &BytesN<32>) -> Option<Settlement> {
    let key = DataKey::Settlement(order_id.clone());
    let settlement = e.storage().persistent().get::<_, Settlement>(&key)?;
    extend_record_ttl(e, &key);
    Some(settlement)
}

pub fn write_settlement(e: &Env, order_id: &BytesN<32>, settlement: &Settlement) {
    let key = DataKey::Settlement(order_id.clone());
    e.storage().persistent().set(&key, settlement);
    extend_record_ttl(e, &key);
}

// Per-payer sequence numbers

pub fn read_nonce(e: &Env, payer: &Address) -> u64 {
    e.storage()
        .persistent()
        .get::<_, u64>(&DataKey::Nonce(payer.clone()))
        .unwrap_or(0)
}

/// Bumps the payer's sequence number and returns the new value.
pub fn next_nonce(e: &Env, payer: &Address) -> u64 {
    let key = DataKey::Nonce(payer.clone());
    let nonce = read_nonce(e, payer) + 1;
    e.storage().persistent().set(&key, &nonce);
    extend_record_ttl(e, &key);
    nonce
}

// Token allow-list

pub fn is_token_supported(e: &Env, token: &Address) -> bool {
    e.storage()
        .persistent()
        .get::<_, bool>(&DataKey::SupportedToken(token.clone()))
        .unwrap_or(false)
}

pub fn set_token_supported(e: &Env, token: &Address, supported: bool) {
    let key = DataKey::SupportedToken(token.clone());
    e.storage().persistent().set(&key, &supported);
    extend_record_ttl(e, &key);
}

// Configuration scalars

pub fn platform_wallet(e: &Env) -> Address {
    e.storage()
        .instance()
        .get::<_, Address>(&PLATFORM_WALLET)
        .expect("platform wallet not set")
}

pub fn set_platform_wallet(e: &Env, wallet: &Address) {
    e.storage().instance().set(&PLATFORM_WALLET, wallet);
}

pub fn merchant_registry(e: &Env) -> Address {
    e.storage()
        .instance()
        .get::<_, Address>(&MERCHANT_REGISTRY)
        .expect("merchant registry not set")
}

pub fn set_merchant_registry(e: &Env, registry: &Address) {
    e.storage().instance().set(&MERCHANT_REGISTRY, registry);
}

pub fn fee_bps(e: &Env) -> u32 {
    e.storage()
        .instance()
        .get::<_, u32>(&FEE_BPS)
        .expect("fee rate not set")
}

pub fn set_fee_bps(e: &Env, fee_bps: u32) {
    e.storage().instance().set(&FEE_BPS, &fee_bps);
}

pub fn expiration_window(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get::<_, u64>(&EXPIRATION_WINDOW)
        .unwrap_or(DEFAULT_EXPIRATION_WINDOW)
}

pub fn set_expiration_window(e: &Env, seconds: u64) {
    e.storage().instance().set(&EXPIRATION_WINDOW, &seconds);
}

pub fn emergency_withdrawal_enabled(e: &Env) -> bool {
    e.storage()
        .instance()
        .get::<_, bool>(&EMERGENCY_WITHDRAWAL)
        .unwrap_or(false)
}

pub fn set_emergency_withdrawal_enabled(e: &Env, enabled: bool) {
    e.storage().instance().set(&EMERGENCY_WITHDRAWAL, &enabled);
}

pub fn schema_version(e: &Env) -> u32 {
    e.storage()
        .instance()
        .get::<_, u32>(&SCHEMA_VERSION_KEY)
        .unwrap_or(0)
}

pub fn set_schema_version(e: &Env, version: u32) {
    e.storage().instance().set(&SCHEMA_VERSION_KEY, &version);
}
