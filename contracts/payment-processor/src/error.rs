use soroban_sdk::contracterror;

/// Every failure the processor reports. Codes are part of the public
/// interface and must never be renumbered.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ProcessorError {
    // validation
    InvalidAddress = 1,
    InvalidAmount = 2,
    InvalidMetadata = 3,
    TokenNotSupported = 4,
    InvalidFeeRate = 5,
    // not found
    OrderNotFound = 10,
    MerchantNotFound = 11,
    // authorization
    Unauthorized = 20,
    MerchantNotVerified = 21,
    // state
    InvalidStatus = 30,
    DuplicateOrder = 31,
    Paused = 32,
    NotPaused = 33,
    Reentrant = 34,
    OrderNotExpired = 35,
    AlreadyMigrated = 36,
    // external calls
    TransferFailed = 40,
    // temporal
    OrderExpired = 50,
    ExpirationWindowTooLong = 51,
    // resources
    InsufficientBalance = 60,
    // configuration
    EmergencyWithdrawalDisabled = 70,
}
