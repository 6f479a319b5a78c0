//! Guarded value movement.
//!
//! Every token call the processor makes goes through this module. A call
//! either credits the recipient with exactly the requested amount or fails
//! with `TransferFailed`, which aborts the enclosing invocation and discards
//! the status write that preceded it. `ReentrancyGuard` keeps a second entry
//! point from starting while one is still in flight.

use soroban_sdk::{log, Address, Env, Error, IntoVal, Symbol, TryFromVal, Val, Vec};

use crate::error::ProcessorError;
use crate::storage::LOCKED;

/// Client for SEP-41 token operations.
///
/// Calls are issued with `try_invoke_contract` so that a token which errors,
/// panics or is refused by the host surfaces as a single error.
pub struct TokenClient<'a> {
    pub env: &'a Env,
    pub address: &'a Address,
}

impl<'a> TokenClient<'a> {
    pub fn new(env: &'a Env, address: &'a Address) -> Self {
        Self { env, address }
    }

    fn call<T: TryFromVal<Env, Val>>(&self, func: &str, args: Vec<Val>) -> Result<T, ProcessorError> {
        match self
            .env
            .try_invoke_contract::<T, Error>(self.address, &Symbol::new(self.env, func), args)
        {
            Ok(Ok(value)) => Ok(value),
            _ => {
                log!(self.env, "token call failed", self.address.clone(), Symbol::new(self.env, func));
                Err(ProcessorError::TransferFailed)
            }
        }
    }

    pub fn balance(&self, account: &Address) -> Result<i128, ProcessorError> {
        self.call("balance", (account.clone(),).into_val(self.env))
    }

    pub fn decimals(&self) -> Result<u32, ProcessorError> {
        self.call("decimals", Vec::new(self.env))
    }

    pub fn transfer(&self, from: &Address, to: &Address, amount: i128) -> Result<(), ProcessorError> {
        self.call("transfer", (from.clone(), to.clone(), amount).into_val(self.env))
    }

    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ProcessorError> {
        self.call(
            "transfer_from",
            (spender.clone(), from.clone(), to.clone(), amount).into_val(self.env),
        )
    }
}

/// Moves `amount` of `token` from `from` to `to`.
///
/// A zero amount is a no-op. The recipient's balance is read before and
/// after the call and must have grown by exactly `amount`.
pub fn send(
    e: &Env,
    token: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), ProcessorError> {
    if amount == 0 {
        return Ok(());
    }
    let client = TokenClient::new(e, token);
    let before = client.balance(to)?;
    client.transfer(from, to, amount)?;
    ensure_credited(&client, to, before, amount)
}

/// Pulls `amount` of `token` from `owner` into processor custody using the
/// allowance `owner` granted the processor.
pub fn pull(e: &Env, token: &Address, owner: &Address, amount: i128) -> Result<(), ProcessorError> {
    if amount == 0 {
        return Ok(());
    }
    let custody = e.current_contract_address();
    let client = TokenClient::new(e, token);
    let before = client.balance(&custody)?;
    client.transfer_from(&custody, owner, &custody, amount)?;
    ensure_credited(&client, &custody, before, amount)
}

fn ensure_credited(
    client: &TokenClient,
    recipient: &Address,
    before: i128,
    amount: i128,
) -> Result<(), ProcessorError> {
    let after = client.balance(recipient)?;
    if after.checked_sub(before) != Some(amount) {
        log!(client.env, "recipient credited wrong amount", amount, before, after);
        return Err(ProcessorError::TransferFailed);
    }
    Ok(())
}

/// Call-scoped mutual exclusion for state-mutating entry points.
pub struct ReentrancyGuard;

impl ReentrancyGuard {
    pub fn enter(e: &Env) -> Result<(), ProcessorError> {
        if Self::is_entered(e) {
            log!(e, "reentrant call rejected");
            return Err(ProcessorError::Reentrant);
        }
        e.storage().instance().set(&LOCKED, &true);
        Ok(())
    }

    pub fn exit(e: &Env) {
        e.storage().instance().remove(&LOCKED);
    }

    pub fn is_entered(e: &Env) -> bool {
        e.storage().instance().get::<_, bool>(&LOCKED).unwrap_or(false)
    }
}
