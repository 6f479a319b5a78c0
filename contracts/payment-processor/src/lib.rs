#![no_std]

#[cfg(test)]
extern crate std;

mod contract;
pub mod error;
pub mod events;
pub mod fee;
pub mod merchant;
pub mod storage;
pub mod transfer;


pub use contract::*;
pub use error::ProcessorError;
pub use storage::{Order, OrderStatus, Settlement};
