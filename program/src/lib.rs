#[cfg(feature = "bpf-entrypoint")]
pub mod entrypoint;
pub mod bdv;
mod codec;
pub mod error;
pub mod events;
pub mod instruction;
pub mod ledger;
pub mod migration;
pub mod processor;
pub mod rewards;
pub mod state;

solana_program::declare_id!("SiLo111111111111111111111111111111111111111");
