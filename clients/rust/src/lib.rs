pub mod indexer;
pub mod instructions;
pub mod pdas;

pub use silo_program::{error, events, state as accounts, ID};
