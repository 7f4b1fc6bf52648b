//! Database module exports.

pub mod models;
mod mongo;
pub mod repository;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use mongo::Database;
