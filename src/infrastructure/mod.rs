//! Provider adapters: an in-memory simulation of the provider connection,
//! and an optional RocksDB-backed customer store for persistent replays.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
