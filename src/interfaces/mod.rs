//! Inbound adapters. The only one in scope is the CSV event script the CLI
//! replays against the engine.

pub mod csv;
