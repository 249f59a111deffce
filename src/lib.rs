// The binary entry point is main.rs; the library target exposes the drill
// engine to integration tests and benchmarks.

pub mod app;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;
