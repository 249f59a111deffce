pub mod export;
pub mod json_store;
pub mod missed_log;
pub mod schema;
