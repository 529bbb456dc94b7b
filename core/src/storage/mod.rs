pub mod kv;
pub mod state_store;
