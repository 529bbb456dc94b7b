pub mod catalog;
pub mod config;
pub mod incident;
pub mod labels;
pub mod storage;
pub mod toast;
pub mod triage;
pub mod view;

pub mod error;
