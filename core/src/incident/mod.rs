pub mod export;
pub mod model;
pub mod reconcile;
pub mod render;
pub mod rules;
pub mod summary;
pub mod workflow;
