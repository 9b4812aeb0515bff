//! Runtime components for sequenced launching

pub mod engine;
pub mod events;
pub mod process;
pub mod strategy;

pub use engine::*;
pub use events::*;
pub use process::*;
pub use strategy::*;
