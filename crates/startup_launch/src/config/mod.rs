//! Startup item model and the persistent configuration store

mod item;
mod store;

pub use item::*;
pub use store::*;
