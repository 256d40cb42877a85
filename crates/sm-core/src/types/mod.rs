//! Core data types, enums, and feed payload structures.
//!
//! Entities deserialize from the indexer's camelCase JSON. Every payload
//! field that a heartbeat or partial frame may omit is an `Option`.

pub mod enums;
pub mod events;
pub mod ids;
pub mod market_data;
pub mod trading;

pub use enums::*;
pub use events::*;
pub use ids::*;
pub use market_data::*;
pub use trading::*;
