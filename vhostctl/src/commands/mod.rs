//! Command implementations.

pub mod machine;
pub mod snapshot;
