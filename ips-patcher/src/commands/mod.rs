//! Command implementations

pub mod apply;
pub mod conflicts;
pub mod patches;
pub mod rom;
pub mod selection;
