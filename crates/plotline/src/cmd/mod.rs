//! Command implementations for the plotline CLI

pub mod convert;
pub mod output;
pub mod query;
