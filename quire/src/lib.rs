//! Expose Quire's internal API for use in integration tests. The binary is the
//! supported interface.
pub mod cli;
pub mod commands;
pub mod sources;
