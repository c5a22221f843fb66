//! Command implementations that are not plain service calls.

pub mod init;
