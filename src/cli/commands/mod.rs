//! Subcommand implementations.

pub mod ask;
pub mod init;
pub mod respond;
pub mod watch;
