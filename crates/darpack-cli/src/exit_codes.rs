//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions where applicable. Argument
//! errors are reported by clap with its own code (2).

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Archive error - package could not be built or read
pub const ARCHIVE_ERROR: i32 = 3;

/// Config error - invalid configuration file or options
pub const CONFIG_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
