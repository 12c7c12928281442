//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (malformed family file)
pub const DATAERR: i32 = 65;

/// Cannot open input (root member not found)
pub const NOINPUT: i32 = 66;

/// Service unavailable (document converter failed)
pub const UNAVAILABLE: i32 = 69;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
