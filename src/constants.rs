// Constants module - centralized default values
//
// Fixed protocol values and configuration defaults live here instead of
// being scattered as magic numbers.

// =============================================================================
// Secure erase
// =============================================================================

/// Number of random-data passes performed by `shred` before the zero pass
pub const SHRED_ITERATIONS: usize = 3;

/// Block size used when overwriting a file during `shred` (4 KiB)
pub const SHRED_BLOCK_SIZE: usize = 4 * 1024;

// =============================================================================
// Codec
// =============================================================================

/// Nullable boolean byte for `Some(true)`
pub const NULLABLE_BOOL_TRUE: u8 = 0b11;

/// Nullable boolean byte for `Some(false)`
pub const NULLABLE_BOOL_FALSE: u8 = 0b10;

/// Nullable boolean byte for `None`
pub const NULLABLE_BOOL_ABSENT: u8 = 0;

/// Length prefix marking an absent nullable string
pub const NULLABLE_STRING_ABSENT_LEN: i32 = -1;

// =============================================================================
// Configuration defaults
// =============================================================================

/// Default configuration file looked up by the CLI
pub const DEFAULT_CONFIG_PATH: &str = "filecache.yaml";

/// Default maximum age in seconds (0 disables age invalidation)
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 0;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name prefix of the uniquely named temp file behind each in-flight write
pub const TEMP_FILE_PREFIX: &str = ".filecache-";
