//! Wire-level constants. Part of the external contract: callers may
//! assume these exact values.

/// Hard cap on a single line read by the line reader, terminator
/// included.
pub const MAX_LINE: usize = 8192;

/// Largest response payload the cache will admit.
pub const MAX_OBJECT_SIZE: usize = 102_400;

/// Largest total size the cache's entries may sum to.
pub const MAX_CACHE_SIZE: usize = 1_049_000;
