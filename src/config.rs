//! Compile-time resource budgets for the interpreter.
//!
//! Mirrors the `RINHA_CONFIG_*` constants of the reference implementation:
//! fixed limits rather than runtime-configurable knobs. There is no config
//! file and no environment variable; a limit is exceeded only with a fatal
//! `ResourceLimit`/`StackOverflow` error, never with silent unbounded growth.

/// Maximum byte length of any `Value::String`. Concatenation beyond this
/// truncates rather than erroring.
pub const STRING_VALUE_SIZE: usize = 1024;

/// Maximum call-stack depth before a run fails with `StackOverflow`.
pub const STACK_SIZE: usize = 8192;

/// Number of buckets in each function's memoization cache.
pub const CACHE_SIZE: usize = 4099;

/// Maximum parameter count for a function literal.
pub const FUNCTION_ARGS_SIZE: usize = 6;

/// Maximum number of leading integer arguments considered by the memo cache key.
pub const CACHE_KEY_ARGS: usize = 3;
