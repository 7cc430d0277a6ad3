// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod bank;
pub mod celebration;
pub mod config;
pub mod handoff;
pub mod quiz;
pub mod reflex;
pub mod runtime;
pub mod session_log;
pub mod stats;
pub mod time_series;
pub mod util;

/// Event loop cadence shared by the TUI and the engines' countdowns.
pub const TICK_RATE_MS: u64 = 100;
