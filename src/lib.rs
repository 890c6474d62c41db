// Library surface for headless/integration tests and reuse.
// Terminal drawing stays in the binary (main.rs / ui.rs).
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod event_log;
pub mod export;
pub mod recorder;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod util;
pub mod window;
