/*!

A thin wrapper over the [`tracing`](https://docs.rs/tracing) crate. The rest of the code base should use the macros
exported from this module (`critical!`, `error!`, `warning!`, `info!`, `debug!`, `trace!`) instead of depending on
`tracing` directly, so the backing implementation can be swapped without touching call sites.

Call [`init_logging`] once, near the start of `main`, to install a subscriber that writes formatted, leveled output to
stderr. Libraries (including this crate) never call it themselves — only binaries should.

*/

/// Installs a global `tracing` subscriber that writes to stderr. Safe to call more than once; later calls are
/// no-ops.
pub fn init_logging() {
  use tracing_subscriber::{fmt, EnvFilter};

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  // `try_init` instead of `init` so a second call (e.g. from a test harness) doesn't panic.
  let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[macro_export]
macro_rules! critical {
    ($($arg:tt)*) => { $crate::tracing::error!(target: "critical", $($arg)*) };
}
pub use critical;

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::tracing::error!($($arg)*) };
}
pub use error;

#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => { $crate::tracing::warn!($($arg)*) };
}
pub use warning;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::tracing::info!($($arg)*) };
}
pub use info;

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::tracing::debug!($($arg)*) };
}
pub use debug;

#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::tracing::trace!($($arg)*) };
}
pub use trace;
