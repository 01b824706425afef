//! Tracing subscriber initialization shared by CIVET services

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global fmt subscriber at the given maximum level.
///
/// A second call is a no-op: `set_global_default` refuses once a subscriber
/// is installed, which happens routinely when several integration tests
/// initialize logging in one process.
pub fn init(max_level: Level) {
    let subscriber = FmtSubscriber::builder().with_max_level(max_level).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
