use std::sync::OnceLock;
use std::time::Instant;

fn session_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

/// Debug-build diagnostics; stderr keeps stdout free for the event log.
pub fn dev_log(message: &str) {
    if !cfg!(debug_assertions) {
        return;
    }

    let elapsed = session_start().elapsed().as_millis();
    eprintln!("[{elapsed}ms][cafe] {message}");
}

#[macro_export]
macro_rules! log_dev {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            $crate::logging::dev_log(&format!($($arg)*));
        }
    };
}
