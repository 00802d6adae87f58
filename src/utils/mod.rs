pub mod debounce;
pub mod logging;
pub mod time;

pub use debounce::{Debouncer, Throttle};
pub use time::{format_time, now_ms};
