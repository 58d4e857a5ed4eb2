//! Admission control: the allow-list guard and the fixed-window send limiter.

mod allow_list;
mod rate_limit;

pub mod errors;

pub use allow_list::AllowList;
pub use errors::AdmissionError;
pub use rate_limit::{RateWindow, SendLimit, WINDOW_MILLIS};
