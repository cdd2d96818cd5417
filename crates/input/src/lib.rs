//! Card presence and button input for TaleTiles
//!
//! Both inputs are split into a pure state machine driven by explicit
//! timestamps ([`CardPresence`], [`InputDebouncer`]) and a background worker
//! that feeds it ([`CardMonitor`], [`ButtonWorker`]).

mod card;
mod debouncer;
mod dispatch;
mod error;
mod monitor;
mod worker;

pub use card::{CardReader, MockCardReader};
pub use debouncer::{InputDebouncer, DEFAULT_DOUBLE_CLICK_WINDOW};
pub use dispatch::{dispatch_guarded, panic_message};
pub use error::{InputError, InputResult, ReaderError};
pub use monitor::{CardMonitor, CardMonitorConfig, CardPresence};
pub use worker::{ButtonSignal, ButtonWorker};
