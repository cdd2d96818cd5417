//! Display state publication and render backends for TaleTiles

mod backend;
mod eink;
mod error;
mod factory;
mod format;
mod lcd;
mod mock;
mod panel;
mod presenter;

pub use backend::RenderBackend;
pub use eink::{EinkDisplay, EINK_COLUMNS, EINK_ROWS};
pub use error::{DisplayError, DisplayResult};
pub use factory::{create_backend, effective_type};
pub use format::{ellipsize, fit, format_time, truncate};
pub use lcd::{CharLcdDisplay, LCD_COLUMNS};
pub use mock::MockDisplay;
pub use panel::{MemoryPanel, TextPanel};
pub use presenter::{DisplayPresenter, DEFAULT_TICK};
