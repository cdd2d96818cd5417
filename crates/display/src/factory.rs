//! Picks the render backend for the configured display type

use crate::backend::RenderBackend;
use crate::eink::EinkDisplay;
use crate::lcd::CharLcdDisplay;
use crate::mock::MockDisplay;
use crate::panel::TextPanel;
use taletiles_config::{DisplayConfig, DisplayType};
use taletiles_core::AppError;

/// Builds and initialises the backend for `config`.
///
/// Mock mode, a missing panel driver, or a failed `init` all end with a
/// [`MockDisplay`].
pub fn create_backend(
    config: &DisplayConfig,
    mock: bool,
    panel: Option<Box<dyn TextPanel>>,
) -> Box<dyn RenderBackend> {
    if mock || config.display_type == DisplayType::Mock {
        return mock_backend();
    }

    let Some(panel) = panel else {
        let err = AppError::HardwareUnavailable {
            device: config.display_type.to_string(),
            reason: "no panel driver".to_string(),
        };
        err.log();
        return mock_backend();
    };

    let mut backend: Box<dyn RenderBackend> = match config.display_type {
        DisplayType::Lcd1602 => Box::new(CharLcdDisplay::new(panel, config.clone())),
        _ => Box::new(EinkDisplay::new(panel)),
    };

    match backend.init() {
        Ok(()) => backend,
        Err(e) => {
            let err = AppError::HardwareUnavailable {
                device: config.display_type.to_string(),
                reason: e.to_string(),
            };
            err.log();
            mock_backend()
        }
    }
}

/// The display type a created backend behaves as
pub fn effective_type(backend: &dyn RenderBackend) -> DisplayType {
    match backend.name() {
        "lcd1602" => DisplayType::Lcd1602,
        "eink" => DisplayType::Eink,
        _ => DisplayType::Mock,
    }
}

fn mock_backend() -> Box<dyn RenderBackend> {
    let mut backend = MockDisplay::new();
    if let Err(e) = backend.init() {
        log::error!("Mock display init failed: {}", e);
    }
    Box::new(backend)
}
