//! Runs event handlers so that a failing handler cannot take down the loop
//! that called it.

use crate::error::{InputError, InputResult};
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

/// Calls `handler`, converting both an `Err` and a panic into a logged
/// [`InputError`].
pub fn dispatch_guarded<F, E>(event: &str, handler: F) -> InputResult<()>
where
    F: FnOnce() -> Result<(), E>,
    E: Display,
{
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            log::error!("Error in {} handler: {}", event, e);
            Err(InputError::HandlerFailed {
                event: event.to_string(),
                message: e.to_string(),
            })
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Handler for {} panicked: {}", event, message);
            Err(InputError::HandlerPanicked {
                event: event.to_string(),
                message,
            })
        }
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
