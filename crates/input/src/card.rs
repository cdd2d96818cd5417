//! Card reader capability and the in-memory reader used without hardware

use crate::error::ReaderError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taletiles_core::CardId;

/// Anything that can report which card, if any, is on the reader right now
pub trait CardReader: Send {
    fn name(&self) -> &'static str;

    /// One sample of the reader. `Ok(None)` means no card in the field.
    fn attempt_read(&mut self) -> Result<Option<CardId>, ReaderError>;

    /// Releases the underlying device
    fn close(&mut self) {}
}

/// Reader whose "card in the field" is set programmatically.
///
/// Clones share state, so the keyboard driver can hold one handle while the
/// monitor polls another.
#[derive(Debug, Clone, Default)]
pub struct MockCardReader {
    card: Arc<Mutex<Option<CardId>>>,
    failures: Arc<AtomicUsize>,
}

impl MockCardReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&self, card_id: impl Into<CardId>) {
        let card_id = card_id.into();
        log::debug!("Mock: card {} placed on reader", card_id);
        *self.slot() = Some(card_id);
    }

    pub fn remove(&self) {
        log::debug!("Mock: card removed from reader");
        *self.slot() = None;
    }

    /// Places `card_id`, or removes it if it is already on the reader.
    /// Returns whether the card is now present.
    pub fn toggle(&self, card_id: impl Into<CardId>) -> bool {
        let card_id = card_id.into();
        let mut slot = self.slot();
        if slot.as_ref() == Some(&card_id) {
            *slot = None;
            false
        } else {
            *slot = Some(card_id);
            true
        }
    }

    pub fn current(&self) -> Option<CardId> {
        self.slot().clone()
    }

    /// Makes the next `count` reads fail
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CardId>> {
        self.card.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CardReader for MockCardReader {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn attempt_read(&mut self) -> Result<Option<CardId>, ReaderError> {
        let pending = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if pending.is_ok() {
            return Err(ReaderError::ReadFailed("simulated read error".to_string()));
        }
        Ok(self.current())
    }
}
