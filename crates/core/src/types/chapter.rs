//! Chapter markers

use serde::{Deserialize, Serialize};

/// A chapter start point inside the spine
///
/// `spine_index` names the file the chapter starts in and `offset_seconds`
/// is measured from the start of that file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pub spine_index: usize,
    pub offset_seconds: f64,
}

impl Chapter {
    pub fn new(index: usize, title: impl Into<String>, spine_index: usize, offset_seconds: f64) -> Self {
        Self {
            index,
            title: title.into(),
            spine_index,
            offset_seconds,
        }
    }

    /// True once playback at `(file_index, position)` has reached this chapter's start
    pub fn has_started_at(&self, file_index: usize, position: f64) -> bool {
        (self.spine_index, self.offset_seconds) <= (file_index, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_started_at() {
        let chapter = Chapter::new(1, "B", 0, 120.0);
        assert!(!chapter.has_started_at(0, 119.9));
        assert!(chapter.has_started_at(0, 120.0));
        assert!(chapter.has_started_at(1, 0.0));
    }
}
