// FILE: crates/media-engine/src/chapters.rs
//! Chapter lookup across a multi-file spine

use crate::error::{EngineError, EngineResult};
use taletiles_core::Chapter;

/// Chapters of one audiobook, ordered by `(spine_index, offset_seconds)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterList {
    chapters: Vec<Chapter>,
}

impl ChapterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list after checking it against a spine of `file_count` files.
    ///
    /// Chapters must reference existing files, have finite non-negative
    /// offsets, and be non-decreasing in `(spine_index, offset_seconds)`.
    /// Indices are renumbered densely from 0.
    pub fn validated(chapters: Vec<Chapter>, file_count: usize) -> EngineResult<Self> {
        for chapter in &chapters {
            if chapter.spine_index >= file_count {
                return Err(EngineError::InvalidChapters(format!(
                    "'{}' references file {} but only {} file(s) exist",
                    chapter.title, chapter.spine_index, file_count
                )));
            }
            if !chapter.offset_seconds.is_finite() || chapter.offset_seconds < 0.0 {
                return Err(EngineError::InvalidChapters(format!(
                    "'{}' has offset {}",
                    chapter.title, chapter.offset_seconds
                )));
            }
        }

        if let Some(pair) = chapters.windows(2).find(|w| {
            (w[1].spine_index, w[1].offset_seconds) < (w[0].spine_index, w[0].offset_seconds)
        }) {
            return Err(EngineError::InvalidChapters(format!(
                "'{}' starts before '{}'",
                pair[1].title, pair[0].title
            )));
        }

        let chapters = chapters
            .into_iter()
            .enumerate()
            .map(|(index, chapter)| Chapter { index, ..chapter })
            .collect();
        Ok(Self { chapters })
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    /// The last chapter whose start has been reached at `(file_index, position)`
    pub fn chapter_at(&self, file_index: usize, position: f64) -> Option<&Chapter> {
        let reached = self
            .chapters
            .partition_point(|c| c.has_started_at(file_index, position));
        reached.checked_sub(1).and_then(|i| self.chapters.get(i))
    }

    /// Formatted progress such as "3/15"
    pub fn progress(&self, current: Option<&Chapter>) -> String {
        match (current, self.len()) {
            (_, 0) => "No chapters".to_string(),
            (Some(ch), count) => format!("{}/{}", ch.index + 1, count),
            (None, count) => format!("-/{}", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChapterList {
        ChapterList::validated(
            vec![
                Chapter::new(0, "A", 0, 0.0),
                Chapter::new(1, "B", 0, 120.0),
                Chapter::new(2, "C", 1, 0.0),
            ],
            2,
        )
        .expect("Should accept ordered chapters")
    }

    #[test]
    fn test_chapter_resolution() {
        let list = sample();
        assert_eq!(list.chapter_at(0, 150.0).map(|c| c.title.as_str()), Some("B"));
        assert_eq!(list.chapter_at(1, 5.0).map(|c| c.title.as_str()), Some("C"));
        assert_eq!(list.chapter_at(0, 50.0).map(|c| c.title.as_str()), Some("A"));
    }

    #[test]
    fn test_chapter_boundary_is_inclusive() {
        let list = sample();
        assert_eq!(list.chapter_at(0, 120.0).map(|c| c.index), Some(1));
        assert_eq!(list.chapter_at(0, 119.99).map(|c| c.index), Some(0));
    }

    #[test]
    fn test_position_before_first_chapter() {
        let list = ChapterList::validated(vec![Chapter::new(0, "Late", 0, 30.0)], 1)
            .expect("Should accept");
        assert!(list.chapter_at(0, 10.0).is_none());
    }

    #[test]
    fn test_unsorted_chapters_rejected() {
        let result = ChapterList::validated(
            vec![Chapter::new(0, "B", 1, 0.0), Chapter::new(1, "A", 0, 10.0)],
            2,
        );
        assert!(matches!(result, Err(EngineError::InvalidChapters(_))));
    }

    #[test]
    fn test_out_of_range_spine_rejected() {
        let result = ChapterList::validated(vec![Chapter::new(0, "X", 3, 0.0)], 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_or_nan_offset_rejected() {
        assert!(ChapterList::validated(vec![Chapter::new(0, "X", 0, -1.0)], 1).is_err());
        assert!(ChapterList::validated(vec![Chapter::new(0, "X", 0, f64::NAN)], 1).is_err());
    }

    #[test]
    fn test_indices_are_renumbered() {
        let list = ChapterList::validated(
            vec![Chapter::new(7, "A", 0, 0.0), Chapter::new(7, "B", 0, 0.0)],
            1,
        )
        .expect("Should accept equal start points");
        assert_eq!(list.get(1).map(|c| c.index), Some(1));
    }

    #[test]
    fn test_progress() {
        let list = sample();
        assert_eq!(list.progress(list.get(2)), "3/3");
        assert_eq!(list.progress(None), "-/3");
        assert_eq!(ChapterList::new().progress(None), "No chapters");
    }
}
