//! The lesson index: curriculum-ordered collection of lesson pages.
//!
//! Built once from the whole parsed batch, before any page is rendered, and
//! handed to the renderer as an immutable value.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::config::LessonsConfig;

use super::document::Document;
use super::render::PageInfo;

/// Lessons placed at the position of their slug in the curated order.
#[derive(Debug, Clone, Default)]
pub struct LessonIndex {
    slots: Vec<Option<PageInfo>>,
}

impl LessonIndex {
    /// Index every document whose layout is the lesson layout.
    ///
    /// Slugs missing from the curated order are logged and skipped, never
    /// written to a slot. When two documents share a slug the first one wins.
    pub fn build<'a>(
        documents: impl IntoIterator<Item = &'a Document>,
        config: &LessonsConfig,
    ) -> Self {
        let positions: HashMap<&str, usize> = config
            .order
            .iter()
            .enumerate()
            .map(|(index, slug)| (slug.as_str(), index))
            .collect();

        let mut slots: Vec<Option<PageInfo>> = vec![None; config.order.len()];

        for doc in documents {
            if doc.layout() != Some(config.layout.as_str()) {
                continue;
            }

            let Some(&index) = positions.get(doc.slug.as_str()) else {
                tracing::warn!(
                    slug = %doc.slug,
                    path = %doc.source_path.display(),
                    "Lesson is not listed in lessons.order, leaving it out of the index"
                );
                continue;
            };

            if let Some(existing) = &slots[index] {
                tracing::warn!(
                    slug = %doc.slug,
                    kept = %existing.url,
                    skipped = %doc.url,
                    "Duplicate lesson slug"
                );
                continue;
            }
            slots[index] = Some(PageInfo::from_document(doc));
        }

        for (slug, slot) in config.order.iter().zip(&slots) {
            if slot.is_none() {
                tracing::debug!(slug = %slug, "No document found for lesson");
            }
        }

        Self { slots }
    }

    /// Number of positions in the curriculum.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Indexed lessons in curriculum order, skipping empty positions.
    pub fn iter(&self) -> impl Iterator<Item = &PageInfo> {
        self.slots.iter().flatten()
    }

    /// Number of lessons actually indexed.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// The lessons before and after the page at `url` in curriculum order.
    ///
    /// Pages that are not indexed lessons have no neighbors.
    pub fn neighbors(&self, url: &str) -> LessonNeighbors<'_> {
        let lessons: Vec<&PageInfo> = self.iter().collect();
        let Some(position) = lessons.iter().position(|lesson| lesson.url == url) else {
            return LessonNeighbors::default();
        };

        LessonNeighbors {
            prev: position.checked_sub(1).map(|i| lessons[i]),
            next: lessons.get(position + 1).copied(),
        }
    }
}

impl Serialize for LessonIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.count()))?;
        for lesson in self.iter() {
            seq.serialize_element(lesson)?;
        }
        seq.end()
    }
}

/// Previous/next links for a lesson page.
#[derive(Debug, Default, serde::Serialize)]
pub struct LessonNeighbors<'a> {
    pub prev: Option<&'a PageInfo>,
    pub next: Option<&'a PageInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::build::document::FrontMatter;

    fn doc(slug: &str, layout: Option<&str>) -> Document {
        Document {
            source_path: PathBuf::from(format!("/site/content/{slug}.md")),
            slug: slug.to_string(),
            url: slug.to_string(),
            root_path: String::new(),
            front_matter: FrontMatter {
                layout: layout.map(str::to_string),
                ..FrontMatter::default()
            },
            body: String::new(),
        }
    }

    fn config(order: &[&str]) -> LessonsConfig {
        LessonsConfig {
            layout: "lesson".to_string(),
            order: order.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn slot(index: &LessonIndex, position: usize) -> Option<&PageInfo> {
        index.slots[position].as_ref()
    }

    fn slugs(index: &LessonIndex) -> Vec<&str> {
        index.iter().map(|lesson| lesson.slug.as_str()).collect()
    }

    #[test]
    fn test_lessons_follow_curated_order() {
        let docs = [
            doc("a", Some("lesson")),
            doc("b", Some("lesson")),
            doc("c", Some("lesson")),
        ];
        let index = LessonIndex::build(&docs, &config(&["b", "a", "c"]));

        assert_eq!(index.len(), 3);
        assert_eq!(slot(&index, 0).unwrap().slug, "b");
        assert_eq!(slot(&index, 1).unwrap().slug, "a");
        assert_eq!(slot(&index, 2).unwrap().slug, "c");
    }

    #[test]
    fn test_only_lesson_layout_is_indexed() {
        let docs = [
            doc("a", Some("lesson")),
            doc("b", Some("page")),
            doc("c", None),
        ];
        let index = LessonIndex::build(&docs, &config(&["a", "b", "c"]));

        assert_eq!(slugs(&index), vec!["a"]);
        assert!(slot(&index, 1).is_none());
        assert!(slot(&index, 2).is_none());
    }

    #[test]
    fn test_unlisted_lesson_is_skipped() {
        let docs = [doc("a", Some("lesson")), doc("stray", Some("lesson"))];
        let index = LessonIndex::build(&docs, &config(&["a"]));

        assert_eq!(index.len(), 1);
        assert_eq!(slugs(&index), vec!["a"]);
    }

    #[test]
    fn test_duplicate_slug_keeps_first() {
        let mut second = doc("a", Some("lesson"));
        second.url = "other/a".to_string();
        let docs = [doc("a", Some("lesson")), second];
        let index = LessonIndex::build(&docs, &config(&["a"]));

        assert_eq!(slot(&index, 0).unwrap().url, "a");
    }

    #[test]
    fn test_missing_lesson_leaves_gap() {
        let docs = [doc("a", Some("lesson")), doc("c", Some("lesson"))];
        let index = LessonIndex::build(&docs, &config(&["a", "b", "c"]));

        assert_eq!(index.len(), 3);
        assert_eq!(index.count(), 2);
        assert!(slot(&index, 1).is_none());
        assert_eq!(slugs(&index), vec!["a", "c"]);
    }

    #[test]
    fn test_serializes_in_curriculum_order() {
        let docs = [doc("a", Some("lesson")), doc("b", Some("lesson"))];
        let index = LessonIndex::build(&docs, &config(&["b", "a"]));

        let value = serde_json::to_value(&index).unwrap();
        let serialized: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|lesson| lesson["slug"].as_str().unwrap())
            .collect();
        assert_eq!(serialized, vec!["b", "a"]);
    }

    #[test]
    fn test_neighbors() {
        let docs = [
            doc("a", Some("lesson")),
            doc("b", Some("lesson")),
            doc("c", Some("lesson")),
        ];
        let index = LessonIndex::build(&docs, &config(&["a", "b", "c"]));

        let middle = index.neighbors("b");
        assert_eq!(middle.prev.unwrap().slug, "a");
        assert_eq!(middle.next.unwrap().slug, "c");

        let first = index.neighbors("a");
        assert!(first.prev.is_none());
        assert_eq!(first.next.unwrap().slug, "b");

        let unknown = index.neighbors("zzz");
        assert!(unknown.prev.is_none() && unknown.next.is_none());
    }
}
