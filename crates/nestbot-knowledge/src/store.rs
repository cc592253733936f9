//! Knowledge store: an ordered `category → fact | {subcategory → fact}` map.

use nestbot_core::error::{NestBotError, Result};
use serde_json::Value;
use std::path::Path;

/// Value stored under a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeEntry {
    /// A single fact for the whole category.
    Fact(String),
    /// Ordered `subcategory → fact` pairs.
    Section(Vec<(String, String)>),
}

impl KnowledgeEntry {
    /// Fact stored under `subcategory`, for sections.
    pub fn get(&self, subcategory: &str) -> Option<&str> {
        match self {
            KnowledgeEntry::Fact(_) => None,
            KnowledgeEntry::Section(items) => items
                .iter()
                .find(|(name, _)| name == subcategory)
                .map(|(_, fact)| fact.as_str()),
        }
    }
}

/// Ordered category map. Iteration follows the source document order, or
/// insertion order for match results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<(String, KnowledgeEntry)>,
}

/// Entries selected for one query. Same shape as the knowledge base.
pub type MatchResult = KnowledgeBase;

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file, degrading to an empty base on any failure.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(kb) => {
                tracing::info!(
                    "Successfully loaded knowledge base ({} categories) from {}",
                    kb.len(),
                    path.display()
                );
                kb
            }
            Err(e) => {
                tracing::error!("Failed to load knowledge base: {e}");
                Self::new()
            }
        }
    }

    /// Load from a JSON file.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NestBotError::Knowledge(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Build from an already parsed JSON value. The root must be an object;
    /// values that are neither strings nor objects of strings are skipped.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| NestBotError::Knowledge("root must be a JSON object".into()))?;

        let mut kb = Self::new();
        for (category, content) in root {
            if category.trim().is_empty() {
                tracing::warn!("Skipping knowledge entry with empty category name");
                continue;
            }
            match content {
                Value::String(fact) => kb.insert_fact(category, fact),
                Value::Object(section) => {
                    let mut items = Vec::with_capacity(section.len());
                    for (subcategory, info) in section {
                        match info {
                            Value::String(fact) if !subcategory.trim().is_empty() => {
                                items.push((subcategory.clone(), fact.clone()));
                            }
                            _ => tracing::warn!(
                                "Skipping knowledge entry {category}.{subcategory}: not a text fact"
                            ),
                        }
                    }
                    kb.entries
                        .push((category.clone(), KnowledgeEntry::Section(items)));
                }
                _ => tracing::warn!("Skipping knowledge category {category}: unsupported value"),
            }
        }
        Ok(kb)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnowledgeEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn categories(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn get(&self, category: &str) -> Option<&KnowledgeEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == category)
            .map(|(_, v)| v)
    }

    /// Set `category` to a flat fact, replacing any previous value in place.
    pub fn insert_fact(&mut self, category: &str, fact: &str) {
        let entry = KnowledgeEntry::Fact(fact.to_string());
        match self.entries.iter_mut().find(|(k, _)| k == category) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((category.to_string(), entry)),
        }
    }

    /// Set `category.subcategory`, creating the section on first use.
    /// Re-inserting an existing subcategory keeps its original position.
    pub fn insert_subentry(&mut self, category: &str, subcategory: &str, fact: &str) {
        let idx = match self.entries.iter().position(|(k, _)| k == category) {
            Some(idx) => idx,
            None => {
                self.entries
                    .push((category.to_string(), KnowledgeEntry::Section(Vec::new())));
                self.entries.len() - 1
            }
        };

        let slot = &mut self.entries[idx].1;
        if let KnowledgeEntry::Fact(_) = slot {
            *slot = KnowledgeEntry::Section(Vec::new());
        }
        if let KnowledgeEntry::Section(items) = slot {
            match items.iter_mut().find(|(name, _)| name == subcategory) {
                Some((_, existing)) => *existing = fact.to_string(),
                None => items.push((subcategory.to_string(), fact.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "crash_fixes": {
            "out_of_memory": "increase virtual memory",
            "missing_dll": "reinstall the redistributables"
        },
        "developer_tools": "enable the dev menu with -nologos"
    }"#;

    #[test]
    fn test_parse_keeps_document_order() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert_eq!(kb.categories(), vec!["crash_fixes", "developer_tools"]);

        match kb.get("crash_fixes").unwrap() {
            KnowledgeEntry::Section(items) => {
                let names: Vec<&str> = items.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["out_of_memory", "missing_dll"]);
            }
            other => panic!("expected section, got {other:?}"),
        }
        assert_eq!(
            kb.get("developer_tools"),
            Some(&KnowledgeEntry::Fact("enable the dev menu with -nologos".into()))
        );
    }

    #[test]
    fn test_non_text_leaves_are_skipped() {
        let kb = KnowledgeBase::from_json_str(
            r#"{"a": {"x": "fact", "y": 3, "z": ["list"]}, "b": 42, "c": "ok"}"#,
        )
        .unwrap();
        assert_eq!(kb.categories(), vec!["a", "c"]);
        assert_eq!(kb.get("a").unwrap().get("x"), Some("fact"));
        assert_eq!(kb.get("a").unwrap().get("y"), None);
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(KnowledgeBase::from_json_str(r#"["a", "b"]"#).is_err());
    }

    #[test]
    fn test_load_missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load(&dir.path().join("nope.json"));
        assert!(kb.is_empty());
    }

    #[test]
    fn test_load_malformed_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"{ \"crash_fixes\": ")
            .unwrap();
        assert!(KnowledgeBase::load(&path).is_empty());
        assert!(KnowledgeBase::try_load(&path).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(KnowledgeBase::load(&path).len(), 2);
    }

    #[test]
    fn test_insert_subentry_keeps_position_on_overwrite() {
        let mut kb = KnowledgeBase::new();
        kb.insert_subentry("mods", "a", "first");
        kb.insert_subentry("mods", "b", "second");
        kb.insert_subentry("mods", "a", "again");

        assert_eq!(
            kb.get("mods"),
            Some(&KnowledgeEntry::Section(vec![
                ("a".into(), "again".into()),
                ("b".into(), "second".into()),
            ]))
        );
    }
}
