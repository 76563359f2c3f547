use std::fmt;

use serde::Serialize;

pub const NONE_SAVED: &str = "(none)";

/// Words saved during a session, unique and in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SaveList {
    words: Vec<String>,
}

impl SaveList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `word` unless an exact match is already saved.
    /// Returns whether the list changed.
    pub fn add(&mut self, word: &str) -> bool {
        if self.contains(word) {
            return false;
        }
        self.words.push(word.to_owned());
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// `(none)` while empty, otherwise the words joined by `, `.
impl fmt::Display for SaveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.words.is_empty() {
            true => write!(f, "{}", NONE_SAVED),
            false => write!(f, "{}", self.words.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_shows_none() {
        let list = SaveList::new();
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "(none)");
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut list = SaveList::new();
        assert!(list.add("cat"));
        assert!(list.add("dog"));
        assert!(!list.add("cat"));
        assert_eq!(list.words(), ["cat", "dog"]);
        assert_eq!(list.to_string(), "cat, dog");
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut once = SaveList::new();
        once.add("hat");

        let mut twice = SaveList::new();
        twice.add("hat");
        twice.add("hat");

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_match_is_exact() {
        let mut list = SaveList::new();
        list.add("Cat");
        list.add("cat");
        list.add("cat ");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let mut list = SaveList::new();
        list.add("cat");
        list.add("dog");
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["cat","dog"]"#);
    }
}
