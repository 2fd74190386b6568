pub mod keywords;
pub mod parser;

use std::collections::HashMap;

pub use keywords::{is_structural_name, Keyword, KeywordValue};
pub use parser::{HeaderCard, HeaderParser};

/// Ordered set of header cards with case-insensitive lookup.
///
/// Value keywords are unique: `set` updates the first card with that name
/// in place. Commentary cards (`HISTORY`, `COMMENT`, blank) are never
/// indexed and may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    keywords: Vec<Keyword>,
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a card without replacing an existing one of the same name.
    pub fn append(&mut self, keyword: Keyword) {
        let position = self.keywords.len();
        if !keyword.is_commentary() {
            self.index.entry(keyword.name.clone()).or_insert(position);
        }
        self.keywords.push(keyword);
    }

    /// Replaces the value and comment of an existing card, or appends it.
    pub fn add_keyword(&mut self, keyword: Keyword) {
        if keyword.is_commentary() {
            self.keywords.push(keyword);
            return;
        }
        match self.index.get(&keyword.name) {
            Some(&position) => self.keywords[position] = keyword,
            None => self.append(keyword),
        }
    }

    pub fn get_keyword(&self, name: &str) -> Option<&Keyword> {
        self.index
            .get(&name.to_ascii_uppercase())
            .and_then(|&position| self.keywords.get(position))
    }

    pub fn get(&self, name: &str) -> Option<&KeywordValue> {
        self.get_keyword(name)?.value.as_ref()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get_keyword(name).is_some()
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_string()
    }

    pub fn get_real(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_real()
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_integer()
    }

    pub fn get_logical(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_logical()
    }

    pub fn get_comment(&self, name: &str) -> Option<&str> {
        self.get_keyword(name)?.comment.as_deref()
    }

    /// Sets a value, keeping the existing comment if the card is present.
    pub fn set(&mut self, name: &str, value: impl Into<KeywordValue>) {
        let key = name.to_ascii_uppercase();
        match self.index.get(&key) {
            Some(&position) => self.keywords[position].value = Some(value.into()),
            None => self.append(Keyword::new(key).with_value(value)),
        }
    }

    pub fn set_with_comment(&mut self, name: &str, value: impl Into<KeywordValue>, comment: &str) {
        self.add_keyword(Keyword::new(name).with_value(value).with_comment(comment));
    }

    /// Returns false if the card is absent.
    pub fn set_comment(&mut self, name: &str, comment: &str) -> bool {
        match self.index.get(&name.to_ascii_uppercase()) {
            Some(&position) => {
                self.keywords[position].comment = Some(comment.to_string());
                true
            }
            None => false,
        }
    }

    /// Removes every card with this name. Absence is not an error.
    pub fn delete_if_present(&mut self, name: &str) -> bool {
        let key = name.to_ascii_uppercase();
        let before = self.keywords.len();
        self.keywords.retain(|k| k.name != key);
        let removed = self.keywords.len() != before;
        if removed {
            self.rebuild_index();
        }
        removed
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Keyword) -> bool,
    {
        let before = self.keywords.len();
        self.keywords.retain(|k| keep(k));
        if self.keywords.len() != before {
            self.rebuild_index();
        }
    }

    pub fn add_history(&mut self, text: impl Into<String>) {
        self.append(Keyword::history(text));
    }

    pub fn add_comment(&mut self, text: impl Into<String>) {
        self.append(Keyword::comment(text));
    }

    /// Splits off every card from `position` onward into a new header.
    pub fn split_off(&mut self, position: usize) -> Header {
        let tail = self.keywords.split_off(position.min(self.keywords.len()));
        self.rebuild_index();
        let mut header = Header::new();
        for keyword in tail {
            header.append(keyword);
        }
        header
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_ascii_uppercase()).copied()
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, keyword) in self.keywords.iter().enumerate() {
            if !keyword.is_commentary() {
                self.index.entry(keyword.name.clone()).or_insert(position);
            }
        }
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}
