//! Sound bank - key identifiers to playable sources

use splash_library::fold_key;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("Key already exists: {}", .0.to_uppercase())]
    DuplicateKey(char),
}

/// Maps keys (case-insensitive) to sound sources, remembering insertion order
#[derive(Debug, Clone)]
pub struct SoundBank<S> {
    sources: HashMap<char, S>,
    order: Vec<char>,
}

impl<S> SoundBank<S> {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Insert or overwrite the binding for `key`
    pub fn register(&mut self, key: char, source: S) {
        let key = fold_key(key);
        if self.sources.insert(key, source).is_none() {
            self.order.push(key);
        }
    }

    /// Insert a binding for a key that has none yet
    pub fn add(&mut self, key: char, source: S) -> Result<(), BankError> {
        let key = fold_key(key);
        if self.sources.contains_key(&key) {
            return Err(BankError::DuplicateKey(key));
        }
        self.register(key, source);
        Ok(())
    }

    /// Look up the source for `key`, ignoring case
    pub fn resolve(&self, key: char) -> Option<&S> {
        self.sources.get(&fold_key(key))
    }

    pub fn contains(&self, key: char) -> bool {
        self.sources.contains_key(&fold_key(key))
    }

    pub fn remove(&mut self, key: char) -> Option<S> {
        let key = fold_key(key);
        let removed = self.sources.remove(&key);
        if removed.is_some() {
            self.order.retain(|k| *k != key);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.order.clear();
    }

    /// Bound keys in the order they were first registered
    pub fn keys(&self) -> &[char] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<S> Default for SoundBank<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let mut bank = SoundBank::new();
        bank.register('Q', "q.mp3");
        assert_eq!(bank.resolve('q'), Some(&"q.mp3"));
        assert_eq!(bank.resolve('Q'), Some(&"q.mp3"));
        assert_eq!(bank.resolve('w'), None);
    }

    #[test]
    fn test_register_overwrites() {
        let mut bank = SoundBank::new();
        bank.register('a', "old.mp3");
        bank.register('A', "new.mp3");
        assert_eq!(bank.resolve('a'), Some(&"new.mp3"));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_add_duplicate_leaves_bank_unchanged() {
        let mut bank = SoundBank::new();
        bank.add('a', "a.mp3").unwrap();

        let err = bank.add('a', "other.mp3").unwrap_err();
        assert_eq!(err, BankError::DuplicateKey('a'));
        assert_eq!(err.to_string(), "Key already exists: A");
        assert_eq!(bank.resolve('a'), Some(&"a.mp3"));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut bank = SoundBank::new();
        for key in ['q', 'w', 'e', 'a'] {
            bank.register(key, ());
        }
        bank.register('w', ());
        assert_eq!(bank.keys(), &['q', 'w', 'e', 'a']);

        bank.remove('W');
        assert_eq!(bank.keys(), &['q', 'e', 'a']);

        bank.clear();
        assert!(bank.is_empty());
    }
}
