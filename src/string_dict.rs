//! String interning for identifiers and string literals.
//!
//! The lexer routes every identifier and string literal through a [`StringDict`] so
//! that identical names share one `Rc<str>`. The checker relies on this to use
//! atoms as cheap hash keys for scope and member lookups.

use std::rc::Rc;

use rustc_hash::FxHashMap;

/// An interned string.
pub type Atom = Rc<str>;

/// A dictionary for deduplicating [`Atom`]s.
///
/// Strings inserted into the dictionary are stored once and subsequent
/// requests for the same string return a clone of the shared instance.
pub struct StringDict {
    /// Using Box<str> as key to avoid double-indirection through Rc.
    strings: FxHashMap<Box<str>, Atom>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Get an existing string or insert a new one.
    pub fn get_or_insert(&mut self, s: &str) -> Atom {
        if let Some(existing) = self.strings.get(s) {
            return Rc::clone(existing);
        }
        let atom: Atom = Rc::from(s);
        self.strings.insert(s.into(), Rc::clone(&atom));
        atom
    }

    /// Get an existing string without inserting.
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.strings.get(s).map(Rc::clone)
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_dict_deduplication() {
        let mut dict = StringDict::new();
        let s1 = dict.get_or_insert("hello");
        let s2 = dict.get_or_insert("hello");

        assert_eq!(s1, s2);
        // Should point to the same allocation
        assert!(Rc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_string_dict_different_strings() {
        let mut dict = StringDict::new();
        let s1 = dict.get_or_insert("hello");
        let s2 = dict.get_or_insert("world");

        assert_ne!(s1, s2);
        assert!(!Rc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_get_does_not_insert() {
        let mut dict = StringDict::new();
        dict.get_or_insert("length");
        assert!(dict.get("length").is_some());
        assert!(dict.get("nonexistent").is_none());
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_string_dict_len() {
        let mut dict = StringDict::new();
        assert_eq!(dict.len(), 0);
        assert!(dict.is_empty());

        dict.get_or_insert("hello");
        assert_eq!(dict.len(), 1);
        assert!(!dict.is_empty());

        // Same string doesn't increase count
        dict.get_or_insert("hello");
        assert_eq!(dict.len(), 1);

        dict.get_or_insert("world");
        assert_eq!(dict.len(), 2);
    }
}
