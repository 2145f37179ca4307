use std::collections::BTreeMap;

use crate::contact::{Contact, Field};

/// Lowercase a value for matching. Only case is folded; punctuation and
/// whitespace are left alone.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

/// Per-field substring patterns. Blank patterns are wildcards and are not
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    patterns: BTreeMap<Field, String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, pattern: &str) -> Self {
        self.set(field, pattern);
        self
    }

    pub fn set(&mut self, field: Field, pattern: &str) {
        if pattern.is_empty() {
            self.patterns.remove(&field);
        } else {
            self.patterns.insert(field, normalize(pattern));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = (Field, &str)> {
        self.patterns.iter().map(|(field, p)| (*field, p.as_str()))
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        self.active()
            .all(|(field, pattern)| normalize(contact.get(field)).contains(pattern))
    }
}

/// Contacts matching every non-blank criterion, in their original order.
pub fn filter(records: &[Contact], criteria: &Criteria) -> Vec<Contact> {
    if criteria.is_empty() {
        tracing::debug!(total = records.len(), "no criteria, every contact matches");
        return records.to_vec();
    }
    let matched: Vec<Contact> = records
        .iter()
        .filter(|contact| criteria.matches(contact))
        .cloned()
        .collect();
    tracing::debug!(
        criteria = criteria.active().count(),
        total = records.len(),
        matched = matched.len(),
        "filtered contacts"
    );
    matched
}
