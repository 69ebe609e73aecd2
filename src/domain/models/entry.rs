use crate::domain::{errors::ValidationError, value_objects::ObjectKey};

/// Separator between a folder prefix and the rest of an object key
pub const PREFIX_DELIMITER: char = '/';

/// A concrete stored object as yielded by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: ObjectKey,
    pub size: u64,
}

impl ObjectEntry {
    pub fn new(key: ObjectKey, size: u64) -> Self {
        Self { key, size }
    }
}

/// A folder marker one level below the bucket root
///
/// The prefix always carries a trailing delimiter, so `cats/` never
/// matches objects stored under `catsup/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixEntry {
    prefix: String,
}

impl PrefixEntry {
    pub fn new(prefix: impl Into<String>) -> Result<Self, ValidationError> {
        let mut prefix = prefix.into();
        if prefix.trim_matches(PREFIX_DELIMITER).is_empty() {
            return Err(ValidationError::EmptyPrefix);
        }
        if !prefix.ends_with(PREFIX_DELIMITER) {
            prefix.push(PREFIX_DELIMITER);
        }
        Ok(Self { prefix })
    }

    /// The prefix including its trailing delimiter
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// The folder name without the trailing delimiter
    pub fn folder(&self) -> &str {
        self.prefix.trim_end_matches(PREFIX_DELIMITER)
    }
}

impl std::fmt::Display for PrefixEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

/// One item of a delimited listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    Object(ObjectEntry),
    Prefix(PrefixEntry),
}

impl ListingEntry {
    pub fn is_prefix(&self) -> bool {
        matches!(self, ListingEntry::Prefix(_))
    }

    pub fn into_prefix(self) -> Option<PrefixEntry> {
        match self {
            ListingEntry::Prefix(prefix) => Some(prefix),
            ListingEntry::Object(_) => None,
        }
    }
}
