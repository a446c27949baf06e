//! Keyword translations.
//!
//! A `LocalizedKeyword` is keyed by the (keyword, language) pair, the same
//! shape of natural key the roster entities use.

use super::identity::EntityKind;
use super::{merge_field, merge_optional, Reconcilable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// ISO 639-1 code, upper case (`NL`, `EN`).
    pub iso_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguagePatch {
    pub name: Option<String>,
}

impl Reconcilable for Language {
    type Key = String;
    type Patch = LanguagePatch;

    const KIND: EntityKind = EntityKind::Language;

    fn create(key: &Self::Key) -> Self {
        Self {
            iso_code: key.clone(),
            name: String::new(),
        }
    }

    fn key(&self) -> Self::Key {
        self.iso_code.clone()
    }

    fn merge(&mut self, patch: &Self::Patch) -> bool {
        merge_field(&mut self.name, patch.name.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    /// Part of the curated keyword list rather than a club-specific one.
    pub is_standard: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordPatch {
    pub is_standard: Option<bool>,
}

impl Reconcilable for Keyword {
    type Key = String;
    type Patch = KeywordPatch;

    const KIND: EntityKind = EntityKind::Keyword;

    fn create(key: &Self::Key) -> Self {
        Self {
            id: key.clone(),
            is_standard: false,
        }
    }

    fn key(&self) -> Self::Key {
        self.id.clone()
    }

    fn merge(&mut self, patch: &Self::Patch) -> bool {
        merge_field(&mut self.is_standard, patch.is_standard.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalizedKeywordKey {
    pub keyword_id: String,
    pub language_code: String,
}

impl LocalizedKeywordKey {
    pub fn new(keyword_id: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            keyword_id: keyword_id.into(),
            language_code: language_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedKeyword {
    pub key: LocalizedKeywordKey,
    pub name: String,
    pub usage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedKeywordPatch {
    pub name: Option<String>,
    pub usage: Option<String>,
}

impl Reconcilable for LocalizedKeyword {
    type Key = LocalizedKeywordKey;
    type Patch = LocalizedKeywordPatch;

    const KIND: EntityKind = EntityKind::LocalizedKeyword;

    fn create(key: &Self::Key) -> Self {
        Self {
            key: key.clone(),
            name: String::new(),
            usage: None,
        }
    }

    fn key(&self) -> Self::Key {
        self.key.clone()
    }

    fn merge(&mut self, patch: &Self::Patch) -> bool {
        let mut modified = merge_field(&mut self.name, patch.name.as_ref());
        modified |= merge_optional(&mut self.usage, patch.usage.as_ref());
        modified
    }
}
