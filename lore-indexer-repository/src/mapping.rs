//! Field mapping for learning resource documents.
//!
//! The mapping is derived from a fixed table of field roles plus the display
//! names of all vocabularies, which are indexed as exact-match facets. It is
//! submitted once, when the search engine has no mapping yet, and never
//! updated afterwards: changing vocabularies requires an index rebuild.

use std::collections::BTreeMap;

/// How a field is stored and searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Returned with results but not searchable.
    Stored,
    /// Searchable only by full-value equality.
    Exact,
    /// Tokenized for partial matches.
    FullText,
    /// Floating point number.
    Float,
    /// Integer number.
    Integer,
}

const STORED_FIELDS: &[&str] = &["content_xml", "description_path", "preview_url"];
const EXACT_FIELDS: &[&str] = &["course", "run", "repository", "resource_type", "titlesort"];
const FULL_TEXT_FIELDS: &[&str] = &["description", "content_stripped", "title"];
const FLOAT_FIELDS: &[&str] = &["xa_avg_grade", "xa_histogram_grade"];
const INTEGER_FIELDS: &[&str] = &["xa_nr_views", "xa_nr_attempts"];

/// Names of every field with a fixed role.
pub fn fixed_fields() -> impl Iterator<Item = &'static str> {
    STORED_FIELDS
        .iter()
        .chain(EXACT_FIELDS)
        .chain(FULL_TEXT_FIELDS)
        .chain(FLOAT_FIELDS)
        .chain(INTEGER_FIELDS)
        .copied()
}

/// Named container of field roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    name: String,
    fields: BTreeMap<String, FieldRole>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field, replacing any previous role for the same name.
    pub fn add_field(&mut self, name: impl Into<String>, role: FieldRole) {
        self.fields.insert(name.into(), role);
    }

    /// A string field returned with results but not searchable.
    pub fn add_stored_string(&mut self, name: impl Into<String>) {
        self.add_field(name, FieldRole::Stored);
    }

    /// A string field searchable only by an exact match.
    pub fn add_exact_string(&mut self, name: impl Into<String>) {
        self.add_field(name, FieldRole::Exact);
    }

    /// A string field searchable by partial matches.
    pub fn add_searchable_string(&mut self, name: impl Into<String>) {
        self.add_field(name, FieldRole::FullText);
    }

    pub fn add_float(&mut self, name: impl Into<String>) {
        self.add_field(name, FieldRole::Float);
    }

    pub fn add_integer(&mut self, name: impl Into<String>) {
        self.add_field(name, FieldRole::Integer);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self, field: &str) -> Option<FieldRole> {
        self.fields.get(field).copied()
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldRole)> {
        self.fields.iter().map(|(name, role)| (name.as_str(), *role))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Build the learning resource mapping.
///
/// Vocabulary names are added as exact-match fields. A vocabulary whose name
/// matches a fixed field does not override the fixed role.
pub fn build_mapping<S: AsRef<str>>(name: &str, vocabulary_names: &[S]) -> Mapping {
    let mut mapping = Mapping::new(name);

    for field in STORED_FIELDS {
        mapping.add_stored_string(*field);
    }
    for field in EXACT_FIELDS {
        mapping.add_exact_string(*field);
    }
    for field in FULL_TEXT_FIELDS {
        mapping.add_searchable_string(*field);
    }
    for field in FLOAT_FIELDS {
        mapping.add_float(*field);
    }
    for field in INTEGER_FIELDS {
        mapping.add_integer(*field);
    }

    for vocabulary in vocabulary_names {
        let vocabulary = vocabulary.as_ref();
        if mapping.role(vocabulary).is_none() {
            mapping.add_exact_string(vocabulary);
        }
    }

    mapping
}
