//! Repository taxonomy: vocabularies and the terms they contain.
//!
//! A [`Repository`] is loaded once per run together with all of its
//! vocabularies and terms, and is read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

use crate::resource::TermSet;
use crate::{RepositoryId, TermId, VocabularyId};

/// Errors raised when a lookup references taxonomy that was not loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// A term id is not part of the repository's term table.
    #[error("Unknown term {term_id} in repository {repository}")]
    UnknownTerm {
        repository: String,
        term_id: TermId,
    },

    /// A vocabulary id is not part of the repository's vocabulary table.
    #[error("Unknown vocabulary {vocabulary_id} in repository {repository}")]
    UnknownVocabulary {
        repository: String,
        vocabulary_id: VocabularyId,
    },
}

/// A labeled value within exactly one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub label: String,
    pub vocabulary_id: VocabularyId,
}

impl Term {
    pub fn new(label: impl Into<String>, vocabulary_id: VocabularyId) -> Self {
        Self {
            label: label.into(),
            vocabulary_id,
        }
    }
}

/// Top-level content collection owning courses and a taxonomy.
#[derive(Debug, Clone)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub slug: String,
    vocabularies: BTreeMap<VocabularyId, String>,
    terms: HashMap<TermId, Term>,
}

impl Repository {
    /// Create a repository with its fully loaded taxonomy.
    pub fn new(
        id: RepositoryId,
        name: impl Into<String>,
        slug: impl Into<String>,
        vocabularies: BTreeMap<VocabularyId, String>,
        terms: HashMap<TermId, Term>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            vocabularies,
            terms,
        }
    }

    /// Display name of a vocabulary.
    pub fn vocabulary_name(&self, vocabulary_id: VocabularyId) -> Result<&str, TaxonomyError> {
        self.vocabularies
            .get(&vocabulary_id)
            .map(String::as_str)
            .ok_or_else(|| TaxonomyError::UnknownVocabulary {
                repository: self.slug.clone(),
                vocabulary_id,
            })
    }

    /// Look up a term by id.
    pub fn term(&self, term_id: TermId) -> Result<&Term, TaxonomyError> {
        self.terms
            .get(&term_id)
            .ok_or_else(|| TaxonomyError::UnknownTerm {
                repository: self.slug.clone(),
                term_id,
            })
    }

    /// Vocabulary ids in ascending order.
    pub fn vocabulary_ids(&self) -> impl Iterator<Item = VocabularyId> + '_ {
        self.vocabularies.keys().copied()
    }

    pub fn vocabulary_count(&self) -> usize {
        self.vocabularies.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// A term set with an empty bucket for every vocabulary of this repository.
    pub fn empty_term_set(&self) -> TermSet {
        TermSet::for_vocabularies(self.vocabulary_ids())
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
