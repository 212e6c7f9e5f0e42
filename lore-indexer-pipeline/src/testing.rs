//! In-memory source and search engine used by the pipeline tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use lore_indexer_repository::{Mapping, SearchEngineClient, SearchError};
use lore_indexer_shared::{
    Course, LearningResource, LearningResourceDocument, RepositoryId, ResourceId,
    ResourceTypeId, VocabularyId,
};
use lore_indexer_source::{
    LoreSource, RepositoryRow, SourceError, TermAssociation, TermRow, VocabularyRow,
};

/// Relational source backed by vectors.
#[derive(Default)]
pub struct InMemorySource {
    pub resource_types: Vec<(ResourceTypeId, String)>,
    pub repositories: Vec<RepositoryRow>,
    pub vocabularies: BTreeMap<RepositoryId, Vec<VocabularyRow>>,
    pub terms: BTreeMap<VocabularyId, Vec<TermRow>>,
    pub courses: Vec<Course>,
    pub resources: Vec<LearningResource>,
    pub associations: Vec<TermAssociation>,
    /// Cursor passed to every `learning_resources` call, in order.
    pub page_requests: Mutex<Vec<ResourceId>>,
    /// Errors returned by the next `learning_resources` calls.
    pub page_failures: Mutex<VecDeque<SourceError>>,
    pub association_queries: Mutex<Vec<(ResourceId, ResourceId)>>,
    /// Serve pages from the start of the course whatever the cursor.
    pub ignore_cursor: bool,
}

impl InMemorySource {
    pub fn add_repository(&mut self, id: RepositoryId, name: &str, slug: &str) {
        self.repositories.push(RepositoryRow {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        });
    }

    pub fn add_vocabulary(&mut self, repository_id: RepositoryId, id: VocabularyId, name: &str) {
        self.vocabularies
            .entry(repository_id)
            .or_default()
            .push(VocabularyRow {
                id,
                name: name.to_string(),
            });
    }

    pub fn add_term(&mut self, vocabulary_id: VocabularyId, id: i64, label: &str) {
        self.terms.entry(vocabulary_id).or_default().push(TermRow {
            id,
            label: label.to_string(),
        });
    }

    pub fn add_course(&mut self, repository_id: RepositoryId, id: i64, number: &str) {
        self.courses.push(Course {
            id,
            repository_id,
            org: "MITx".to_string(),
            run: "2015_Fall".to_string(),
            course_number: number.to_string(),
        });
    }

    pub fn add_resource(&mut self, course_id: i64, id: ResourceId, title: &str) {
        let repository_id = self
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| c.repository_id)
            .unwrap_or_default();
        self.resources.push(LearningResource {
            id,
            course_id,
            repository_id,
            title: title.to_string(),
            content_xml: format!("<p>{}</p>", title),
            resource_type_id: 1,
            ..LearningResource::default()
        });
    }

    pub fn associate(&mut self, term_id: i64, resource_id: ResourceId) {
        self.associations.push(TermAssociation {
            term_id,
            resource_id,
        });
    }

    pub fn page_requests(&self) -> Vec<ResourceId> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn fail_next_page(&self, error: SourceError) {
        self.page_failures.lock().unwrap().push_back(error);
    }
}

#[async_trait]
impl LoreSource for InMemorySource {
    async fn resource_types(&self) -> Result<Vec<(ResourceTypeId, String)>, SourceError> {
        Ok(self.resource_types.clone())
    }

    async fn repositories(&self) -> Result<Vec<RepositoryRow>, SourceError> {
        let mut rows = self.repositories.clone();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn vocabularies(
        &self,
        repository_id: RepositoryId,
    ) -> Result<Vec<VocabularyRow>, SourceError> {
        Ok(self
            .vocabularies
            .get(&repository_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn vocabulary_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self
            .vocabularies
            .values()
            .flatten()
            .map(|v| v.name.clone())
            .collect())
    }

    async fn terms(&self, vocabulary_id: VocabularyId) -> Result<Vec<TermRow>, SourceError> {
        Ok(self.terms.get(&vocabulary_id).cloned().unwrap_or_default())
    }

    async fn courses(&self, repository_id: RepositoryId) -> Result<Vec<Course>, SourceError> {
        let mut courses: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| c.repository_id == repository_id)
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }

    async fn learning_resources(
        &self,
        course: &Course,
        after_id: ResourceId,
        limit: usize,
    ) -> Result<Vec<LearningResource>, SourceError> {
        self.page_requests.lock().unwrap().push(after_id);
        if let Some(error) = self.page_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut page: Vec<LearningResource> = self
            .resources
            .iter()
            .filter(|r| r.course_id == course.id && (self.ignore_cursor || r.id > after_id))
            .cloned()
            .collect();
        page.sort_by_key(|r| r.id);
        page.truncate(limit);
        Ok(page)
    }

    async fn term_associations(
        &self,
        min_id: ResourceId,
        max_id: ResourceId,
    ) -> Result<Vec<TermAssociation>, SourceError> {
        self.association_queries
            .lock()
            .unwrap()
            .push((min_id, max_id));
        Ok(self
            .associations
            .iter()
            .filter(|a| a.resource_id >= min_id && a.resource_id <= max_id)
            .copied()
            .collect())
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Search engine that keeps documents in a map keyed by document id.
#[derive(Default)]
pub struct InMemorySearchEngine {
    pub index_exists: AtomicBool,
    pub mapping: Mutex<Option<Mapping>>,
    pub documents: Mutex<BTreeMap<String, LearningResourceDocument>>,
    pub create_index_calls: AtomicUsize,
    pub put_mapping_calls: AtomicUsize,
    pub bulk_calls: AtomicUsize,
    /// Errors returned by the next `bulk_index` calls.
    pub bulk_failures: Mutex<VecDeque<SearchError>>,
    /// Fail every `bulk_index` call from the given call number onwards.
    pub failing_from: Mutex<Option<(usize, SearchError)>>,
}

impl InMemorySearchEngine {
    pub fn document(&self, id: &str) -> Option<LearningResourceDocument> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn fail_next_bulk(&self, error: SearchError) {
        self.bulk_failures.lock().unwrap().push_back(error);
    }

    pub fn fail_bulk_from(&self, call: usize, error: SearchError) {
        *self.failing_from.lock().unwrap() = Some((call, error));
    }

    pub fn writes(&self) -> usize {
        self.create_index_calls.load(Ordering::SeqCst)
            + self.put_mapping_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchEngineClient for InMemorySearchEngine {
    async fn index_exists(&self) -> Result<bool, SearchError> {
        Ok(self.index_exists.load(Ordering::SeqCst))
    }

    async fn create_index(&self) -> Result<(), SearchError> {
        self.create_index_calls.fetch_add(1, Ordering::SeqCst);
        self.index_exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn mapping_exists(&self) -> Result<bool, SearchError> {
        Ok(self.mapping.lock().unwrap().is_some())
    }

    async fn put_mapping(&self, mapping: &Mapping) -> Result<(), SearchError> {
        self.put_mapping_calls.fetch_add(1, Ordering::SeqCst);
        *self.mapping.lock().unwrap() = Some(mapping.clone());
        Ok(())
    }

    async fn bulk_index(&self, documents: &[LearningResourceDocument]) -> Result<(), SearchError> {
        let call = self.bulk_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(error) = self.bulk_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        if let Some((from, error)) = self.failing_from.lock().unwrap().as_ref() {
            if call >= *from {
                return Err(error.clone());
            }
        }

        let mut stored = self.documents.lock().unwrap();
        for doc in documents {
            stored.insert(doc.document_id(), doc.clone());
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}
