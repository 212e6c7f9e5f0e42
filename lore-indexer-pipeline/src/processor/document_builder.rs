//! Document builder implementation.
//!
//! Transforms annotated learning resources into flat search documents.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use super::markup::strip_tags;
use crate::errors::PipelineError;
use lore_indexer_shared::{
    Course, DocumentError, LearningResource, LearningResourceDocument, Repository,
    ResourceTypes, RESERVED_FIELDS,
};

/// Sort key for a title: non-empty titles sort before empty ones.
pub fn title_sort_key(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        "1".to_string()
    } else {
        format!("0{}", trimmed)
    }
}

/// Builds search documents from annotated resources. Performs no I/O.
pub struct DocumentBuilder<'a> {
    resource_types: &'a ResourceTypes,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(resource_types: &'a ResourceTypes) -> Self {
        Self { resource_types }
    }

    /// Build the documents for a page of resources from one course.
    #[instrument(skip_all, fields(course_id = course.id, resources = page.len()))]
    pub fn build_page(
        &self,
        page: &[LearningResource],
        course: &Course,
        repository: &Repository,
    ) -> Result<Vec<LearningResourceDocument>, PipelineError> {
        let documents = page
            .iter()
            .map(|resource| self.build(resource, course, repository))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(documents = documents.len(), "Built document page");
        Ok(documents)
    }

    /// Build one document.
    ///
    /// # Arguments
    ///
    /// * `resource` - Resource whose term set has been filled in
    /// * `course` - The course owning the resource
    /// * `repository` - The repository owning the course, with its taxonomy
    pub fn build(
        &self,
        resource: &LearningResource,
        course: &Course,
        repository: &Repository,
    ) -> Result<LearningResourceDocument, PipelineError> {
        if resource.course_id != course.id
            || resource.repository_id != repository.id
            || course.repository_id != repository.id
        {
            return Err(DocumentError::OwnershipMismatch {
                resource_id: resource.id,
                course_id: resource.course_id,
                repository_id: resource.repository_id,
            }
            .into());
        }

        let resource_type = self
            .resource_types
            .name(resource.resource_type_id)
            .ok_or(DocumentError::UnknownResourceType {
                resource_id: resource.id,
                resource_type_id: resource.resource_type_id,
            })?;

        Ok(LearningResourceDocument {
            id: resource.id,
            doc_id: resource.id,
            course: course.course_number.clone(),
            run: course.run.clone(),
            repository: repository.slug.clone(),
            resource_type: resource_type.to_string(),
            title: resource.title.clone(),
            description: resource.description.clone(),
            description_path: resource.description_path.clone(),
            content_xml: resource.content_xml.clone(),
            xa_nr_views: resource.xa_nr_views,
            xa_nr_attempts: resource.xa_nr_attempts,
            xa_avg_grade: resource.xa_avg_grade,
            preview_url: resource.preview_url.clone(),
            content_stripped: strip_tags(&resource.content_xml),
            titlesort: title_sort_key(&resource.title),
            vocabularies: vocabulary_fields(resource, repository)?,
        })
    }
}

/// One entry per repository vocabulary, valued with the resource's term labels.
///
/// Two vocabularies sharing a display name share one field.
fn vocabulary_fields(
    resource: &LearningResource,
    repository: &Repository,
) -> Result<BTreeMap<String, Vec<String>>, PipelineError> {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for vocabulary_id in repository.vocabulary_ids() {
        let name = repository.vocabulary_name(vocabulary_id)?;
        if RESERVED_FIELDS.contains(&name) {
            return Err(DocumentError::ReservedFieldName(name.to_string()).into());
        }
        // A dot would be read as an object path.
        if name.trim().is_empty() || name.contains('.') {
            return Err(DocumentError::InvalidFieldName(name.to_string()).into());
        }
        fields.entry(name.to_string()).or_default();
    }

    for (vocabulary_id, term_ids) in resource.terms.iter() {
        let name = repository.vocabulary_name(vocabulary_id)?;
        let labels = term_ids
            .iter()
            .map(|id| repository.term(*id).map(|t| t.label.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        fields.entry(name.to_string()).or_default().extend(labels);
    }

    Ok(fields)
}
