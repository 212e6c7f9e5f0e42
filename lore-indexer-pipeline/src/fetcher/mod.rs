//! Fetcher module for the search indexer pipeline.
//!
//! Pages through a course's learning resources in ascending id order using
//! a "greater than last seen id" cursor.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use lore_indexer_shared::{Course, LearningResource, RepositoryId, ResourceId};
use lore_indexer_source::LoreSource;

/// Default number of resources per page, which is also the bulk batch size.
pub const DEFAULT_PAGE_SIZE: usize = 250;

/// Fetches pages of learning resources from the relational source.
pub struct ResourceFetcher {
    source: Arc<dyn LoreSource>,
    retry: RetryPolicy,
    page_size: usize,
}

impl ResourceFetcher {
    pub fn new(source: Arc<dyn LoreSource>, retry: RetryPolicy, page_size: usize) -> Self {
        Self {
            source,
            retry,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Courses of a repository, ordered by id.
    pub async fn courses(&self, repository_id: RepositoryId) -> Result<Vec<Course>, PipelineError> {
        Ok(self
            .retry
            .run("courses", || self.source.courses(repository_id))
            .await?)
    }

    /// Start paging through a course, beginning after `start_after`.
    ///
    /// Pass 0 to read the course from the beginning.
    pub fn pages<'a>(&'a self, course: &'a Course, start_after: ResourceId) -> CoursePages<'a> {
        CoursePages {
            fetcher: self,
            course,
            cursor: start_after,
            exhausted: false,
        }
    }

    /// Fetch one page of up to `page_size` resources with id greater than `after_id`.
    #[instrument(skip(self, course), fields(course_id = course.id))]
    pub async fn fetch_page(
        &self,
        course: &Course,
        after_id: ResourceId,
    ) -> Result<Vec<LearningResource>, PipelineError> {
        let page = self
            .retry
            .run("learning_resources", || {
                self.source
                    .learning_resources(course, after_id, self.page_size)
            })
            .await?;

        debug!(count = page.len(), "Fetched page");
        Ok(page)
    }
}

/// Cursor over the pages of one course.
pub struct CoursePages<'a> {
    fetcher: &'a ResourceFetcher,
    course: &'a Course,
    cursor: ResourceId,
    exhausted: bool,
}

impl CoursePages<'_> {
    /// Id of the last resource returned so far.
    pub fn cursor(&self) -> ResourceId {
        self.cursor
    }

    /// Fetch the next page, or `None` once the course is exhausted.
    ///
    /// The cursor advances to the last id of each page. A page that does not
    /// start after the cursor is rejected rather than risking an endless loop.
    pub async fn next_page(&mut self) -> Result<Option<Vec<LearningResource>>, PipelineError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.fetcher.fetch_page(self.course, self.cursor).await?;

        let (first, last) = match (page.first(), page.last()) {
            (Some(first), Some(last)) => (first.id, last.id),
            _ => {
                self.exhausted = true;
                return Ok(None);
            }
        };

        if first <= self.cursor || last < first {
            return Err(PipelineError::CursorStalled {
                course_id: self.course.id,
                cursor: self.cursor,
                first_id: first,
            });
        }

        self.cursor = last;
        Ok(Some(page))
    }
}
