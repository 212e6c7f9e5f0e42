//! `sqlx` backed implementation of [`LoreSource`].

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use super::queries::*;
use crate::errors::SourceError;
use crate::interfaces::{LoreSource, RepositoryRow, TermAssociation, TermRow, VocabularyRow};
use lore_indexer_shared::{
    Course, LearningResource, RepositoryId, ResourceId, ResourceTypeId, VocabularyId,
};

/// The indexer only ever has one query in flight.
const MAX_CONNECTIONS: u32 = 2;

/// Append `sslmode=disable` to a connection URL when SSL is turned off.
pub fn database_url(url: &str, disable_ssl: bool) -> String {
    if !disable_ssl {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}sslmode=disable", url, separator)
}

#[derive(sqlx::FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

#[derive(sqlx::FromRow)]
struct RepositoryRecord {
    id: i64,
    name: String,
    slug: String,
}

#[derive(sqlx::FromRow)]
struct TermRecord {
    id: i64,
    label: String,
}

#[derive(sqlx::FromRow)]
struct CourseRecord {
    id: i64,
    org: String,
    run: String,
    course_number: String,
}

#[derive(sqlx::FromRow)]
struct LearningResourceRecord {
    id: i64,
    title: String,
    description: String,
    content_xml: String,
    learning_resource_type_id: i64,
    xa_nr_views: i64,
    xa_nr_attempts: i64,
    xa_avg_grade: f64,
}

#[derive(sqlx::FromRow)]
struct TermMappingRecord {
    term_id: i64,
    learningresource_id: i64,
}

/// LORE database accessed through a small connection pool.
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Connect to the database and verify the connection.
    pub async fn connect(url: &str) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(url)
            .await
            .map_err(|e| SourceError::connection(e.to_string()))?;

        info!("Connected to LORE database");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoreSource for PostgresSource {
    async fn resource_types(&self) -> Result<Vec<(ResourceTypeId, String)>, SourceError> {
        let rows: Vec<NamedRow> = sqlx::query_as(RESOURCE_TYPE_QUERY)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    async fn repositories(&self) -> Result<Vec<RepositoryRow>, SourceError> {
        let rows: Vec<RepositoryRecord> = sqlx::query_as(REPOSITORY_QUERY)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| RepositoryRow {
                id: row.id,
                name: row.name,
                slug: row.slug,
            })
            .collect())
    }

    async fn vocabularies(
        &self,
        repository_id: RepositoryId,
    ) -> Result<Vec<VocabularyRow>, SourceError> {
        let rows: Vec<NamedRow> = sqlx::query_as(REPOSITORY_VOCABULARY_QUERY)
            .bind(repository_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| VocabularyRow {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn vocabulary_names(&self) -> Result<Vec<String>, SourceError> {
        let names: Vec<(String,)> = sqlx::query_as(VOCABULARY_NAME_QUERY)
            .fetch_all(&self.pool)
            .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    async fn terms(&self, vocabulary_id: VocabularyId) -> Result<Vec<TermRow>, SourceError> {
        let rows: Vec<TermRecord> = sqlx::query_as(TERM_QUERY)
            .bind(vocabulary_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TermRow {
                id: row.id,
                label: row.label,
            })
            .collect())
    }

    async fn courses(&self, repository_id: RepositoryId) -> Result<Vec<Course>, SourceError> {
        let rows: Vec<CourseRecord> = sqlx::query_as(COURSE_QUERY)
            .bind(repository_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Course {
                id: row.id,
                repository_id,
                org: row.org,
                run: row.run,
                course_number: row.course_number,
            })
            .collect())
    }

    #[instrument(skip(self, course), fields(course_id = course.id))]
    async fn learning_resources(
        &self,
        course: &Course,
        after_id: ResourceId,
        limit: usize,
    ) -> Result<Vec<LearningResource>, SourceError> {
        let limit = i64::try_from(limit)
            .map_err(|_| SourceError::query(format!("Page size {} out of range", limit)))?;

        let rows: Vec<LearningResourceRecord> = sqlx::query_as(LEARNING_RESOURCE_QUERY)
            .bind(course.id)
            .bind(after_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Fetched learning resources");

        Ok(rows
            .into_iter()
            .map(|row| LearningResource {
                id: row.id,
                course_id: course.id,
                repository_id: course.repository_id,
                title: row.title,
                description: row.description,
                content_xml: row.content_xml,
                resource_type_id: row.learning_resource_type_id,
                xa_nr_views: row.xa_nr_views,
                xa_nr_attempts: row.xa_nr_attempts,
                xa_avg_grade: row.xa_avg_grade,
                ..LearningResource::default()
            })
            .collect())
    }

    async fn term_associations(
        &self,
        min_id: ResourceId,
        max_id: ResourceId,
    ) -> Result<Vec<TermAssociation>, SourceError> {
        let rows: Vec<TermMappingRecord> = sqlx::query_as(TERM_MAPPING_QUERY)
            .bind(min_id)
            .bind(max_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TermAssociation {
                term_id: row.term_id,
                resource_id: row.learningresource_id,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| SourceError::connection(e.to_string()))?;
        Ok(())
    }
}
