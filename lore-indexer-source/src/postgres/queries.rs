//! SQL for the LORE query contracts.
//!
//! Integer columns are cast to BIGINT and floats to DOUBLE PRECISION so the
//! row models decode the same types regardless of the column definitions.

pub const RESOURCE_TYPE_QUERY: &str = r#"
    SELECT id::BIGINT AS id, name
    FROM learningresources_learningresourcetype
    ORDER BY id"#;

pub const REPOSITORY_QUERY: &str = r#"
    SELECT id::BIGINT AS id, name, slug
    FROM learningresources_repository
    ORDER BY id"#;

pub const REPOSITORY_VOCABULARY_QUERY: &str = r#"
    SELECT id::BIGINT AS id, name
    FROM taxonomy_vocabulary
    WHERE repository_id = $1
    ORDER BY id"#;

pub const VOCABULARY_NAME_QUERY: &str = r#"
    SELECT name
    FROM taxonomy_vocabulary
    ORDER BY id"#;

pub const TERM_QUERY: &str = r#"
    SELECT id::BIGINT AS id, label
    FROM taxonomy_term
    WHERE vocabulary_id = $1
    ORDER BY id"#;

pub const COURSE_QUERY: &str = r#"
    SELECT id::BIGINT AS id, org, run, course_number
    FROM learningresources_course
    WHERE repository_id = $1
    ORDER BY id"#;

pub const LEARNING_RESOURCE_QUERY: &str = r#"
    SELECT id::BIGINT AS id,
           title,
           description,
           content_xml,
           learning_resource_type_id::BIGINT AS learning_resource_type_id,
           xa_nr_views::BIGINT AS xa_nr_views,
           xa_nr_attempts::BIGINT AS xa_nr_attempts,
           xa_avg_grade::DOUBLE PRECISION AS xa_avg_grade
    FROM learningresources_learningresource
    WHERE course_id = $1 AND id > $2
    ORDER BY id
    LIMIT $3"#;

pub const TERM_MAPPING_QUERY: &str = r#"
    SELECT term_id::BIGINT AS term_id,
           learningresource_id::BIGINT AS learningresource_id
    FROM taxonomy_term_learning_resources
    WHERE learningresource_id >= $1 AND learningresource_id <= $2"#;
