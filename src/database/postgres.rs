use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::{check_collection, DeleteResult, Document, DocumentStore, Update, UpdateResult};
use crate::filter::filter_where::json_path_literal;
use crate::filter::{Filter, SqlParam};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        seq        BIGSERIAL,
        collection TEXT  NOT NULL,
        id         UUID  NOT NULL,
        doc        JSONB NOT NULL,
        PRIMARY KEY (collection, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS documents_collection_seq ON documents (collection, seq)",
    "CREATE INDEX IF NOT EXISTS documents_doc_gin ON documents USING GIN (doc jsonb_path_ops)",
];

/// Document store over a single Postgres table.
///
/// Every collection lives in `documents`, keyed by `(collection, id)`;
/// `seq` provides insertion order for reads and for picking the first match
/// in `update_one` and `delete_one`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Document store schema is up to date");
        Ok(())
    }

    /// `$1` is always the collection; filter parameters follow.
    fn first_match(filter: &Filter) -> Result<(String, Vec<SqlParam>), DatabaseError> {
        let (where_clause, params) = filter.to_sql_where(1)?;
        let subquery = format!(
            "SELECT id FROM documents WHERE collection = $1 AND {} ORDER BY seq LIMIT 1",
            where_clause
        );
        Ok((subquery, params))
    }
}

/// Nested `jsonb_set` calls applying every assignment and increment to `doc`.
/// Parameters are numbered after `param_index`.
pub fn build_update_expression(update: &Update, mut param_index: usize) -> (String, Vec<SqlParam>) {
    let mut expression = "doc".to_string();
    let mut params = Vec::new();

    for (field, value) in &update.set {
        param_index += 1;
        expression = format!(
            "jsonb_set({}, {}, ${}::jsonb, true)",
            expression,
            json_path_literal(field),
            param_index
        );
        params.push(SqlParam::Jsonb(value.clone()));
    }

    for (field, by) in &update.inc {
        param_index += 1;
        let path = json_path_literal(field);
        expression = format!(
            "jsonb_set({}, {}, to_jsonb(COALESCE((doc #>> {})::numeric, 0) + ${}), true)",
            expression, path, path, param_index
        );
        params.push(SqlParam::BigInt(*by));
    }

    (expression, params)
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::BigInt(i) => q.bind(*i),
        SqlParam::Jsonb(v) => q.bind(v.clone()),
        SqlParam::Timestamp(ts) => q.bind(*ts),
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, DatabaseError> {
    let doc: Value = row.try_get("doc")?;
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::InvalidDocument(format!("expected object, found {}", other))),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<(), DatabaseError> {
        check_collection(collection)?;
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| DatabaseError::InvalidDocument("missing or malformed _id".to_string()))?;

        sqlx::query("INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await?;
        debug!("Inserted {} into {}", id, collection);
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        check_collection(collection)?;
        let (where_clause, params) = filter.to_sql_where(1)?;
        let query = format!(
            "SELECT doc FROM documents WHERE collection = $1 AND {} ORDER BY seq",
            where_clause
        );

        let mut q = sqlx::query(&query).bind(collection);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        check_collection(collection)?;
        let (where_clause, params) = filter.to_sql_where(1)?;
        let query = format!(
            "SELECT doc FROM documents WHERE collection = $1 AND {} ORDER BY seq LIMIT 1",
            where_clause
        );

        let mut q = sqlx::query(&query).bind(collection);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, DatabaseError> {
        check_collection(collection)?;
        update.validate()?;
        if update.is_empty() {
            let matched = self.find_one(collection, filter).await?.is_some() as u64;
            return Ok(UpdateResult { matched });
        }

        let (subquery, mut params) = Self::first_match(filter)?;
        let (expression, update_params) = build_update_expression(update, 1 + params.len());
        params.extend(update_params);

        let query = format!(
            "UPDATE documents SET doc = {} WHERE collection = $1 AND id = ({})",
            expression, subquery
        );

        let mut q = sqlx::query(&query).bind(collection);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(UpdateResult {
            matched: result.rows_affected(),
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteResult, DatabaseError> {
        check_collection(collection)?;
        let (subquery, params) = Self::first_match(filter)?;
        let query = format!(
            "DELETE FROM documents WHERE collection = $1 AND id = ({})",
            subquery
        );

        let mut q = sqlx::query(&query).bind(collection);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(DeleteResult {
            deleted: result.rows_affected(),
        })
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        check_collection(collection)?;
        let (where_clause, params) = filter.to_sql_where(1)?;
        let query = format!(
            "SELECT COUNT(*) AS count FROM documents WHERE collection = $1 AND {}",
            where_clause
        );

        let mut q = sqlx::query(&query).bind(collection);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
