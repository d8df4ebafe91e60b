use async_trait::async_trait;
use contracts::shared::logger::{LogBucket, LogEntry};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ConnAcquireErr, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RuntimeErr, Select, Statement,
};

use super::store::{LevelFilter, LogStore, StoreError, StoreErrorKind};

/// Строка таблицы log_entries (пишется bridge-сервисом, здесь только читается)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "log_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: DateTimeUtc,
    pub level: String,
    pub module: Option<String>,
    pub function: Option<String>,
    pub line_number: Option<i32>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub details: Option<Json>,
    pub source: Option<String>,
    pub processed: bool,
    pub notification_sent: bool,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LogEntry {
    fn from(m: Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            level: m.level,
            module: m.module,
            function: m.function,
            line_number: m.line_number,
            title: m.title,
            message: m.message,
            details: m.details,
            source: m.source,
            processed: m.processed,
            notification_sent: m.notification_sent,
            created_at: m.created_at,
        }
    }
}

/// `LogStore` backed by a sea-orm connection (SQLite or MySQL).
#[derive(Clone)]
pub struct SeaOrmLogStore {
    conn: DatabaseConnection,
}

impl SeaOrmLogStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn newest_first() -> Select<Entity> {
        Entity::find()
            .order_by_desc(Column::Timestamp)
            .order_by_desc(Column::Id)
    }
}

#[async_trait]
impl LogStore for SeaOrmLogStore {
    async fn query_recent_logs(&self, limit: u64) -> Result<Vec<LogEntry>, StoreError> {
        let rows = Self::newest_first()
            .limit(limit)
            .all(&self.conn)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn query_log_page(
        &self,
        page: u64,
        limit: u64,
        level: Option<&LevelFilter>,
    ) -> Result<(Vec<LogEntry>, u64), StoreError> {
        let mut query = Entity::find();
        if let Some(filter) = level {
            query = query.filter(level_condition(filter));
        }

        let total = query.clone().count(&self.conn).await.map_err(store_error)?;

        let offset = page.saturating_sub(1).saturating_mul(limit);
        let rows = query
            .order_by_desc(Column::Timestamp)
            .order_by_desc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .map_err(store_error)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn query_statistics_window(&self, window: u64) -> Result<Vec<LogEntry>, StoreError> {
        self.query_recent_logs(window).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.conn
            .query_one(Statement::from_string(
                self.conn.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

/// SQL counterpart of `LevelFilter::matches`.
fn level_condition(filter: &LevelFilter) -> SimpleExpr {
    let level = Expr::expr(Func::lower(Expr::col(Column::Level)));
    match filter {
        // Info is the catch-all bucket: anything that is not claimed by another one.
        LevelFilter::Bucket(LogBucket::Info) => {
            let claimed: Vec<&str> = LogBucket::ALL
                .iter()
                .filter(|b| **b != LogBucket::Info)
                .flat_map(|b| b.raw_levels().iter().copied())
                .collect();
            level.is_not_in(claimed)
        }
        LevelFilter::Bucket(bucket) => level.is_in(bucket.raw_levels().iter().copied()),
        LevelFilter::Critical => level.is_in(["critical", "fatal"]),
        LevelFilter::Raw(raw) => level.eq(raw.clone()),
    }
}

fn store_error(err: DbErr) -> StoreError {
    let kind = classify_db_error(&err);
    StoreError::new(kind, err.to_string())
}

pub fn classify_db_error(err: &DbErr) -> StoreErrorKind {
    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => StoreErrorKind::Timeout,
        DbErr::ConnectionAcquire(_) => StoreErrorKind::Unavailable,
        DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime) => match runtime {
            RuntimeErr::SqlxError(sqlx_err) => classify_sqlx_error(sqlx_err),
            RuntimeErr::Internal(_) => StoreErrorKind::Other,
        },
        _ => StoreErrorKind::Other,
    }
}

fn classify_sqlx_error(err: &sqlx::Error) -> StoreErrorKind {
    match err {
        sqlx::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => StoreErrorKind::Timeout,
        sqlx::Error::Io(_) => StoreErrorKind::Unavailable,
        sqlx::Error::PoolTimedOut => StoreErrorKind::Timeout,
        sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => StoreErrorKind::Unavailable,
        sqlx::Error::Database(db_err) => {
            // 28000 is the SQLSTATE for invalid authorization; MySQL reports it as errno 1045.
            let code = db_err.code();
            let auth_code = matches!(code.as_deref(), Some("28000") | Some("1045"));
            if auth_code || db_err.message().to_ascii_lowercase().contains("access denied") {
                StoreErrorKind::AuthFailure
            } else {
                StoreErrorKind::Other
            }
        }
        _ => StoreErrorKind::Other,
    }
}
