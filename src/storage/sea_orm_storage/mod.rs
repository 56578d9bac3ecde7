//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod grade_records;
mod resolution_requests;

use crate::config::AppConfig;
use crate::errors::{GradeflowError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradeflowError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GradeflowError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| GradeflowError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GradeflowError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    grades::{
        entities::{GradeRecord, GradeStatus},
        requests::GradeWrite,
    },
    resolutions::{
        entities::{ApprovalStatus, ResolutionRequest},
        requests::{NewResolutionRequest, ResolutionListQuery},
        responses::ResolutionListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 成绩记录模块
    async fn get_grade_record_by_id(&self, id: i64) -> Result<Option<GradeRecord>> {
        self.get_grade_record_by_id_impl(id).await
    }

    async fn apply_direct_grade(
        &self,
        record_id: i64,
        expected_status: GradeStatus,
        write: GradeWrite,
    ) -> Result<GradeRecord> {
        self.apply_direct_grade_impl(record_id, expected_status, write)
            .await
    }

    async fn list_expired_inc_records(&self, now: DateTime<Utc>) -> Result<Vec<GradeRecord>> {
        self.list_expired_inc_records_impl(now).await
    }

    async fn expire_inc_record(
        &self,
        record_id: i64,
        fail_grade: f64,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord> {
        self.expire_inc_record_impl(record_id, fail_grade, now).await
    }

    // 处理申请模块
    async fn create_resolution_request(
        &self,
        req: NewResolutionRequest,
    ) -> Result<ResolutionRequest> {
        self.create_resolution_request_impl(req).await
    }

    async fn get_resolution_request_by_id(&self, id: i64) -> Result<Option<ResolutionRequest>> {
        self.get_resolution_request_by_id_impl(id).await
    }

    async fn get_open_request_for_record(
        &self,
        record_id: i64,
    ) -> Result<Option<ResolutionRequest>> {
        self.get_open_request_for_record_impl(record_id).await
    }

    async fn advance_request_to_registrar(
        &self,
        request_id: i64,
        head_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        self.advance_request_to_registrar_impl(request_id, head_notes, now)
            .await
    }

    async fn reject_request(
        &self,
        request_id: i64,
        expected_step: ApprovalStatus,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        self.reject_request_impl(request_id, expected_step, notes, now)
            .await
    }

    async fn revoke_request(
        &self,
        request_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        self.revoke_request_impl(request_id, now).await
    }

    async fn apply_resolution_approval(
        &self,
        request_id: i64,
        registrar_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(ResolutionRequest, GradeRecord)> {
        self.apply_resolution_approval_impl(request_id, registrar_notes, now)
            .await
    }

    async fn list_pending_resolutions_with_pagination(
        &self,
        query: ResolutionListQuery,
    ) -> Result<ResolutionListResponse> {
        self.list_pending_resolutions_with_pagination_impl(query)
            .await
    }
}
