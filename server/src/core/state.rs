//! 服务器状态
//!
//! ServerState 持有所有服务的共享引用，使用 Arc/Clone 实现浅拷贝，
//! 作为 axum 的应用状态在各 handler 间传递。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::services::ImageStore;
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub image_store: ImageStore,
}

impl ServerState {
    /// 初始化所有服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db_service = DbService::open(&config.database_path()).await?;
        let image_store = ImageStore::new(&config.work_dir).await?;

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            image_store,
        })
    }

    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let dir = std::env::temp_dir().join(format!("storefront-test-{}", uuid::Uuid::new_v4()));
        let work_dir = dir.to_string_lossy().to_string();
        Self {
            config: Config::with_overrides(work_dir.clone(), 0),
            db: crate::db::memory_db().await,
            image_store: ImageStore::new(&work_dir).await.expect("image store"),
        }
    }
}
