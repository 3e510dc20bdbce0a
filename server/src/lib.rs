//! Storefront Server - 商品目录与购物车后端
//!
//! # 架构概述
//!
//! - **目录核心** (`catalog`): 游标分页、查询组合、分类树展开、
//!   唯一关系 upsert
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储与各资源仓库
//! - **认证** (`auth`): 信任上游网关注入的用户身份
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、HTTP 服务
//! ├── auth/          # 请求身份提取
//! ├── catalog/       # 分页 / 过滤 / 树展开 / upsert 核心
//! ├── services/      # 图片存储
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 错误、日志、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::CurrentUser;
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
"#
    );
}

/// 设置运行环境: dotenv、工作目录、日志
///
/// 生产环境写按日滚动的日志文件，其余环境只输出到控制台。
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    if config.is_production() {
        let log_dir = format!("{}/logs", config.work_dir);
        std::fs::create_dir_all(&log_dir)?;
        init_logger_with_file(Some(&config.log_level), Some(&log_dir));
    } else {
        init_logger_with_file(Some(&config.log_level), None);
    }

    Ok(config)
}
