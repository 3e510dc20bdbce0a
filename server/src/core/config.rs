//! 服务器配置
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/storefront | 工作目录 |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | LOG_LEVEL | info | 日志级别 |
//! | PUBLIC_BASE_URL | http://localhost:3000 | 对外基础 URL |
//! | ENVIRONMENT | development | 运行环境 |

#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、图片、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 日志级别
    pub log_level: String,
    /// 生成图片 URL 时使用的对外基础地址
    pub public_base_url: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置，常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn database_path(&self) -> String {
        format!("{}/db", self.work_dir)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Public URL for a stored image filename
    pub fn image_url(&self, filename: &str) -> String {
        format!(
            "{}/api/images/{filename}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_production_environment_counts_as_production() {
        let mut config = Config::with_overrides("/tmp/x", 0);
        config.environment = "production".to_string();
        assert!(config.is_production());
        for env in ["development", "staging", "Production"] {
            config.environment = env.to_string();
            assert!(!config.is_production());
        }
    }

    #[test]
    fn image_url_handles_trailing_slash() {
        let mut config = Config::with_overrides("/tmp/x", 0);
        config.public_base_url = "http://shop.example/".to_string();
        assert_eq!(
            config.image_url("a.png"),
            "http://shop.example/api/images/a.png"
        );
    }
}
