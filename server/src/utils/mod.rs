//! Utility Module
//!
//! 通用工具：错误处理、日志、输入校验

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
