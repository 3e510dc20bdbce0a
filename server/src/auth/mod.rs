//! 认证模块
//!
//! 身份来自上游网关：网关完成登录校验后把用户 id 写入
//! `x-user-id` 请求头，本服务只信任该头。

mod extractor;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller identity
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
}
