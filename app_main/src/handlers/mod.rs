use actix_web::{HttpRequest, web};
use biz_service::biz_service::principal_service::PrincipalService;
use biz_service::model::Principal;
use common::errors::AppError;

pub mod leave_handler;
pub mod perm_handler;
pub mod project_handler;
pub mod swagger;

pub fn configure(cfg: &mut web::ServiceConfig) {
    leave_handler::configure(cfg);
    project_handler::configure(cfg);
    perm_handler::configure(cfg);
    swagger::configure(cfg);
}

/// 从上游认证层写入的请求头取出用户标识并解析为主体；
/// 每个请求现解析，权限变更下一个请求即生效
pub async fn current_principal(req: &HttpRequest) -> Result<Principal, AppError> {
    let user_id = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing x-user-id header".to_string()))?;
    PrincipalService::get().resolve(user_id).await
}
