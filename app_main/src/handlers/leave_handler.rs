use actix_web::{HttpRequest, Responder, get, post, web};
use biz_service::biz_service::access_entry_service::AccessEntryService;
use biz_service::biz_service::access_gateway::{get_record, get_records};
use biz_service::biz_service::access_grant_service::AccessGrantService;
use biz_service::biz_service::acl_store::ObjectAclStore;
use biz_service::biz_service::employee_service::EmployeeService;
use biz_service::biz_service::leave_service::LeaveService;
use biz_service::model::{PermAction, PermCode, ResourceModel};
use common::errors::AppError;
use common::query_builder::PageInfo;
use common::repository_util::Repository;
use mongo_macro::QueryFilter;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::handlers::current_principal;
use crate::result::{result, result_data};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(leave_list);
    cfg.service(leave_detail);
    cfg.service(leave_create);
    cfg.service(leave_delete);
}

#[derive(QueryFilter, Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQueryDto {
    #[query(eq)]
    pub employee_id: Option<String>,
    #[query(eq)]
    pub status: Option<String>,
    #[query(eq)]
    pub leave_type: Option<String>,
    #[query(gte, field = "start_date")]
    pub date_from: Option<i64>,
    #[query(lte, field = "start_date")]
    pub date_to: Option<i64>,
    pub page: Option<PageInfo>,
}

/// 列表走统一网关：模型级权限原样透传过滤条件，
/// 仅持对象级授权时把可见对象集合并进过滤条件
#[utoipa::path(
    post,
    path = "/leave/list",
    tag = "业务",
    request_body = LeaveQueryDto,
    responses(
        (status = 200, description = "分页结果；无任何可见对象时 403"),
        (status = 403, description = "无访问权限")
    )
)]
#[post("/leave/list")]
pub async fn leave_list(req: HttpRequest, dto: web::Json<LeaveQueryDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let page = dto.page.clone().unwrap_or_default();
    let store = AccessEntryService::get();
    let svc = LeaveService::get();
    let page_result = get_records(
        store.as_ref(),
        ResourceModel::Leaves,
        &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
        &principal,
        dto.to_query_doc(),
        |filter| async move { Ok(svc.dao.query_by_page(filter, &page).await?) },
    )
    .await?
    .ok_or(AppError::Forbidden)?;
    Ok(web::Json(result_data(page_result)))
}

#[utoipa::path(
    get,
    path = "/leave/detail/{leave_id}",
    tag = "业务",
    params(("leave_id" = String, Path, description = "请假单 ID")),
    responses(
        (status = 200, description = "数据与当前主体在该对象上的动作集合"),
        (status = 403, description = "无访问权限"),
        (status = 404, description = "已放行但对象不存在")
    )
)]
#[get("/leave/detail/{leave_id}")]
pub async fn leave_detail(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let leave_id = path.into_inner();
    let store = AccessEntryService::get();
    let svc = LeaveService::get();
    let id = leave_id.clone();
    let record = get_record(
        store.as_ref(),
        ResourceModel::Leaves,
        &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
        &principal,
        &leave_id,
        || async move { Ok(svc.dao.find_by_id(&id).await?) },
    )
    .await?
    .ok_or(AppError::Forbidden)?;
    Ok(web::Json(result_data(record)))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LeaveCreateDto {
    #[validate(length(min = 1, message = "请假类型不能为空"))]
    pub leave_type: String,
    pub start_date: i64,
    pub end_date: i64,
    pub reason: Option<String>,
}

/// 创建是模型级动作；入库后创建人拿满对象级动作、主管集合拿 VIEW
#[utoipa::path(
    post,
    path = "/leave/create",
    tag = "业务",
    request_body = LeaveCreateDto,
    responses(
        (status = 200, description = "创建的请假单"),
        (status = 403, description = "缺少 leaves:create")
    )
)]
#[post("/leave/create")]
pub async fn leave_create(req: HttpRequest, dto: web::Json<LeaveCreateDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    dto.validate()?;
    if dto.end_date < dto.start_date {
        return Err(AppError::Validation("结束日期早于开始日期".to_string()));
    }
    if !(principal.is_super_user
        || principal.has_model_permission(&[PermCode::of(ResourceModel::Leaves, PermAction::Create)]))
    {
        return Err(AppError::Forbidden);
    }
    let employee = EmployeeService::get()
        .find_by_user_id(&principal.id)
        .await?
        .ok_or_else(|| AppError::BizError("当前用户没有员工档案".to_string()))?;
    let entity = LeaveService::get()
        .create(&employee.id, &principal.id, &dto.leave_type, dto.start_date, dto.end_date, dto.reason.clone())
        .await?;
    let officers = EmployeeService::get().officer_ids(&employee.id).await?;
    AccessGrantService::get()
        .grant_on_create(ResourceModel::Leaves, &entity.id, &principal.id, &officers)
        .await?;
    Ok(web::Json(result_data(entity)))
}

#[post("/leave/del/{leave_id}")]
pub async fn leave_delete(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let leave_id = path.into_inner();
    let store = AccessEntryService::get();
    let allowed = principal.is_super_user
        || principal.has_model_permission(&[PermCode::of(ResourceModel::Leaves, PermAction::Delete)])
        || store
            .has_object_permission(ResourceModel::Leaves, &leave_id, PermAction::Delete, &principal.id)
            .await?;
    if !allowed {
        return Err(AppError::Forbidden);
    }
    let deleted = LeaveService::get().dao.delete(doc! { "id": &leave_id }).await?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    AccessGrantService::get().revoke_on_delete(ResourceModel::Leaves, &leave_id, &[]).await?;
    Ok(web::Json(result()))
}
