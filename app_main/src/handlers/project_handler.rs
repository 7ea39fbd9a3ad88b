use actix_web::{HttpRequest, Responder, get, post, web};
use biz_service::biz_service::access_entry_service::AccessEntryService;
use biz_service::biz_service::access_gateway::{get_record, get_records};
use biz_service::biz_service::access_grant_service::AccessGrantService;
use biz_service::biz_service::acl_store::ObjectAclStore;
use biz_service::biz_service::project_service::ProjectService;
use biz_service::biz_service::project_task_service::ProjectTaskService;
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
    cfg.service(project_list);
    cfg.service(project_detail);
    cfg.service(project_create);
    cfg.service(project_team_update);
    cfg.service(project_delete);
}

#[derive(QueryFilter, Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQueryDto {
    #[query(like)]
    pub name: Option<String>,
    #[query(eq)]
    pub status: Option<String>,
    #[query(eq)]
    pub owner_id: Option<String>,
    pub page: Option<PageInfo>,
}

#[post("/project/list")]
pub async fn project_list(req: HttpRequest, dto: web::Json<ProjectQueryDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let page = dto.page.clone().unwrap_or_default();
    let store = AccessEntryService::get();
    let svc = ProjectService::get();
    let page_result = get_records(
        store.as_ref(),
        ResourceModel::Projects,
        &[PermCode::of(ResourceModel::Projects, PermAction::View)],
        &principal,
        dto.to_query_doc(),
        |filter| async move { Ok(svc.dao.query_by_page(filter, &page).await?) },
    )
    .await?
    .ok_or(AppError::Forbidden)?;
    Ok(web::Json(result_data(page_result)))
}

#[get("/project/detail/{project_id}")]
pub async fn project_detail(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let project_id = path.into_inner();
    let store = AccessEntryService::get();
    let svc = ProjectService::get();
    let id = project_id.clone();
    let record = get_record(
        store.as_ref(),
        ResourceModel::Projects,
        &[PermCode::of(ResourceModel::Projects, PermAction::View)],
        &principal,
        &project_id,
        || async move { Ok(svc.dao.find_by_id(&id).await?) },
    )
    .await?
    .ok_or(AppError::Forbidden)?;
    Ok(web::Json(result_data(record)))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateDto {
    #[validate(length(min = 1, message = "项目名不能为空"))]
    pub name: String,
    #[serde(default)]
    pub team: Vec<String>,
}

/// 创建项目：创建人拿满对象级动作，初始团队成员拿 VIEW
#[post("/project/create")]
pub async fn project_create(req: HttpRequest, dto: web::Json<ProjectCreateDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    dto.validate()?;
    if !(principal.is_super_user
        || principal.has_model_permission(&[PermCode::of(ResourceModel::Projects, PermAction::Create)]))
    {
        return Err(AppError::Forbidden);
    }
    let entity = ProjectService::get().create(&dto.name, &principal.id, dto.team.clone()).await?;
    let grant = AccessGrantService::get();
    grant.grant_on_create(ResourceModel::Projects, &entity.id, &principal.id, &[]).await?;
    grant.apply_team_change(ResourceModel::Projects, &entity.id, &[], &dto.team, &[]).await?;
    Ok(web::Json(result_data(entity)))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTeamDto {
    pub team: Vec<String>,
}

/// 团队调整按差集处理：离开者撤销、新成员授予 VIEW，
/// 同一差集级联到项目名下的全部任务
#[post("/project/team/{project_id}")]
pub async fn project_team_update(
    req: HttpRequest,
    path: web::Path<String>,
    dto: web::Json<ProjectTeamDto>,
) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let project_id = path.into_inner();
    let svc = ProjectService::get();
    let store = AccessEntryService::get();
    let project = svc.dao.find_by_id(&project_id).await?.ok_or(AppError::NotFound)?;
    let allowed = principal.is_super_user
        || principal.has_model_permission(&[PermCode::of(ResourceModel::Projects, PermAction::Edit)])
        || store
            .has_object_permission(ResourceModel::Projects, &project_id, PermAction::Edit, &principal.id)
            .await?;
    if !allowed {
        return Err(AppError::Forbidden);
    }
    let task_ids = ProjectTaskService::get().task_ids_of_project(&project_id).await?;
    svc.update_team(&project_id, &dto.team).await?;
    AccessGrantService::get()
        .apply_team_change(
            ResourceModel::Projects,
            &project_id,
            &project.team,
            &dto.team,
            &[(ResourceModel::ProjectsTasks, task_ids)],
        )
        .await?;
    Ok(web::Json(result()))
}

#[post("/project/del/{project_id}")]
pub async fn project_delete(req: HttpRequest, path: web::Path<String>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    let project_id = path.into_inner();
    let store = AccessEntryService::get();
    let allowed = principal.is_super_user
        || principal.has_model_permission(&[PermCode::of(ResourceModel::Projects, PermAction::Delete)])
        || store
            .has_object_permission(ResourceModel::Projects, &project_id, PermAction::Delete, &principal.id)
            .await?;
    if !allowed {
        return Err(AppError::Forbidden);
    }
    let task_svc = ProjectTaskService::get();
    let task_ids = task_svc.task_ids_of_project(&project_id).await?;
    let deleted = ProjectService::get().dao.delete(doc! { "id": &project_id }).await?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    task_svc.dao.delete(doc! { "project_id": &project_id }).await?;
    AccessGrantService::get()
        .revoke_on_delete(ResourceModel::Projects, &project_id, &[(ResourceModel::ProjectsTasks, task_ids)])
        .await?;
    Ok(web::Json(result()))
}
