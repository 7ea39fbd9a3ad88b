use std::str::FromStr;

use actix_web::{HttpRequest, Responder, get, post, web};
use biz_service::biz_service::access_entry_service::AccessEntryService;
use biz_service::biz_service::acl_store::{AccessEntryImport, ObjectAclStore};
use biz_service::biz_service::permission_service::PermissionService;
use biz_service::biz_service::principal_service::PrincipalService;
use biz_service::biz_service::user_group_service::UserGroupService;
use biz_service::model::{PermAction, Principal, ResourceModel};
use common::errors::AppError;
use common::query_builder::PageInfo;
use common::repository_util::Repository;
use common::util::common_utils::build_id;
use common::util::date_util::now;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::handlers::current_principal;
use crate::result::{result, result_data, result_list};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(perm_catalog);
    cfg.service(perm_grant);
    cfg.service(perm_revoke);
    cfg.service(perm_list);
    cfg.service(perm_import);
    cfg.service(model_perm_grant);
    cfg.service(model_perm_revoke);
    cfg.service(group_member_add);
    cfg.service(group_member_remove);
}

/// 权限管理接口只对管理员开放
fn require_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.is_super_user || principal.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn parse_model(name: &str) -> Result<ResourceModel, AppError> {
    ResourceModel::from_str(name).map_err(|_| AppError::InvalidGrant(format!("unknown model: {}", name)))
}

fn parse_actions(actions: &[String]) -> Result<Vec<PermAction>, AppError> {
    actions
        .iter()
        .map(|a| PermAction::from_str(a).map_err(|_| AppError::InvalidGrant(format!("unknown action: {}", a))))
        .collect()
}

#[utoipa::path(
    get,
    path = "/perm/catalog",
    tag = "权限",
    responses((status = 200, description = "全部目录权限码"))
)]
#[get("/perm/catalog")]
pub async fn perm_catalog(req: HttpRequest) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    let permissions = PermissionService::get().get_all_permissions().await?;
    Ok(web::Json(result_list(permissions)))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObjectGrantDto {
    pub model_name: String,
    pub object_id: String,
    pub actions: Vec<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

/// 显式对象级授权；模型与动作在入库前解析，未知值 400
#[utoipa::path(
    post,
    path = "/perm/grant",
    tag = "权限",
    request_body = ObjectGrantDto,
    responses(
        (status = 200, description = "授权生效（重复授权为空操作）"),
        (status = 400, description = "未知模型/动作或空的被授权人集合")
    )
)]
#[post("/perm/grant")]
pub async fn perm_grant(req: HttpRequest, dto: web::Json<ObjectGrantDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    let model = parse_model(&dto.model_name)?;
    let actions = parse_actions(&dto.actions)?;
    AccessEntryService::get()
        .add_object_permissions(model, &dto.object_id, &actions, &dto.user_ids, &dto.group_ids)
        .await?;
    Ok(web::Json(result()))
}

#[post("/perm/revoke")]
pub async fn perm_revoke(req: HttpRequest, dto: web::Json<ObjectGrantDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    let model = parse_model(&dto.model_name)?;
    let actions = parse_actions(&dto.actions)?;
    AccessEntryService::get()
        .remove_object_permissions(model, &dto.object_id, &actions, &dto.user_ids, &dto.group_ids)
        .await?;
    Ok(web::Json(result()))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPermQueryDto {
    pub model_name: String,
    pub object_id: String,
    pub action: Option<String>,
    pub page: Option<PageInfo>,
}

/// 审计用：分页列出对象上的授权记录
#[post("/perm/list")]
pub async fn perm_list(req: HttpRequest, dto: web::Json<ObjectPermQueryDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    let model = parse_model(&dto.model_name)?;
    let action = match &dto.action {
        Some(a) => Some(PermAction::from_str(a).map_err(|_| AppError::InvalidGrant(format!("unknown action: {}", a)))?),
        None => None,
    };
    let page = dto.page.clone().unwrap_or_default();
    let page_result = AccessEntryService::get()
        .get_object_permissions(model, &dto.object_id, action, &page)
        .await?;
    Ok(web::Json(result_data(page_result)))
}

/// 批量导入：重复导入做并集合并，不覆盖已有被授权人
#[utoipa::path(
    post,
    path = "/perm/import",
    tag = "权限",
    request_body = Vec<AccessEntryImport>,
    responses(
        (status = 200, description = "全部条目已合并入库"),
        (status = 400, description = "存在非法条目，整批拒绝")
    )
)]
#[post("/perm/import")]
pub async fn perm_import(req: HttpRequest, dto: web::Json<Vec<AccessEntryImport>>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    AccessEntryService::get().import_permissions(dto.into_inner()).await?;
    Ok(web::Json(result()))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelGrantDto {
    #[validate(length(min = 1, message = "用户 ID 不能为空"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "权限码不能为空"))]
    pub codename: String,
}

/// 模型级授权：权限码必须出自目录，未知码 400
#[post("/perm/model/grant")]
pub async fn model_perm_grant(req: HttpRequest, dto: web::Json<ModelGrantDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    dto.validate()?;
    if PermissionService::get().find_by_codename(&dto.codename).await?.is_none() {
        return Err(AppError::InvalidGrant(format!("unknown codename: {}", dto.codename)));
    }
    let filter = doc! { "user_id": &dto.user_id, "codename": &dto.codename };
    let update = doc! {
        "$setOnInsert": {
            "id": build_id(),
            "user_id": &dto.user_id,
            "codename": &dto.codename,
            "create_time": now(),
        }
    };
    PrincipalService::get().user_perm_dao.upsert_one(filter, update).await?;
    Ok(web::Json(result()))
}

#[post("/perm/model/revoke")]
pub async fn model_perm_revoke(req: HttpRequest, dto: web::Json<ModelGrantDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    dto.validate()?;
    let filter = doc! { "user_id": &dto.user_id, "codename": &dto.codename };
    PrincipalService::get().user_perm_dao.delete(filter).await?;
    Ok(web::Json(result()))
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberDto {
    #[validate(length(min = 1, message = "用户 ID 不能为空"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "用户组 ID 不能为空"))]
    pub group_id: String,
}

#[post("/perm/group/member/add")]
pub async fn group_member_add(req: HttpRequest, dto: web::Json<GroupMemberDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    dto.validate()?;
    UserGroupService::get().add_member(&dto.user_id, &dto.group_id).await?;
    Ok(web::Json(result()))
}

#[post("/perm/group/member/remove")]
pub async fn group_member_remove(req: HttpRequest, dto: web::Json<GroupMemberDto>) -> Result<impl Responder, AppError> {
    let principal = current_principal(&req).await?;
    require_admin(&principal)?;
    dto.validate()?;
    UserGroupService::get().remove_member(&dto.user_id, &dto.group_id).await?;
    Ok(web::Json(result()))
}
