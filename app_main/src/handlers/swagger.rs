use actix_web::{HttpResponse, Responder, get, web};
use biz_service::biz_service::acl_store::AccessEntryImport;
use biz_service::entitys::access_entry_entity::AccessEntryEntity;
use biz_service::entitys::leave_entity::LeaveEntity;
use biz_service::entitys::permission_entity::PermissionEntity;
use biz_service::entitys::project_entity::ProjectEntity;
use biz_service::model::{ObjectPermSet, PermAction, ResourceModel};
use utoipa::OpenApi;

use crate::handlers::leave_handler::{LeaveCreateDto, LeaveQueryDto};
use crate::handlers::perm_handler::{GroupMemberDto, ModelGrantDto, ObjectGrantDto, ObjectPermQueryDto};
use crate::handlers::project_handler::{ProjectCreateDto, ProjectQueryDto, ProjectTeamDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::leave_handler::leave_list,
        crate::handlers::leave_handler::leave_detail,
        crate::handlers::leave_handler::leave_create,
        crate::handlers::perm_handler::perm_catalog,
        crate::handlers::perm_handler::perm_grant,
        crate::handlers::perm_handler::perm_import,
    ),
    components(schemas(
        LeaveQueryDto,
        LeaveCreateDto,
        ProjectQueryDto,
        ProjectCreateDto,
        ProjectTeamDto,
        ObjectGrantDto,
        ObjectPermQueryDto,
        ModelGrantDto,
        GroupMemberDto,
        AccessEntryImport,
        AccessEntryEntity,
        LeaveEntity,
        ProjectEntity,
        PermissionEntity,
        ObjectPermSet,
        PermAction,
        ResourceModel,
    )),
    tags(
        (name = "权限", description = "模型级与对象级权限接口"),
        (name = "业务", description = "请假与项目接口")
    )
)]
struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}

#[get("/openapi.json")]
async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().content_type("application/json").body(ApiDoc::openapi().to_json().unwrap())
}
