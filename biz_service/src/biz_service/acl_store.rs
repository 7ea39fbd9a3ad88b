use std::collections::HashSet;

use async_trait::async_trait;
use common::errors::AppError;
use common::query_builder::PageInfo;
use common::repository_util::PageResult;
use common::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entitys::access_entry_entity::AccessEntryEntity;
use crate::model::{ObjectPermSet, PermAction, ResourceModel};

/// 批量导入的单条授权；重复导入做并集合并，不覆盖已有被授权人
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntryImport {
    pub model_name: ResourceModel,
    pub object_id: String,
    pub action: PermAction,
    pub user_ids: Vec<UserId>,
    pub group_ids: Vec<GroupId>,
}

/// 对象级授权存储。网关与生命周期钩子都只依赖该接口，
/// 便于在没有数据库的情况下做单元测试。
#[async_trait]
pub trait ObjectAclStore: Send + Sync {
    /// 授权：保证每个 (model, object, action) 的 ACE 存在且包含给定被授权人；
    /// 多动作调用在同一事务内生效
    async fn add_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError>;

    /// 追加授权，从不移除既有被授权人
    async fn update_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError>;

    /// 撤销指定被授权人；撤销不存在的被授权人视为空操作
    async fn remove_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError>;

    /// 删除对象名下的全部 ACE（资源删除时的清理步骤）
    async fn remove_object(&self, model: ResourceModel, object_id: &str) -> Result<(), AppError>;

    /// 单对象的动作集合：本人或所在任一用户组被授权即为 true
    async fn get_user_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        user_id: &str,
    ) -> Result<ObjectPermSet, AppError>;

    /// 主体（直接或经由用户组）持有指定动作的全部对象 ID
    async fn get_user_objects(
        &self,
        model: ResourceModel,
        action: PermAction,
        user_id: &str,
    ) -> Result<HashSet<String>, AppError>;

    async fn has_object_permission(
        &self,
        model: ResourceModel,
        object_id: &str,
        action: PermAction,
        user_id: &str,
    ) -> Result<bool, AppError>;

    /// 审计用：分页列出对象上的授权记录
    async fn get_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        action: Option<PermAction>,
        page: &PageInfo,
    ) -> Result<PageResult<AccessEntryEntity>, AppError>;

    /// 批量导入，分块提交；同一逻辑授权的各动作在同一块内一起提交
    async fn import_permissions(&self, entries: Vec<AccessEntryImport>) -> Result<(), AppError>;
}

/// 授权写入前的入参校验，不通过则在任何存储写入前拒绝
pub fn check_grant(
    object_id: &str,
    actions: &[PermAction],
    user_ids: &[UserId],
    group_ids: &[GroupId],
) -> Result<(), AppError> {
    if object_id.is_empty() {
        return Err(AppError::InvalidGrant("object id is empty".to_string()));
    }
    if actions.is_empty() {
        return Err(AppError::InvalidGrant("no actions given".to_string()));
    }
    if actions.contains(&PermAction::Create) {
        // create 是模型级动作，对象 ACE 上只允许 view/edit/delete
        return Err(AppError::InvalidGrant("create is not an object-level action".to_string()));
    }
    if user_ids.is_empty() && group_ids.is_empty() {
        return Err(AppError::InvalidGrant("no grantees given".to_string()));
    }
    if user_ids.iter().any(|u| u.is_empty()) || group_ids.iter().any(|g| g.is_empty()) {
        return Err(AppError::InvalidGrant("empty grantee id".to_string()));
    }
    Ok(())
}
