use crate::model::{PermAction, ResourceModel};
use common::index_trait::MongoIndexModelProvider;
use common::{GroupId, UserId};
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 对象级授权记录（ACE）：同一 (model_name, object_id, action) 至多一条，
/// 被授权人集合做并集更新，重复授权天然幂等
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["model_name", "object_id", "action"], unique)]
#[mongo_index(fields["model_name", "action", "user_ids"])]
#[mongo_index(fields["model_name", "action", "group_ids"])]
pub struct AccessEntryEntity {
    /// 记录 ID（唯一）
    pub id: String,
    /// 资源模型
    pub model_name: ResourceModel,
    /// 资源对象 ID
    pub object_id: String,
    /// 授权动作（view/edit/delete；create 只存在于模型级）
    pub action: PermAction,
    /// 被授权用户 ID 集合
    pub user_ids: Vec<UserId>,
    /// 被授权用户组 ID 集合
    pub group_ids: Vec<GroupId>,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
