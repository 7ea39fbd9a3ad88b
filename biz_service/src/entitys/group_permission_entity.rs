use common::GroupId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 用户组-权限关联（组内成员共享的模型级权限码）
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["group_id", "codename"], unique)]
pub struct GroupPermissionEntity {
    /// 记录 ID（唯一）
    pub id: String,
    /// 用户组 ID
    pub group_id: GroupId,
    /// 权限码
    pub codename: String,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
}
