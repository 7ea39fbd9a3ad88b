use common::UserId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 用户-权限关联（直接授权的模型级权限码）
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["user_id", "codename"], unique)]
pub struct UserPermissionEntity {
    /// 记录 ID（唯一）
    pub id: String,
    /// 用户 ID
    pub user_id: UserId,
    /// 权限码
    pub codename: String,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
}
