use common::index_trait::MongoIndexModelProvider;
use common::{GroupId, UserId};
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 用户-用户组关联
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["user_id", "group_id"], unique)]
#[mongo_index(fields["user_id"])]
pub struct UserGroupEntity {
    /// 记录 ID（唯一）
    pub id: String,
    /// 用户 ID
    pub user_id: UserId,
    /// 用户组 ID
    pub group_id: GroupId,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
}
