use common::UserId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 部门
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique)]
pub struct DepartmentEntity {
    /// 部门 ID（唯一）
    pub id: String,
    /// 部门名称
    pub name: String,
    /// 部门负责人的用户 ID
    pub head_user_id: Option<UserId>,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
