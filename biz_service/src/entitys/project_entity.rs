use common::UserId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 项目；团队成员变化时按差集调整对象级授权并级联到任务
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique)]
pub struct ProjectEntity {
    /// 项目 ID（唯一）
    pub id: String,
    /// 项目名称
    pub name: String,
    /// 创建人的用户 ID
    pub owner_id: UserId,
    /// 团队成员的用户 ID 集合
    pub team: Vec<UserId>,
    /// 项目状态（active / archived）
    pub status: String,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
