use common::UserId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 项目任务，可见性随所属项目的团队调整级联变化
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique)]
#[mongo_index(fields["project_id"])]
pub struct ProjectTaskEntity {
    /// 任务 ID（唯一）
    pub id: String,
    /// 所属项目 ID
    pub project_id: String,
    /// 任务标题
    pub title: String,
    /// 指派的用户 ID
    pub assignee_id: Option<UserId>,
    /// 任务状态（todo / doing / done）
    pub status: String,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
