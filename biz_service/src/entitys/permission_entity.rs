use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 权限目录条目，按 (模型, 动作) 预置，不随资源实例增减
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["codename"], unique)]
pub struct PermissionEntity {
    /// 权限 ID（唯一）
    pub id: String,
    /// 权限码（例如 "leaves:view"，全局唯一）
    pub codename: String,
    /// 权限名称（例如 "请假单查看"）
    pub name: String,
    /// 所属分类（通常为模型名）
    pub category: String,
    /// 是否启用该权限
    pub enabled: bool,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
