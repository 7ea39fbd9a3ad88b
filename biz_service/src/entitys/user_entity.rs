use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 系统用户；登录态由外部认证层维护，这里只保留授权要用的标志位
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique)]
pub struct UserEntity {
    /// 用户 ID（唯一）
    pub id: String,
    /// 登录名
    pub user_name: String,
    /// 是否超级用户（绕过所有权限判定）
    pub is_super_user: bool,
    /// 是否管理员（可操作授权管理接口）
    pub is_admin: bool,
    /// 是否启用
    pub status: bool,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
