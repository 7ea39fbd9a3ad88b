use common::UserId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 员工档案；主管与部门用于计算创建时的主管可见集合
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique)]
#[mongo_index(fields["user_id"], unique)]
pub struct EmployeeEntity {
    /// 员工 ID（唯一）
    pub id: String,
    /// 关联的用户 ID
    pub user_id: UserId,
    /// 姓名
    pub name: String,
    /// 直属主管的员工 ID
    pub supervisor_id: Option<String>,
    /// 所属部门 ID
    pub department_id: Option<String>,
    /// 是否在职
    pub status: bool,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
