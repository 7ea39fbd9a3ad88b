use common::UserId;
use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 请假单
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema, MongoDeriveMongoIndex)]
#[mongo_index(fields["id"], unique)]
#[mongo_index(fields["employee_id"])]
pub struct LeaveEntity {
    /// 请假单 ID（唯一）
    pub id: String,
    /// 申请人的员工 ID
    pub employee_id: String,
    /// 申请人的用户 ID
    pub user_id: UserId,
    /// 请假类型（如 annual / sick / unpaid）
    pub leave_type: String,
    /// 开始日期（Unix 时间戳，秒）
    pub start_date: i64,
    /// 结束日期（Unix 时间戳，秒）
    pub end_date: i64,
    /// 审批状态（pending / approved / rejected）
    pub status: String,
    /// 备注
    pub reason: Option<String>,
    /// 创建时间（Unix 时间戳，秒）
    pub create_time: i64,
    /// 最后更新时间（Unix 时间戳，秒）
    pub update_time: i64,
}
