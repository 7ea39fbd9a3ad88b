use std::sync::Arc;

use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use common::{GroupId, UserId};
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;

use crate::entitys::user_group_entity::UserGroupEntity;

/// 用户-用户组关联维护与查询
pub struct UserGroupService {
    pub dao: BaseRepository<UserGroupEntity>,
}

impl UserGroupService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection("user_group");
        Self { dao: BaseRepository::new(db, collection) }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("UserGroupService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("UserGroupService not initialized").clone()
    }

    /// 用户所在的全部用户组 ID，每次现查，不缓存
    pub async fn group_ids_of_user(&self, user_id: &str) -> Result<Vec<GroupId>, AppError> {
        let records = self.dao.query(doc! { "user_id": user_id }).await?;
        Ok(records.into_iter().map(|r| r.group_id).collect())
    }

    /// 加入用户组；重复加入为空操作（唯一索引保证）
    pub async fn add_member(&self, user_id: &UserId, group_id: &GroupId) -> Result<(), AppError> {
        let filter = doc! { "user_id": user_id, "group_id": group_id };
        let update = doc! {
            "$setOnInsert": {
                "id": build_id(),
                "user_id": user_id,
                "group_id": group_id,
                "create_time": now(),
            }
        };
        self.dao.upsert_one(filter, update).await?;
        Ok(())
    }

    pub async fn remove_member(&self, user_id: &UserId, group_id: &GroupId) -> Result<(), AppError> {
        let filter = doc! { "user_id": user_id, "group_id": group_id };
        self.dao.delete(filter).await?;
        Ok(())
    }
}

static INSTANCE: OnceCell<Arc<UserGroupService>> = OnceCell::new();
