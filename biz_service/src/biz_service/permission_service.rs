use std::sync::Arc;

use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;
use strum::IntoEnumIterator;

use crate::entitys::permission_entity::PermissionEntity;
use crate::model::{PermAction, PermCode, ResourceModel};

/// 权限目录：按 (模型, 动作) 预置的权限码清单
pub struct PermissionService {
    pub dao: BaseRepository<PermissionEntity>,
}

impl PermissionService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection("permission");
        Self { dao: BaseRepository::new(db, collection) }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("PermissionService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("PermissionService not initialized").clone()
    }

    /// 同步静态目录：每个 (模型, 动作) 一条，codename 唯一，重跑幂等
    pub async fn sync_catalog(&self) -> Result<(), AppError> {
        for model in ResourceModel::iter() {
            for action in PermAction::iter() {
                let code = PermCode::of(model, action);
                let filter = doc! { "codename": code.as_str() };
                let update = doc! {
                    "$set": { "update_time": now() },
                    "$setOnInsert": {
                        "id": build_id(),
                        "codename": code.as_str(),
                        "name": format!("{} {}", model, action),
                        "category": model.to_string(),
                        "enabled": true,
                        "create_time": now(),
                    }
                };
                self.dao.upsert_one(filter, update).await?;
            }
        }
        Ok(())
    }

    pub async fn find_by_codename(&self, codename: &str) -> Result<Option<PermissionEntity>, AppError> {
        let result = self.dao.find_one(doc! { "codename": codename }).await?;
        Ok(result)
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<PermissionEntity>, AppError> {
        let result = self.dao.query(doc! { "category": category }).await?;
        Ok(result)
    }

    pub async fn get_all_permissions(&self) -> Result<Vec<PermissionEntity>, AppError> {
        let result = self.dao.query_all().await?;
        Ok(result)
    }
}

static INSTANCE: OnceCell<Arc<PermissionService>> = OnceCell::new();
