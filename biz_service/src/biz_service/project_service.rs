use std::sync::Arc;

use common::UserId;
use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;

use crate::entitys::project_entity::ProjectEntity;

pub struct ProjectService {
    pub dao: BaseRepository<ProjectEntity>,
}

impl ProjectService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection("project");
        Self { dao: BaseRepository::new(db, collection) }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("ProjectService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("ProjectService not initialized").clone()
    }

    pub async fn create(&self, name: &str, owner_id: &UserId, team: Vec<UserId>) -> Result<ProjectEntity, AppError> {
        let entity = ProjectEntity {
            id: build_id(),
            name: name.to_string(),
            owner_id: owner_id.clone(),
            team,
            status: "active".to_string(),
            create_time: now(),
            update_time: now(),
        };
        self.dao.insert(&entity).await?;
        Ok(entity)
    }

    pub async fn update_team(&self, project_id: &str, team: &[UserId]) -> Result<(), AppError> {
        let filter = doc! { "id": project_id };
        let update = doc! { "$set": { "team": team.to_vec(), "update_time": now() } };
        self.dao.update_one(filter, update).await?;
        Ok(())
    }
}

static INSTANCE: OnceCell<Arc<ProjectService>> = OnceCell::new();
