use std::sync::Arc;

use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;

use crate::entitys::project_task_entity::ProjectTaskEntity;

pub struct ProjectTaskService {
    pub dao: BaseRepository<ProjectTaskEntity>,
}

impl ProjectTaskService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection("project_task");
        Self { dao: BaseRepository::new(db, collection) }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("ProjectTaskService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("ProjectTaskService not initialized").clone()
    }

    /// 项目名下全部任务 ID，用于把团队差集级联到任务
    pub async fn task_ids_of_project(&self, project_id: &str) -> Result<Vec<String>, AppError> {
        let tasks = self.dao.query(doc! { "project_id": project_id }).await?;
        Ok(tasks.into_iter().map(|t| t.id).collect())
    }
}

static INSTANCE: OnceCell<Arc<ProjectTaskService>> = OnceCell::new();
