use std::sync::Arc;

use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use mongodb::Database;
use once_cell::sync::OnceCell;

use crate::entitys::leave_entity::LeaveEntity;

pub struct LeaveService {
    pub dao: BaseRepository<LeaveEntity>,
}

impl LeaveService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection("leave");
        Self { dao: BaseRepository::new(db, collection) }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("LeaveService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("LeaveService not initialized").clone()
    }

    pub async fn create(
        &self,
        employee_id: &str,
        user_id: &str,
        leave_type: &str,
        start_date: i64,
        end_date: i64,
        reason: Option<String>,
    ) -> Result<LeaveEntity, AppError> {
        let entity = LeaveEntity {
            id: build_id(),
            employee_id: employee_id.to_string(),
            user_id: user_id.to_string(),
            leave_type: leave_type.to_string(),
            start_date,
            end_date,
            status: "pending".to_string(),
            reason,
            create_time: now(),
            update_time: now(),
        };
        self.dao.insert(&entity).await?;
        Ok(entity)
    }
}

static INSTANCE: OnceCell<Arc<LeaveService>> = OnceCell::new();
