use std::sync::Arc;

use common::UserId;
use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;

use crate::entitys::department_entity::DepartmentEntity;
use crate::entitys::employee_entity::EmployeeEntity;

pub struct EmployeeService {
    pub dao: BaseRepository<EmployeeEntity>,
    pub department_dao: BaseRepository<DepartmentEntity>,
}

impl EmployeeService {
    pub fn new(db: Database) -> Self {
        let collection = db.collection("employee");
        let department_collection = db.collection("department");
        Self {
            dao: BaseRepository::new(db.clone(), collection),
            department_dao: BaseRepository::new(db, department_collection),
        }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("EmployeeService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("EmployeeService not initialized").clone()
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<EmployeeEntity>, AppError> {
        let result = self.dao.find_one(doc! { "user_id": user_id }).await?;
        Ok(result)
    }

    /// 创建时计算的主管可见集合：直属主管与部门负责人的用户 ID。
    /// 只在资源创建时调用一次，之后组织关系变化不回刷。
    pub async fn officer_ids(&self, employee_id: &str) -> Result<Vec<UserId>, AppError> {
        let Some(employee) = self.dao.find_by_id(employee_id).await? else {
            return Ok(vec![]);
        };
        let mut officers: Vec<UserId> = vec![];
        if let Some(supervisor_id) = &employee.supervisor_id {
            if let Some(supervisor) = self.dao.find_by_id(supervisor_id).await? {
                officers.push(supervisor.user_id);
            }
        }
        if let Some(department_id) = &employee.department_id {
            if let Some(department) = self.department_dao.find_by_id(department_id).await? {
                if let Some(head) = department.head_user_id {
                    if !officers.contains(&head) {
                        officers.push(head);
                    }
                }
            }
        }
        Ok(officers)
    }
}

static INSTANCE: OnceCell<Arc<EmployeeService>> = OnceCell::new();
