pub mod access_entry_entity;
pub mod department_entity;
pub mod employee_entity;
pub mod group_permission_entity;
pub mod leave_entity;
pub mod permission_entity;
pub mod project_entity;
pub mod project_task_entity;
pub mod user_entity;
pub mod user_group_entity;
pub mod user_permission_entity;
