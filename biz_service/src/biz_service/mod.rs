pub mod access_entry_service;
pub mod access_gateway;
pub mod access_grant_service;
pub mod acl_store;
pub mod employee_service;
pub mod leave_service;
pub mod permission_service;
pub mod principal_service;
pub mod project_service;
pub mod project_task_service;
pub mod user_group_service;

#[cfg(test)]
pub(crate) mod mem_acl;
