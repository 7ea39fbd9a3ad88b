use std::str::FromStr;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use app_main::handlers;
use biz_service::biz_service::access_entry_service::AccessEntryService;
use biz_service::biz_service::access_grant_service::AccessGrantService;
use biz_service::biz_service::employee_service::EmployeeService;
use biz_service::biz_service::leave_service::LeaveService;
use biz_service::biz_service::permission_service::PermissionService;
use biz_service::biz_service::principal_service::PrincipalService;
use biz_service::biz_service::project_service::ProjectService;
use biz_service::biz_service::project_task_service::ProjectTaskService;
use biz_service::biz_service::user_group_service::UserGroupService;
use common::config::{AppConfig, SysConfig};
use common::db::Db;
use common::errors::AppError;
use common::index_trait::ensure_indexes;
use log::{LevelFilter, warn};
use mongodb::Database;

/// 批量导入时单个事务的默认条数上限
const DEFAULT_IMPORT_CHUNK_SIZE: usize = 200;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    AppConfig::init("main-config.toml");
    let config = AppConfig::get();
    init_log(&config.get_sys());

    Db::init(&config.get_database()).await.expect("MongoDB init failed");
    let db = Db::get().clone();
    init_services(db, &config.get_sys());
    init_db_state().await.expect("db state init failed");

    let server = config.get_server();
    let address_and_port = format!("{}:{}", server.host, server.port);
    warn!("starting server on {}", address_and_port);
    HttpServer::new(move || App::new().wrap(Logger::default()).configure(handlers::configure))
        .bind(address_and_port)?
        .run()
        .await
}

fn init_log(sys: &SysConfig) {
    let level = LevelFilter::from_str(&sys.log_level).unwrap_or(LevelFilter::Info);
    env_logger::Builder::new().filter(None, level).init();
}

/// 服务单例初始化；AccessGrantService 依赖 AccessEntryService，必须最后装配
fn init_services(db: Database, sys: &SysConfig) {
    PermissionService::init(db.clone());
    PrincipalService::init(db.clone());
    UserGroupService::init(db.clone());
    EmployeeService::init(db.clone());
    LeaveService::init(db.clone());
    ProjectService::init(db.clone());
    ProjectTaskService::init(db.clone());
    AccessEntryService::init(db, sys.import_chunk_size.unwrap_or(DEFAULT_IMPORT_CHUNK_SIZE));
    AccessGrantService::init();
}

/// 建索引并同步权限目录，重启重跑均幂等
async fn init_db_state() -> Result<(), AppError> {
    ensure_indexes(&AccessEntryService::get().dao.collection).await?;
    ensure_indexes(&PermissionService::get().dao.collection).await?;
    ensure_indexes(&PrincipalService::get().user_dao.collection).await?;
    ensure_indexes(&PrincipalService::get().user_perm_dao.collection).await?;
    ensure_indexes(&PrincipalService::get().group_perm_dao.collection).await?;
    ensure_indexes(&UserGroupService::get().dao.collection).await?;
    ensure_indexes(&EmployeeService::get().dao.collection).await?;
    ensure_indexes(&EmployeeService::get().department_dao.collection).await?;
    ensure_indexes(&LeaveService::get().dao.collection).await?;
    ensure_indexes(&ProjectService::get().dao.collection).await?;
    ensure_indexes(&ProjectTaskService::get().dao.collection).await?;

    PermissionService::get().sync_catalog().await?;
    Ok(())
}
