use std::collections::HashSet;
use std::sync::Arc;

use common::errors::AppError;
use common::repository_util::{BaseRepository, Repository};
use mongodb::Database;
use mongodb::bson::doc;
use once_cell::sync::OnceCell;

use crate::biz_service::user_group_service::UserGroupService;
use crate::entitys::group_permission_entity::GroupPermissionEntity;
use crate::entitys::user_entity::UserEntity;
use crate::entitys::user_permission_entity::UserPermissionEntity;
use crate::model::{PermCode, Principal, PrincipalGroup};

/// 把已认证的用户标识解析为 Principal。
/// 有效权限 = 直接授权 ∪ 各用户组授权，每个请求现算，授权变更下一个请求即生效。
pub struct PrincipalService {
    pub user_dao: BaseRepository<UserEntity>,
    pub user_perm_dao: BaseRepository<UserPermissionEntity>,
    pub group_perm_dao: BaseRepository<GroupPermissionEntity>,
}

impl PrincipalService {
    pub fn new(db: Database) -> Self {
        let user_collection = db.collection("user");
        let user_perm_collection = db.collection("user_permission");
        let group_perm_collection = db.collection("group_permission");
        Self {
            user_dao: BaseRepository::new(db.clone(), user_collection),
            user_perm_dao: BaseRepository::new(db.clone(), user_perm_collection),
            group_perm_dao: BaseRepository::new(db, group_perm_collection),
        }
    }

    pub fn init(db: Database) {
        INSTANCE
            .set(Arc::new(Self::new(db)))
            .unwrap_or_else(|_| panic!("PrincipalService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("PrincipalService not initialized").clone()
    }

    pub async fn resolve(&self, user_id: &str) -> Result<Principal, AppError> {
        let user = self
            .user_dao
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;
        if !user.status {
            return Err(AppError::Unauthorized("user disabled".to_string()));
        }

        let direct: HashSet<PermCode> = self
            .user_perm_dao
            .query(doc! { "user_id": user_id })
            .await?
            .into_iter()
            .map(|p| PermCode::new(p.codename))
            .collect();

        let group_ids = UserGroupService::get().group_ids_of_user(user_id).await?;
        let mut groups: Vec<PrincipalGroup> = group_ids
            .iter()
            .map(|gid| PrincipalGroup { id: gid.clone(), permissions: HashSet::new() })
            .collect();
        if !group_ids.is_empty() {
            let grants = self
                .group_perm_dao
                .query(doc! { "group_id": { "$in": group_ids } })
                .await?;
            for grant in grants {
                if let Some(group) = groups.iter_mut().find(|g| g.id == grant.group_id) {
                    group.permissions.insert(PermCode::new(grant.codename));
                }
            }
        }

        Ok(Principal {
            id: user.id,
            is_super_user: user.is_super_user,
            is_admin: user.is_admin,
            permissions: direct,
            groups,
        })
    }
}

static INSTANCE: OnceCell<Arc<PrincipalService>> = OnceCell::new();
