//! 单元测试用的内存版对象 ACL 存储，语义与 MongoDB 实现一致：
//! 同键唯一、并集授权、差集撤销、组成员身份现查。

use std::collections::HashSet;

use async_trait::async_trait;
use common::errors::AppError;
use common::query_builder::PageInfo;
use common::repository_util::PageResult;
use common::{GroupId, UserId};
use dashmap::DashMap;

use crate::biz_service::acl_store::{AccessEntryImport, ObjectAclStore, check_grant};
use crate::entitys::access_entry_entity::AccessEntryEntity;
use crate::model::{ObjectPermSet, PermAction, ResourceModel};

type AceKey = (ResourceModel, String, PermAction);

#[derive(Default)]
pub struct MemAclStore {
    entries: DashMap<AceKey, (HashSet<UserId>, HashSet<GroupId>)>,
    memberships: DashMap<UserId, HashSet<GroupId>>,
}

impl MemAclStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_membership(&self, user_id: &str, group_id: &str) {
        self.memberships.entry(user_id.to_string()).or_default().insert(group_id.to_string());
    }

    fn groups_of(&self, user_id: &str) -> HashSet<GroupId> {
        self.memberships.get(user_id).map(|g| g.clone()).unwrap_or_default()
    }

    fn is_grantee(users: &HashSet<UserId>, groups: &HashSet<GroupId>, user_id: &str, member_of: &HashSet<GroupId>) -> bool {
        users.contains(user_id) || groups.iter().any(|g| member_of.contains(g))
    }

    fn merge(&self, key: AceKey, user_ids: &[UserId], group_ids: &[GroupId]) {
        let mut entry = self.entries.entry(key).or_default();
        entry.0.extend(user_ids.iter().cloned());
        entry.1.extend(group_ids.iter().cloned());
    }
}

#[async_trait]
impl ObjectAclStore for MemAclStore {
    async fn add_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        check_grant(object_id, actions, user_ids, group_ids)?;
        for action in actions {
            self.merge((model, object_id.to_string(), *action), user_ids, group_ids);
        }
        Ok(())
    }

    async fn update_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        self.add_object_permissions(model, object_id, actions, user_ids, group_ids).await
    }

    async fn remove_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        if object_id.is_empty() {
            return Err(AppError::InvalidGrant("object id is empty".to_string()));
        }
        if actions.contains(&PermAction::Create) {
            return Err(AppError::InvalidGrant("create is not an object-level action".to_string()));
        }
        for action in actions {
            if let Some(mut entry) = self.entries.get_mut(&(model, object_id.to_string(), *action)) {
                for user in user_ids {
                    entry.0.remove(user);
                }
                for group in group_ids {
                    entry.1.remove(group);
                }
            }
        }
        Ok(())
    }

    async fn remove_object(&self, model: ResourceModel, object_id: &str) -> Result<(), AppError> {
        self.entries.retain(|(m, oid, _), _| !(*m == model && oid == object_id));
        Ok(())
    }

    async fn get_user_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        user_id: &str,
    ) -> Result<ObjectPermSet, AppError> {
        let member_of = self.groups_of(user_id);
        let mut perm = ObjectPermSet::default();
        for action in PermAction::OBJECT_ACTIONS {
            if let Some(entry) = self.entries.get(&(model, object_id.to_string(), action)) {
                if Self::is_grantee(&entry.0, &entry.1, user_id, &member_of) {
                    perm.set(action, true);
                }
            }
        }
        Ok(perm)
    }

    async fn get_user_objects(
        &self,
        model: ResourceModel,
        action: PermAction,
        user_id: &str,
    ) -> Result<HashSet<String>, AppError> {
        let member_of = self.groups_of(user_id);
        let mut result = HashSet::new();
        for entry in self.entries.iter() {
            let (m, oid, a) = entry.key();
            if *m == model && *a == action && Self::is_grantee(&entry.value().0, &entry.value().1, user_id, &member_of) {
                result.insert(oid.clone());
            }
        }
        Ok(result)
    }

    async fn has_object_permission(
        &self,
        model: ResourceModel,
        object_id: &str,
        action: PermAction,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let member_of = self.groups_of(user_id);
        Ok(self
            .entries
            .get(&(model, object_id.to_string(), action))
            .map(|entry| Self::is_grantee(&entry.0, &entry.1, user_id, &member_of))
            .unwrap_or(false))
    }

    async fn get_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        action: Option<PermAction>,
        page: &PageInfo,
    ) -> Result<PageResult<AccessEntryEntity>, AppError> {
        let mut items: Vec<AccessEntryEntity> = self
            .entries
            .iter()
            .filter(|entry| {
                let (m, oid, a) = entry.key();
                *m == model && oid == object_id && action.map(|want| want == *a).unwrap_or(true)
            })
            .map(|entry| {
                let (m, oid, a) = entry.key().clone();
                let mut user_ids: Vec<UserId> = entry.value().0.iter().cloned().collect();
                let mut group_ids: Vec<GroupId> = entry.value().1.iter().cloned().collect();
                user_ids.sort();
                group_ids.sort();
                AccessEntryEntity {
                    id: format!("{}:{}:{}", m, oid, a),
                    model_name: m,
                    object_id: oid,
                    action: a,
                    user_ids,
                    group_ids,
                    create_time: 0,
                    update_time: 0,
                }
            })
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));

        let index = page.index.max(0) as usize;
        let page_size = page.page_size.max(1) as usize;
        let start = (index * page_size).min(items.len());
        let end = (start + page_size).min(items.len());
        let has_next = end < items.len();
        Ok(PageResult { items: items[start..end].to_vec(), has_next, has_prev: index > 0 })
    }

    async fn import_permissions(&self, entries: Vec<AccessEntryImport>) -> Result<(), AppError> {
        if entries.iter().any(|e| e.object_id.is_empty()) {
            return Err(AppError::InvalidGrant("import entry with empty object id".to_string()));
        }
        if entries.iter().any(|e| e.action == PermAction::Create) {
            return Err(AppError::InvalidGrant("create is not an object-level action".to_string()));
        }
        for entry in entries {
            self.merge((entry.model_name, entry.object_id.clone(), entry.action), &entry.user_ids, &entry.group_ids);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn idempotent_grant() {
        let store = MemAclStore::new();
        for _ in 0..2 {
            store
                .add_object_permissions(ResourceModel::Leaves, "l1", &[PermAction::View], &["u1".to_string()], &[])
                .await
                .unwrap();
        }
        let page = PageInfo::default();
        let listing = store
            .get_object_permissions(ResourceModel::Leaves, "l1", Some(PermAction::View), &page)
            .await
            .unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].user_ids, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn grant_then_revoke_restores_state() {
        let store = MemAclStore::new();
        store
            .add_object_permissions(ResourceModel::Projects, "p1", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap();
        store
            .update_object_permissions(ResourceModel::Projects, "p1", &[PermAction::View], &["u2".to_string()], &[])
            .await
            .unwrap();
        store
            .remove_object_permissions(ResourceModel::Projects, "p1", &[PermAction::View], &["u2".to_string()], &[])
            .await
            .unwrap();
        assert!(store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "u1").await.unwrap());
        assert!(!store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "u2").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_absent_grantee_is_noop() {
        let store = MemAclStore::new();
        store
            .remove_object_permissions(ResourceModel::Projects, "p1", &[PermAction::View], &["ghost".to_string()], &[])
            .await
            .unwrap();
        assert!(!store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "ghost").await.unwrap());
    }

    #[tokio::test]
    async fn grant_rejects_empty_input() {
        let store = MemAclStore::new();
        let err = store
            .add_object_permissions(ResourceModel::Leaves, "", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGrant(_)));
        let err = store
            .add_object_permissions(ResourceModel::Leaves, "l1", &[PermAction::View], &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGrant(_)));
    }

    #[tokio::test]
    async fn create_action_never_lands_on_object_ace() {
        let store = MemAclStore::new();
        let err = store
            .add_object_permissions(ResourceModel::Leaves, "l1", &[PermAction::Create], &["u1".to_string()], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGrant(_)));
        let err = store
            .remove_object_permissions(ResourceModel::Leaves, "l1", &[PermAction::Create], &["u1".to_string()], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGrant(_)));
    }

    #[tokio::test]
    async fn import_merges_grantees() {
        let store = MemAclStore::new();
        store
            .add_object_permissions(ResourceModel::Leaves, "l1", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap();
        let entries = vec![AccessEntryImport {
            model_name: ResourceModel::Leaves,
            object_id: "l1".to_string(),
            action: PermAction::View,
            user_ids: vec!["u2".to_string()],
            group_ids: vec![],
        }];
        // 重复导入不报错、不产生重复被授权人、不覆盖已有授权
        store.import_permissions(entries.clone()).await.unwrap();
        store.import_permissions(entries).await.unwrap();
        let page = PageInfo::default();
        let listing = store
            .get_object_permissions(ResourceModel::Leaves, "l1", Some(PermAction::View), &page)
            .await
            .unwrap();
        assert_eq!(listing.items[0].user_ids, vec!["u1".to_string(), "u2".to_string()]);
    }
}
