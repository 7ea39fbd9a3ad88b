use std::collections::HashSet;
use std::sync::Arc;

use common::UserId;
use common::errors::AppError;
use log::info;
use once_cell::sync::OnceCell;

use crate::biz_service::access_entry_service::AccessEntryService;
use crate::biz_service::acl_store::ObjectAclStore;
use crate::model::{PermAction, ResourceModel};

/// 资源生命周期钩子：创建、团队/归属变化、删除时维护对象级授权。
/// 每个 (主体, 对象, 动作) 的状态机只有 无授权 --授予--> 有授权 --撤销--> 无授权，
/// 重复授予保持原状。
pub struct AccessGrantService {
    store: Arc<dyn ObjectAclStore>,
}

impl AccessGrantService {
    pub fn new(store: Arc<dyn ObjectAclStore>) -> Self {
        Self { store }
    }

    pub fn init() {
        let store: Arc<dyn ObjectAclStore> = AccessEntryService::get();
        INSTANCE
            .set(Arc::new(Self::new(store)))
            .unwrap_or_else(|_| panic!("AccessGrantService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("AccessGrantService not initialized").clone()
    }

    /// 资源创建：创建人拿满 {VIEW,EDIT,DELETE}；挂在组织层级上的资源
    /// （请假、加班、考勤）另给主管集合 VIEW。
    /// 主管集合只在创建时计算一次，后续组织关系变化不回刷。
    pub async fn grant_on_create(
        &self,
        model: ResourceModel,
        object_id: &str,
        creator: &UserId,
        officers: &[UserId],
    ) -> Result<(), AppError> {
        self.store
            .add_object_permissions(model, object_id, &PermAction::OBJECT_ACTIONS, &[creator.clone()], &[])
            .await?;
        let officers: Vec<UserId> =
            officers.iter().filter(|o| *o != creator).cloned().collect();
        if !officers.is_empty() {
            self.store
                .add_object_permissions(model, object_id, &[PermAction::View], &officers, &[])
                .await?;
        }
        info!("acl created model={} object={} creator={}", model, object_id, creator);
        Ok(())
    }

    /// 团队/归属变化：按差集处理，离开者撤销、新成员授予 VIEW，
    /// 同一差集级联应用到依赖的子资源（任务随项目团队、关注人随任务）
    pub async fn apply_team_change(
        &self,
        model: ResourceModel,
        object_id: &str,
        previous: &[UserId],
        current: &[UserId],
        children: &[(ResourceModel, Vec<String>)],
    ) -> Result<(), AppError> {
        let prev: HashSet<&UserId> = previous.iter().collect();
        let curr: HashSet<&UserId> = current.iter().collect();
        let departed: Vec<UserId> = prev.difference(&curr).map(|u| (*u).clone()).collect();
        let joined: Vec<UserId> = curr.difference(&prev).map(|u| (*u).clone()).collect();
        if departed.is_empty() && joined.is_empty() {
            return Ok(());
        }

        let mut targets: Vec<(ResourceModel, String)> = vec![(model, object_id.to_string())];
        for (child_model, child_ids) in children {
            for child_id in child_ids {
                targets.push((*child_model, child_id.clone()));
            }
        }

        for (target_model, target_id) in targets {
            if !departed.is_empty() {
                self.store
                    .remove_object_permissions(target_model, &target_id, &PermAction::OBJECT_ACTIONS, &departed, &[])
                    .await?;
            }
            if !joined.is_empty() {
                self.store
                    .update_object_permissions(target_model, &target_id, &[PermAction::View], &joined, &[])
                    .await?;
            }
        }
        info!(
            "acl team change model={} object={} departed={} joined={}",
            model,
            object_id,
            departed.len(),
            joined.len()
        );
        Ok(())
    }

    /// 显式撤销指定被授权人在对象上的全部动作
    pub async fn revoke_grantees(
        &self,
        model: ResourceModel,
        object_id: &str,
        user_ids: &[UserId],
        group_ids: &[String],
    ) -> Result<(), AppError> {
        self.store
            .remove_object_permissions(model, object_id, &PermAction::OBJECT_ACTIONS, user_ids, group_ids)
            .await
    }

    /// 资源删除：清掉对象与依赖子资源名下的全部 ACE
    pub async fn revoke_on_delete(
        &self,
        model: ResourceModel,
        object_id: &str,
        children: &[(ResourceModel, Vec<String>)],
    ) -> Result<(), AppError> {
        self.store.remove_object(model, object_id).await?;
        for (child_model, child_ids) in children {
            for child_id in child_ids {
                self.store.remove_object(*child_model, child_id).await?;
            }
        }
        info!("acl removed model={} object={}", model, object_id);
        Ok(())
    }
}

static INSTANCE: OnceCell<Arc<AccessGrantService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biz_service::mem_acl::MemAclStore;

    fn service() -> (Arc<MemAclStore>, AccessGrantService) {
        let store = Arc::new(MemAclStore::new());
        (store.clone(), AccessGrantService::new(store))
    }

    fn users(ids: &[&str]) -> Vec<UserId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn creator_gets_full_set_officers_get_view() {
        let (store, service) = service();
        service
            .grant_on_create(ResourceModel::Leaves, "l1", &"p1".to_string(), &users(&["boss", "head"]))
            .await
            .unwrap();

        let creator = store.get_user_object_permissions(ResourceModel::Leaves, "l1", "p1").await.unwrap();
        assert!(creator.view && creator.edit && creator.delete);

        let officer = store.get_user_object_permissions(ResourceModel::Leaves, "l1", "boss").await.unwrap();
        assert!(officer.view && !officer.edit && !officer.delete);
    }

    #[tokio::test]
    async fn create_is_idempotent_for_re_grant() {
        let (store, service) = service();
        for _ in 0..2 {
            service.grant_on_create(ResourceModel::Leaves, "l1", &"p1".to_string(), &[]).await.unwrap();
        }
        let page = common::query_builder::PageInfo::default();
        let listing =
            store.get_object_permissions(ResourceModel::Leaves, "l1", Some(PermAction::View), &page).await.unwrap();
        assert_eq!(listing.items[0].user_ids, vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn team_diff_scenario() {
        let (store, service) = service();
        // 初始团队 [E1, E2]
        service
            .apply_team_change(ResourceModel::Projects, "p1", &[], &users(&["E1", "E2"]), &[])
            .await
            .unwrap();
        // 变更为 [E2, E3]
        service
            .apply_team_change(ResourceModel::Projects, "p1", &users(&["E1", "E2"]), &users(&["E2", "E3"]), &[])
            .await
            .unwrap();

        assert!(!store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "E1").await.unwrap());
        assert!(store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "E2").await.unwrap());
        assert!(store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "E3").await.unwrap());
    }

    #[tokio::test]
    async fn team_diff_cascades_to_children() {
        let (store, service) = service();
        let children = vec![(ResourceModel::ProjectsTasks, vec!["t1".to_string(), "t2".to_string()])];
        service
            .apply_team_change(ResourceModel::Projects, "p1", &[], &users(&["E1"]), &children)
            .await
            .unwrap();
        service
            .apply_team_change(ResourceModel::Projects, "p1", &users(&["E1"]), &users(&["E2"]), &children)
            .await
            .unwrap();

        for task in ["t1", "t2"] {
            assert!(
                !store.has_object_permission(ResourceModel::ProjectsTasks, task, PermAction::View, "E1").await.unwrap()
            );
            assert!(
                store.has_object_permission(ResourceModel::ProjectsTasks, task, PermAction::View, "E2").await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn unchanged_team_touches_nothing() {
        let (store, service) = service();
        service
            .apply_team_change(ResourceModel::Projects, "p1", &users(&["E1"]), &users(&["E1"]), &[])
            .await
            .unwrap();
        assert!(!store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "E1").await.unwrap());
    }

    #[tokio::test]
    async fn delete_clears_object_and_children() {
        let (store, service) = service();
        service.grant_on_create(ResourceModel::Projects, "p1", &"u1".to_string(), &[]).await.unwrap();
        service.grant_on_create(ResourceModel::ProjectsTasks, "t1", &"u1".to_string(), &[]).await.unwrap();
        service
            .revoke_on_delete(
                ResourceModel::Projects,
                "p1",
                &[(ResourceModel::ProjectsTasks, vec!["t1".to_string()])],
            )
            .await
            .unwrap();
        assert!(!store.has_object_permission(ResourceModel::Projects, "p1", PermAction::View, "u1").await.unwrap());
        assert!(!store.has_object_permission(ResourceModel::ProjectsTasks, "t1", PermAction::View, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_grantees_removes_all_actions() {
        let (store, service) = service();
        service.grant_on_create(ResourceModel::Leaves, "l1", &"u1".to_string(), &[]).await.unwrap();
        service.revoke_grantees(ResourceModel::Leaves, "l1", &users(&["u1"]), &[]).await.unwrap();
        let perm = store.get_user_object_permissions(ResourceModel::Leaves, "l1", "u1").await.unwrap();
        assert_eq!(perm, crate::model::ObjectPermSet::default());
    }
}
