use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::errors::AppError;
use common::query_builder::{PageInfo, QueryBuilder, and_merge};
use common::repository_util::{BaseRepository, PageResult, Repository};
use common::util::common_utils::build_id;
use common::util::date_util::now;
use common::{GroupId, UserId};
use mongodb::bson::{Document, doc};
use mongodb::{ClientSession, Database};
use once_cell::sync::OnceCell;

use crate::biz_service::acl_store::{AccessEntryImport, ObjectAclStore, check_grant};
use crate::biz_service::user_group_service::UserGroupService;
use crate::entitys::access_entry_entity::AccessEntryEntity;
use crate::model::{ObjectPermSet, PermAction, ResourceModel};

/// 对象 ACL 存储的 MongoDB 实现。
/// ACE 以 (model_name, object_id, action) 唯一键落库，被授权人用
/// `$addToSet` / `$pull` 做并集与差集更新，保证幂等。
pub struct AccessEntryService {
    pub dao: BaseRepository<AccessEntryEntity>,
    import_chunk_size: usize,
}

impl AccessEntryService {
    pub fn new(db: Database, import_chunk_size: usize) -> Self {
        let collection = db.collection("access_entry");
        Self { dao: BaseRepository::new(db, collection), import_chunk_size }
    }

    pub fn init(db: Database, import_chunk_size: usize) {
        INSTANCE
            .set(Arc::new(Self::new(db, import_chunk_size)))
            .unwrap_or_else(|_| panic!("AccessEntryService already initialized"));
    }

    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("AccessEntryService not initialized").clone()
    }

    fn key_filter(model: ResourceModel, object_id: &str, action: PermAction) -> Document {
        doc! {
            "model_name": model.to_string(),
            "object_id": object_id,
            "action": action.to_string(),
        }
    }

    /// 本人命中或所在任一用户组命中
    fn grantee_filter(user_id: &str, group_ids: &[GroupId]) -> Document {
        QueryBuilder::new()
            .eq("user_ids", user_id)
            .or()
            .in_array("group_ids", group_ids.to_vec())
            .build()
    }

    fn grant_update(user_ids: &[UserId], group_ids: &[GroupId]) -> Document {
        doc! {
            "$addToSet": {
                "user_ids": { "$each": user_ids.to_vec() },
                "group_ids": { "$each": group_ids.to_vec() },
            },
            "$set": { "update_time": now() },
            "$setOnInsert": {
                "id": build_id(),
                "create_time": now(),
            },
        }
    }

    async fn grant_with_session(
        &self,
        session: &mut ClientSession,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        for action in actions {
            self.dao
                .collection
                .update_one(Self::key_filter(model, object_id, *action), Self::grant_update(user_ids, group_ids))
                .upsert(true)
                .session(&mut *session)
                .await?;
        }
        Ok(())
    }

    /// 单动作直接写；多动作进事务，崩溃不会留下半套授权
    async fn grant(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        check_grant(object_id, actions, user_ids, group_ids)?;
        if let [action] = actions {
            self.dao
                .collection
                .update_one(Self::key_filter(model, object_id, *action), Self::grant_update(user_ids, group_ids))
                .upsert(true)
                .await?;
            return Ok(());
        }
        let mut session = self.dao.db.client().start_session().await?;
        session.start_transaction().await?;
        match self.grant_with_session(&mut session, model, object_id, actions, user_ids, group_ids).await {
            Ok(_) => {
                session.commit_transaction().await?;
                Ok(())
            }
            Err(e) => {
                let _ = session.abort_transaction().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ObjectAclStore for AccessEntryService {
    async fn add_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        self.grant(model, object_id, actions, user_ids, group_ids).await
    }

    async fn update_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        actions: &[PermAction],
        user_ids: &[UserId],
        group_ids: &[GroupId],
    ) -> Result<(), AppError> {
        // 追加语义与 add 一致：并集更新，从不移除
        self.grant(model, object_id, actions, user_ids, group_ids).await
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
        if actions.is_empty() || (user_ids.is_empty() && group_ids.is_empty()) {
            // 无事可做；撤销不存在的授权不是错误
            return Ok(());
        }
        let update = doc! {
            "$pull": {
                "user_ids": { "$in": user_ids.to_vec() },
                "group_ids": { "$in": group_ids.to_vec() },
            },
            "$set": { "update_time": now() },
        };
        if let [action] = actions {
            self.dao.update_one(Self::key_filter(model, object_id, *action), update).await?;
            return Ok(());
        }
        let mut session = self.dao.db.client().start_session().await?;
        session.start_transaction().await?;
        let mut result: Result<(), AppError> = Ok(());
        for action in actions {
            let outcome = self
                .dao
                .collection
                .update_one(Self::key_filter(model, object_id, *action), update.clone())
                .session(&mut session)
                .await;
            if let Err(e) = outcome {
                result = Err(e.into());
                break;
            }
        }
        match result {
            Ok(_) => {
                session.commit_transaction().await?;
                Ok(())
            }
            Err(e) => {
                let _ = session.abort_transaction().await;
                Err(e)
            }
        }
    }

    async fn remove_object(&self, model: ResourceModel, object_id: &str) -> Result<(), AppError> {
        if object_id.is_empty() {
            return Err(AppError::InvalidGrant("object id is empty".to_string()));
        }
        self.dao
            .delete(doc! { "model_name": model.to_string(), "object_id": object_id })
            .await?;
        Ok(())
    }

    async fn get_user_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        user_id: &str,
    ) -> Result<ObjectPermSet, AppError> {
        let group_ids = UserGroupService::get().group_ids_of_user(user_id).await?;
        let filter = and_merge(
            doc! { "model_name": model.to_string(), "object_id": object_id },
            Self::grantee_filter(user_id, &group_ids),
        );
        let entries = self.dao.query(filter).await?;
        let mut perm = ObjectPermSet::default();
        for entry in entries {
            perm.set(entry.action, true);
        }
        Ok(perm)
    }

    async fn get_user_objects(
        &self,
        model: ResourceModel,
        action: PermAction,
        user_id: &str,
    ) -> Result<HashSet<String>, AppError> {
        let group_ids = UserGroupService::get().group_ids_of_user(user_id).await?;
        let filter = and_merge(
            doc! { "model_name": model.to_string(), "action": action.to_string() },
            Self::grantee_filter(user_id, &group_ids),
        );
        let entries = self.dao.query(filter).await?;
        Ok(entries.into_iter().map(|e| e.object_id).collect())
    }

    async fn has_object_permission(
        &self,
        model: ResourceModel,
        object_id: &str,
        action: PermAction,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let group_ids = UserGroupService::get().group_ids_of_user(user_id).await?;
        let filter =
            and_merge(Self::key_filter(model, object_id, action), Self::grantee_filter(user_id, &group_ids));
        let count = self.dao.count(filter).await?;
        Ok(count > 0)
    }

    async fn get_object_permissions(
        &self,
        model: ResourceModel,
        object_id: &str,
        action: Option<PermAction>,
        page: &PageInfo,
    ) -> Result<PageResult<AccessEntryEntity>, AppError> {
        let mut filter = doc! { "model_name": model.to_string(), "object_id": object_id };
        if let Some(action) = action {
            filter.insert("action", action.to_string());
        }
        let result = self.dao.query_by_page(filter, page).await?;
        Ok(result)
    }

    async fn import_permissions(&self, entries: Vec<AccessEntryImport>) -> Result<(), AppError> {
        if entries.iter().any(|e| e.object_id.is_empty()) {
            return Err(AppError::InvalidGrant("import entry with empty object id".to_string()));
        }
        if entries.iter().any(|e| e.action == PermAction::Create) {
            return Err(AppError::InvalidGrant("create is not an object-level action".to_string()));
        }
        for chunk in pack_chunks(entries, self.import_chunk_size) {
            let mut session = self.dao.db.client().start_session().await?;
            session.start_transaction().await?;
            let mut result: Result<(), AppError> = Ok(());
            for entry in &chunk {
                let outcome = self
                    .dao
                    .collection
                    .update_one(
                        Self::key_filter(entry.model_name, &entry.object_id, entry.action),
                        Self::grant_update(&entry.user_ids, &entry.group_ids),
                    )
                    .upsert(true)
                    .session(&mut session)
                    .await;
                if let Err(e) = outcome {
                    result = Err(e.into());
                    break;
                }
            }
            match result {
                Ok(_) => session.commit_transaction().await?,
                Err(e) => {
                    let _ = session.abort_transaction().await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// 导入条目装箱：先按 (模型, 对象) 聚合，同一对象的各动作始终落在
/// 同一块里一起提交；单个对象的条目数超过上限时独占一块，不拆分
fn pack_chunks(entries: Vec<AccessEntryImport>, chunk_size: usize) -> Vec<Vec<AccessEntryImport>> {
    let mut grouped: BTreeMap<(String, String), Vec<AccessEntryImport>> = BTreeMap::new();
    for entry in entries {
        grouped
            .entry((entry.model_name.to_string(), entry.object_id.clone()))
            .or_default()
            .push(entry);
    }

    let mut chunk: Vec<AccessEntryImport> = vec![];
    let mut chunks: Vec<Vec<AccessEntryImport>> = vec![];
    for (_, group) in grouped {
        if !chunk.is_empty() && chunk.len() + group.len() > chunk_size {
            chunks.push(std::mem::take(&mut chunk));
        }
        chunk.extend(group);
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

static INSTANCE: OnceCell<Arc<AccessEntryService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(object_id: &str, action: PermAction) -> AccessEntryImport {
        AccessEntryImport {
            model_name: ResourceModel::Leaves,
            object_id: object_id.to_string(),
            action,
            user_ids: vec!["u1".to_string()],
            group_ids: vec![],
        }
    }

    fn object_ids(chunk: &[AccessEntryImport]) -> Vec<&str> {
        chunk.iter().map(|e| e.object_id.as_str()).collect()
    }

    #[test]
    fn oversized_group_stays_whole_in_one_chunk() {
        // 同一对象的条目数超过上限也不拆分，整组独占一块
        let entries = vec![
            entry("l1", PermAction::View),
            entry("l1", PermAction::Edit),
            entry("l1", PermAction::Delete),
        ];
        let chunks = pack_chunks(entries, 2);
        assert_eq!(chunks.len(), 1);
        assert_eq!(object_ids(&chunks[0]), vec!["l1", "l1", "l1"]);
    }

    #[test]
    fn groups_pack_up_to_but_not_over_the_bound() {
        let entries = vec![
            entry("l1", PermAction::View),
            entry("l1", PermAction::Edit),
            entry("l2", PermAction::View),
            entry("l3", PermAction::View),
        ];
        let chunks = pack_chunks(entries, 3);
        // l1+l2 恰好填满一块，l3 另起新块
        assert_eq!(chunks.len(), 2);
        assert_eq!(object_ids(&chunks[0]), vec!["l1", "l1", "l2"]);
        assert_eq!(object_ids(&chunks[1]), vec!["l3"]);
    }

    #[test]
    fn flush_happens_before_a_group_that_would_overflow() {
        let entries = vec![
            entry("l1", PermAction::View),
            entry("l1", PermAction::Edit),
            entry("l2", PermAction::View),
            entry("l2", PermAction::Edit),
        ];
        let chunks = pack_chunks(entries, 3);
        // l2 整组放不进当前块时先冲刷，而不是把 l2 拆开
        assert_eq!(chunks.len(), 2);
        assert_eq!(object_ids(&chunks[0]), vec!["l1", "l1"]);
        assert_eq!(object_ids(&chunks[1]), vec!["l2", "l2"]);
    }

    #[test]
    fn no_entries_yields_no_chunks() {
        assert!(pack_chunks(vec![], 10).is_empty());
    }
}
