use std::future::Future;

use common::errors::AppError;
use common::query_builder::and_merge;
use mongodb::bson::{Document, doc};
use serde::Serialize;

use crate::biz_service::acl_store::ObjectAclStore;
use crate::model::{ObjectPermSet, PermAction, PermCode, Principal, ResourceModel};

/// detail 查询的返回：数据加上主体在该对象上的动作集合，
/// 前端据此决定是否渲染编辑/删除入口，省一次往返
#[derive(Debug, Clone, Serialize)]
pub struct RecordWithPerm<T> {
    pub data: T,
    pub perm: ObjectPermSet,
}

/// 列表查询的统一入口，所有列表接口都应经由这里取数。
///
/// 三路分支：
/// 1. 超级用户或模型级权限命中：原样透传调用方过滤条件，不加限制；
/// 2. 否则取主体持有 VIEW 的对象 ID 集合 S：S 为空返回 `None`（调用方映射为 403）；
///    S 非空则把 `id ∈ S` 与调用方过滤条件做 `$and` 后取数，结果为空不算拒绝；
/// 3. 取数回调的错误原样上抛，这里不做重试。
pub async fn get_records<T, F, Fut>(
    store: &dyn ObjectAclStore,
    model: ResourceModel,
    required: &[PermCode],
    principal: &Principal,
    filter: Document,
    fetch: F,
) -> Result<Option<T>, AppError>
where
    F: FnOnce(Document) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if principal.is_super_user || principal.has_model_permission(required) {
        let result = fetch(filter).await?;
        return Ok(Some(result));
    }

    let visible = store.get_user_objects(model, PermAction::View, &principal.id).await?;
    if visible.is_empty() {
        return Ok(None);
    }
    let ids: Vec<String> = visible.into_iter().collect();
    let restricted = and_merge(filter, doc! { "id": { "$in": ids } });
    let result = fetch(restricted).await?;
    Ok(Some(result))
}

/// 单对象版本：`None` 表示主体既无模型级也无对象级 VIEW；
/// 已放行但取不到数据时报 NotFound，存在性不会经由授权通道泄露。
pub async fn get_record<T, F, Fut>(
    store: &dyn ObjectAclStore,
    model: ResourceModel,
    required: &[PermCode],
    principal: &Principal,
    object_id: &str,
    fetch: F,
) -> Result<Option<RecordWithPerm<T>>, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, AppError>>,
{
    let perm = resolve_perm(store, model, principal, object_id).await?;
    let allowed = principal.is_super_user || principal.has_model_permission(required) || perm.view;
    if !allowed {
        return Ok(None);
    }
    match fetch().await? {
        Some(data) => Ok(Some(RecordWithPerm { data, perm })),
        None => Err(AppError::NotFound),
    }
}

/// 对象上的动作集合：超级用户全开；否则对象级授权与模型级授权取并（范围大的赢）
async fn resolve_perm(
    store: &dyn ObjectAclStore,
    model: ResourceModel,
    principal: &Principal,
    object_id: &str,
) -> Result<ObjectPermSet, AppError> {
    if principal.is_super_user {
        return Ok(ObjectPermSet::all());
    }
    let mut perm = store.get_user_object_permissions(model, object_id, &principal.id).await?;
    for action in PermAction::OBJECT_ACTIONS {
        if !perm.get(action) && principal.has_model_permission(&[PermCode::of(model, action)]) {
            perm.set(action, true);
        }
    }
    Ok(perm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biz_service::mem_acl::MemAclStore;
    use crate::model::PrincipalGroup;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
    }

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter().map(|id| Row { id: id.to_string() }).collect()
    }

    fn plain_principal(id: &str) -> Principal {
        Principal { id: id.to_string(), ..Default::default() }
    }

    fn super_principal(id: &str) -> Principal {
        Principal { id: id.to_string(), is_super_user: true, ..Default::default() }
    }

    fn model_view_principal(id: &str, model: ResourceModel) -> Principal {
        Principal {
            id: id.to_string(),
            permissions: [PermCode::of(model, PermAction::View)].into_iter().collect(),
            ..Default::default()
        }
    }

    /// 从过滤条件里抠出 id ∈ S 的限制；没有限制返回 None
    fn id_restriction(filter: &Document) -> Option<HashSet<String>> {
        fn from_clause(clause: &Document) -> Option<HashSet<String>> {
            let in_doc = clause.get_document("id").ok()?;
            let arr = in_doc.get_array("$in").ok()?;
            Some(arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        }
        if let Ok(clauses) = filter.get_array("$and") {
            return clauses
                .iter()
                .filter_map(|c| c.as_document())
                .find_map(from_clause);
        }
        from_clause(filter)
    }

    fn filtered(data: &[Row], filter: &Document) -> Vec<Row> {
        match id_restriction(filter) {
            Some(ids) => data.iter().filter(|r| ids.contains(&r.id)).cloned().collect(),
            None => data.to_vec(),
        }
    }

    async fn list(
        store: &MemAclStore,
        principal: &Principal,
        data: &[Row],
        filter: Document,
    ) -> Result<Option<Vec<Row>>, AppError> {
        let data = data.to_vec();
        get_records(
            store,
            ResourceModel::Leaves,
            &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
            principal,
            filter,
            |f| async move { Ok(filtered(&data, &f)) },
        )
        .await
    }

    #[tokio::test]
    async fn superuser_bypasses_ace_state() {
        let store = MemAclStore::new();
        let data = rows(&["a", "b", "c"]);
        let result = list(&store, &super_principal("root"), &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), data);
    }

    #[tokio::test]
    async fn model_view_returns_unrestricted_set() {
        let store = MemAclStore::new();
        // 对象级授权只覆盖 a，模型级 VIEW 必须盖过它
        store
            .add_object_permissions(ResourceModel::Leaves, "a", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap();
        let data = rows(&["a", "b", "c"]);
        let result =
            list(&store, &model_view_principal("u1", ResourceModel::Leaves), &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), data);
    }

    #[tokio::test]
    async fn object_view_narrows_to_granted_ids() {
        let store = MemAclStore::new();
        for oid in ["a", "b"] {
            store
                .add_object_permissions(ResourceModel::Leaves, oid, &[PermAction::View], &["u1".to_string()], &[])
                .await
                .unwrap();
        }
        let data = rows(&["a", "b", "c"]);
        let result = list(&store, &plain_principal("u1"), &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), rows(&["a", "b"]));
    }

    #[tokio::test]
    async fn no_access_returns_none() {
        let store = MemAclStore::new();
        let data = rows(&["a"]);
        let result = list(&store, &plain_principal("u1"), &data, doc! {}).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn empty_result_is_not_denial() {
        let store = MemAclStore::new();
        store
            .add_object_permissions(ResourceModel::Leaves, "z", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap();
        // 有 VIEW 授权但数据集中没有该行：返回空列表而不是 None
        let data = rows(&["a", "b"]);
        let result = list(&store, &plain_principal("u1"), &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn caller_filter_is_anded_not_replaced() {
        let store = MemAclStore::new();
        store
            .add_object_permissions(ResourceModel::Leaves, "a", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap();
        let caller_filter = doc! { "status": "pending" };
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Document::new()));
        let seen_in = seen.clone();
        let result = get_records(
            &store,
            ResourceModel::Leaves,
            &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
            &plain_principal("u1"),
            caller_filter,
            |f| {
                let seen = seen_in.clone();
                async move {
                    *seen.lock().unwrap() = f;
                    Ok(Vec::<Row>::new())
                }
            },
        )
        .await
        .unwrap();
        assert!(result.is_some());

        let sent = seen.lock().unwrap().clone();
        let clauses = sent.get_array("$and").expect("expected $and merge");
        assert_eq!(clauses.len(), 2);
        assert!(
            clauses
                .iter()
                .filter_map(|c| c.as_document())
                .any(|c| c.get_str("status") == Ok("pending"))
        );
        assert_eq!(id_restriction(&sent).unwrap(), ["a".to_string()].into_iter().collect());
    }

    #[tokio::test]
    async fn group_grant_passes_through_membership() {
        let store = MemAclStore::new();
        store.add_membership("u1", "g1");
        store
            .add_object_permissions(ResourceModel::Leaves, "x", &[PermAction::View], &[], &["g1".to_string()])
            .await
            .unwrap();
        assert!(
            store
                .has_object_permission(ResourceModel::Leaves, "x", PermAction::View, "u1")
                .await
                .unwrap()
        );
        let data = rows(&["x", "y"]);
        let result = list(&store, &plain_principal("u1"), &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), rows(&["x"]));
    }

    #[tokio::test]
    async fn detail_denied_without_any_view() {
        let store = MemAclStore::new();
        let result = get_record(
            &store,
            ResourceModel::Leaves,
            &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
            &plain_principal("u1"),
            "a",
            || async { Ok(Some(Row { id: "a".to_string() })) },
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn detail_returns_perm_bits() {
        let store = MemAclStore::new();
        store
            .add_object_permissions(
                ResourceModel::Leaves,
                "a",
                &[PermAction::View, PermAction::Edit],
                &["u1".to_string()],
                &[],
            )
            .await
            .unwrap();
        let result = get_record(
            &store,
            ResourceModel::Leaves,
            &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
            &plain_principal("u1"),
            "a",
            || async { Ok(Some(Row { id: "a".to_string() })) },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.perm, ObjectPermSet { view: true, edit: true, delete: false });
    }

    #[tokio::test]
    async fn detail_model_grant_widens_perm_bits() {
        let store = MemAclStore::new();
        store
            .add_object_permissions(ResourceModel::Leaves, "a", &[PermAction::View], &["u1".to_string()], &[])
            .await
            .unwrap();
        let mut principal = plain_principal("u1");
        principal.permissions.insert(PermCode::of(ResourceModel::Leaves, PermAction::Delete));
        let result = get_record(
            &store,
            ResourceModel::Leaves,
            &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
            &principal,
            "a",
            || async { Ok(Some(Row { id: "a".to_string() })) },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.perm, ObjectPermSet { view: true, edit: false, delete: true });
    }

    #[tokio::test]
    async fn detail_not_found_after_authorization() {
        let store = MemAclStore::new();
        let result = get_record(
            &store,
            ResourceModel::Leaves,
            &[PermCode::of(ResourceModel::Leaves, PermAction::View)],
            &super_principal("root"),
            "missing",
            || async { Ok(None::<Row>) },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn required_alternatives_use_any_semantics() {
        let store = MemAclStore::new();
        let mut principal = plain_principal("u1");
        principal.permissions.insert(PermCode::of(ResourceModel::Leaves, PermAction::Create));
        let data = rows(&["a", "b"]);
        // VIEW 或 CREATE 二选一命中即放行
        let result = get_records(
            &store,
            ResourceModel::Leaves,
            &[
                PermCode::of(ResourceModel::Leaves, PermAction::View),
                PermCode::of(ResourceModel::Leaves, PermAction::Create),
            ],
            &principal,
            doc! {},
            |f| {
                let data = data.clone();
                async move { Ok(filtered(&data, &f)) }
            },
        )
        .await
        .unwrap();
        assert_eq!(result.unwrap(), rows(&["a", "b"]));
    }

    #[tokio::test]
    async fn created_leave_visible_to_creator_only() {
        use crate::biz_service::access_grant_service::AccessGrantService;
        use std::sync::Arc;

        let store = Arc::new(MemAclStore::new());
        let grants = AccessGrantService::new(store.clone());
        grants
            .grant_on_create(ResourceModel::Leaves, "L1", &"P1".to_string(), &[])
            .await
            .unwrap();

        let mut data = rows(&["L1"]);
        for i in 0..10 {
            data.push(Row { id: format!("other{}", i) });
        }

        let result = list(&store, &plain_principal("P1"), &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), rows(&["L1"]));

        let all = list(&store, &super_principal("P2"), &data, doc! {}).await.unwrap();
        assert_eq!(all.unwrap().len(), 11);
    }

    #[tokio::test]
    async fn group_model_permission_via_principal_groups() {
        let store = MemAclStore::new();
        let principal = Principal {
            id: "u1".to_string(),
            groups: vec![PrincipalGroup {
                id: "g1".to_string(),
                permissions: [PermCode::of(ResourceModel::Leaves, PermAction::View)].into_iter().collect(),
            }],
            ..Default::default()
        };
        let data = rows(&["a", "b", "c"]);
        let result = list(&store, &principal, &data, doc! {}).await.unwrap();
        assert_eq!(result.unwrap(), data);
    }
}
