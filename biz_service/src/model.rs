use std::collections::HashSet;
use std::fmt;

use common::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// 可挂 ACL 的资源模型，闭合枚举；存储层只见到它的字符串形式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceModel {
    Employees,
    Departments,
    Designations,
    Leaves,
    Overtime,
    Attendance,
    Projects,
    ProjectsTasks,
    TaskFollowers,
}

/// 权限动作；对象级 ACE 上只出现 view/edit/delete，create 属于模型级
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermAction {
    View,
    Create,
    Edit,
    Delete,
}

impl PermAction {
    pub const OBJECT_ACTIONS: [PermAction; 3] = [PermAction::View, PermAction::Edit, PermAction::Delete];
}

/// 权限码：存储边界上是字符串，业务内部始终用该包装类型比较
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PermCode(String);

impl PermCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// 按目录约定生成 `model:action` 形式的权限码，如 `leaves:view`
    pub fn of(model: ResourceModel, action: PermAction) -> Self {
        Self(format!("{}:{}", model, action))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 经过认证的请求主体，由外部认证层产出后显式传入各评估器；
/// 有效权限每次现算，跨请求不缓存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub is_super_user: bool,
    pub is_admin: bool,
    pub permissions: HashSet<PermCode>,
    pub groups: Vec<PrincipalGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrincipalGroup {
    pub id: GroupId,
    pub permissions: HashSet<PermCode>,
}

impl Principal {
    /// 直接权限 ∪ 各分组权限
    pub fn effective_permissions(&self) -> HashSet<PermCode> {
        let mut all = self.permissions.clone();
        for group in &self.groups {
            all.extend(group.permissions.iter().cloned());
        }
        all
    }

    /// 模型级权限判定：要求集合与有效权限有交集即通过（ANY 语义）。
    /// 超级用户在调用边界就被放行，不会走到这里。
    pub fn has_model_permission(&self, required: &[PermCode]) -> bool {
        required.iter().any(|code| {
            self.permissions.contains(code) || self.groups.iter().any(|g| g.permissions.contains(code))
        })
    }
}

/// 单个对象上主体可用的动作集合，detail 接口随数据一起返回
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ObjectPermSet {
    pub view: bool,
    pub edit: bool,
    pub delete: bool,
}

impl ObjectPermSet {
    pub fn all() -> Self {
        Self { view: true, edit: true, delete: true }
    }

    pub fn set(&mut self, action: PermAction, value: bool) {
        match action {
            PermAction::View => self.view = value,
            PermAction::Edit => self.edit = value,
            PermAction::Delete => self.delete = value,
            PermAction::Create => {}
        }
    }

    pub fn get(&self, action: PermAction) -> bool {
        match action {
            PermAction::View => self.view,
            PermAction::Edit => self.edit,
            PermAction::Delete => self.delete,
            PermAction::Create => false,
        }
    }
}
