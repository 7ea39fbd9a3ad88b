use crate::repository_util::OrderType;
use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub index: i32,
    pub page_size: i32,
    pub order_column: String,
    #[schema(value_type = String)]
    pub order_type: OrderType,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self { index: 0, page_size: 20, order_column: "create_time".to_string(), order_type: OrderType::Asc }
    }
}

/// 将两个过滤条件按 `$and` 合并；任一为空时直接返回另一个
pub fn and_merge(left: Document, right: Document) -> Document {
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }
    doc! { "$and": [left, right] }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct QueryBuilder {
    clauses: Vec<Document>,
    current: Document,
    logic_op: Option<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.current.insert(field, value.into());
        self
    }

    pub fn in_array<T: Into<Bson>>(mut self, field: &str, values: Vec<T>) -> Self {
        let arr = values.into_iter().map(Into::into).collect::<Vec<_>>();
        self.current.insert(field, doc! { "$in": arr });
        self
    }

    pub fn or(mut self) -> Self {
        self.logic_op = Some("$or".into());
        self.clauses.push(self.current);
        self.current = Document::new();
        self
    }

    pub fn and(mut self) -> Self {
        self.logic_op = Some("$and".into());
        self.clauses.push(self.current);
        self.current = Document::new();
        self
    }

    pub fn build(mut self) -> Document {
        if !self.current.is_empty() {
            self.clauses.push(self.current);
        }
        match self.logic_op.as_deref() {
            Some("$and") => doc! { "$and": self.clauses },
            Some("$or") => doc! { "$or": self.clauses },
            _ if self.clauses.len() == 1 => self.clauses.remove(0),
            _ => doc! {},
        }
    }
}
