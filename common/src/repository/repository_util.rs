use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database, bson::Document, error::Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::query_builder::PageInfo;

#[derive(Debug, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

#[async_trait]
pub trait Repository<T> {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>>;
    async fn insert(&self, entity: &T) -> Result<()>;
    async fn find_one(&self, filter: Document) -> Result<Option<T>>;
    async fn query(&self, filter: Document) -> Result<Vec<T>>;
    async fn query_all(&self) -> Result<Vec<T>>;
    async fn update_one(&self, filter: Document, update: Document) -> Result<u64>;
    async fn upsert_one(&self, filter: Document, update: Document) -> Result<u64>;
    async fn update_many(&self, filter: Document, update: Document) -> Result<u64>;
    async fn delete(&self, filter: Document) -> Result<u64>;
    async fn count(&self, filter: Document) -> Result<u64>;
    async fn query_by_page(&self, filter: Document, page: &PageInfo) -> Result<PageResult<T>>;
}

pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>,
    pub db: Database,
}

impl<T: Send + Sync> BaseRepository<T> {
    pub fn new(db: Database, collection: Collection<T>) -> Self {
        Self { collection, db }
    }
}

#[async_trait]
impl<T: Send + Sync> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        self.find_one(doc! { "id": id }).await
    }

    async fn insert(&self, entity: &T) -> Result<()> {
        self.collection.insert_one(entity).await?;
        Ok(())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        let result = self.collection.find_one(filter).await?;
        Ok(result)
    }

    async fn query(&self, filter: Document) -> Result<Vec<T>> {
        let mut cursor = self.collection.find(filter).await?;
        let mut result = vec![];
        while let Some(item) = cursor.try_next().await? {
            result.push(item);
        }
        Ok(result)
    }

    async fn query_all(&self) -> Result<Vec<T>> {
        self.query(doc! {}).await
    }

    async fn update_one(&self, filter: Document, update: Document) -> Result<u64> {
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count)
    }

    async fn upsert_one(&self, filter: Document, update: Document) -> Result<u64> {
        let result = self.collection.update_one(filter, update).upsert(true).await?;
        Ok(result.modified_count)
    }

    async fn update_many(&self, filter: Document, update: Document) -> Result<u64> {
        let result = self.collection.update_many(filter, update).await?;
        Ok(result.modified_count)
    }

    async fn delete(&self, filter: Document) -> Result<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, filter: Document) -> Result<u64> {
        self.collection.count_documents(filter).await
    }

    async fn query_by_page(&self, filter: Document, page: &PageInfo) -> Result<PageResult<T>> {
        let sort_direction = match page.order_type {
            OrderType::Asc => 1,
            OrderType::Desc => -1,
        };
        let index = page.index.max(0) as u64;
        let page_size = page.page_size.max(1) as i64;
        // 多取一条用来判断是否还有下一页
        let find_options = FindOptions::builder()
            .sort(doc! { page.order_column.as_str(): sort_direction })
            .skip(index * page_size as u64)
            .limit(page_size + 1)
            .build();

        let mut cursor = self.collection.find(filter).with_options(find_options).await?;
        let mut items: Vec<T> = vec![];
        while let Some(item) = cursor.try_next().await? {
            items.push(item);
        }

        let has_next = items.len() as i64 > page_size;
        if has_next {
            items.pop();
        }
        Ok(PageResult { items, has_next, has_prev: index > 0 })
    }
}
