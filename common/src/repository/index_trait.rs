use mongodb::Collection;

pub trait MongoIndexModelProvider {
    fn index_models() -> Vec<mongodb::IndexModel>;
}

/// 按实体声明的索引模型建索引，幂等（已存在的索引不会重复创建）
pub async fn ensure_indexes<T>(collection: &Collection<T>) -> mongodb::error::Result<()>
where
    T: MongoIndexModelProvider + Send + Sync,
{
    let models = T::index_models();
    if !models.is_empty() {
        collection.create_indexes(models).await?;
    }
    Ok(())
}
