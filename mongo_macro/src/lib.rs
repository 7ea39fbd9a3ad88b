extern crate proc_macro;

mod index_macro;
mod query_macro;

use proc_macro::TokenStream;

/// 为实体声明 MongoDB 索引：
/// `#[mongo_index(fields["model_name","object_id","action"], unique)]`
#[proc_macro_derive(MongoIndexModelProvider, attributes(mongo_index))]
pub fn mongo_index_model_provider(input: TokenStream) -> TokenStream {
    index_macro::expand_index_model_provider(input)
}

/// 由查询 DTO 生成 BSON 过滤条件：
/// `#[query(eq)]` / `#[query(like)]` / `#[query(gte)]` / `#[query(lte)]`
#[proc_macro_derive(QueryFilter, attributes(query))]
pub fn derive_query_filter(input: TokenStream) -> TokenStream {
    query_macro::derive_query_filter(input)
}
