use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// 支持的查询操作；`field("...")` 可重命名存储字段
enum QueryOp {
    Eq,
    Like,
    Gte,
    Lte,
}

pub fn derive_query_filter(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = input.ident;
    let mut handlers = vec![];

    if let syn::Data::Struct(data) = input.data {
        for field in data.fields {
            let Some(field_ident) = field.ident.clone() else {
                continue;
            };
            let mut rename = field_ident.to_string();
            let mut ops: Vec<QueryOp> = vec![];

            for attr in field.attrs.iter().filter(|a| a.path().is_ident("query")) {
                let res = attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("eq") {
                        ops.push(QueryOp::Eq);
                    } else if meta.path.is_ident("like") {
                        ops.push(QueryOp::Like);
                    } else if meta.path.is_ident("gte") {
                        ops.push(QueryOp::Gte);
                    } else if meta.path.is_ident("lte") {
                        ops.push(QueryOp::Lte);
                    } else if meta.path.is_ident("field") {
                        let val: syn::LitStr = meta.value()?.parse()?;
                        rename = val.value();
                    } else {
                        return Err(meta.error("unsupported #[query(...)] attribute"));
                    }
                    Ok(())
                });
                if let Err(e) = res {
                    return e.to_compile_error().into();
                }
            }

            for op in ops {
                let handler = match op {
                    QueryOp::Eq => quote! {
                        if let Some(val) = &self.#field_ident {
                            doc.insert(#rename, mongodb::bson::to_bson(val).unwrap());
                        }
                    },
                    QueryOp::Like => quote! {
                        if let Some(val) = &self.#field_ident {
                            doc.insert(#rename, doc! { "$regex": val, "$options": "i" });
                        }
                    },
                    QueryOp::Gte => quote! {
                        if let Some(val) = &self.#field_ident {
                            let mut range = doc
                                .get_document(#rename)
                                .map(|d| d.clone())
                                .unwrap_or_default();
                            range.insert("$gte", mongodb::bson::to_bson(val).unwrap());
                            doc.insert(#rename, range);
                        }
                    },
                    QueryOp::Lte => quote! {
                        if let Some(val) = &self.#field_ident {
                            let mut range = doc
                                .get_document(#rename)
                                .map(|d| d.clone())
                                .unwrap_or_default();
                            range.insert("$lte", mongodb::bson::to_bson(val).unwrap());
                            doc.insert(#rename, range);
                        }
                    },
                };
                handlers.push(handler);
            }
        }
    }

    let expanded = quote! {
        impl #struct_name {
            /// 将 DTO 中已填写的字段拼装为过滤条件
            pub fn to_query_doc(&self) -> mongodb::bson::Document {
                use mongodb::bson::doc;
                let mut doc = doc! {};
                #(#handlers)*
                doc
            }
        }
    };
    expanded.into()
}
