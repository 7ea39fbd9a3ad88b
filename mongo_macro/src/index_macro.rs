use quote::quote;
use syn::{parse_macro_input, DeriveInput, Lit};

struct IndexSpec {
    fields: Vec<String>,
    unique: bool,
    name: Option<String>,
}

pub fn expand_index_model_provider(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let ident = &ast.ident;

    let mut specs: Vec<IndexSpec> = vec![];

    for attr in &ast.attrs {
        if !attr.path().is_ident("mongo_index") {
            continue;
        }
        let mut spec = IndexSpec { fields: vec![], unique: false, name: None };
        let res = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("fields") {
                let nested;
                syn::bracketed!(nested in meta.input);
                while let Ok(Lit::Str(lit)) = nested.parse() {
                    spec.fields.push(lit.value());
                    let _ = nested.parse::<syn::Token![,]>();
                }
            } else if meta.path.is_ident("unique") {
                spec.unique = true;
            } else if meta.path.is_ident("name") {
                let content;
                syn::parenthesized!(content in meta.input);
                if let Ok(Lit::Str(lit)) = content.parse() {
                    spec.name = Some(lit.value());
                }
            }
            Ok(())
        });
        if let Err(e) = res {
            return e.to_compile_error().into();
        }
        if !spec.fields.is_empty() {
            specs.push(spec);
        }
    }

    let models = specs.iter().map(|spec| {
        let fields = &spec.fields;
        let mut options = quote! { mongodb::options::IndexOptions::builder() };
        if spec.unique {
            options = quote! { #options.unique(true) };
        }
        if let Some(ref name) = spec.name {
            options = quote! { #options.name(Some(#name.to_string())) };
        }
        quote! {
            {
                let mut keys = mongodb::bson::Document::new();
                #( keys.insert(#fields, 1); )*
                mongodb::IndexModel::builder()
                    .keys(keys)
                    .options(Some(#options.build()))
                    .build()
            }
        }
    });

    let expanded = quote! {
        impl MongoIndexModelProvider for #ident {
            fn index_models() -> Vec<mongodb::IndexModel> {
                vec![ #(#models),* ]
            }
        }
    };
    expanded.into()
}
