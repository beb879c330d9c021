// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type,
};

/// How an embedded field reaches its sub-record.
enum EmbedShape {
    /// `T`
    Direct,
    /// `Box<T>`
    Boxed,
    /// `Option<T>`
    Optional,
    /// `Option<Box<T>>`
    OptionalBoxed,
}

/// Annotated or embedded field collected from the struct.
struct AttributeInfo {
    name: syn::Ident,
    annotations: Vec<(String, String)>,
    embed: Option<EmbedShape>,
}

/// `#[derive(Record)]` macro: generates the static `RecordDescriptor` and
/// index-based accessors.
///
/// Field attributes:
/// - `#[annotate(<key> = "<annotation>")]`: annotation under an outer key,
///   repeatable for several keys
/// - `#[annotate(embed)]`: the field is a sub-record merged into this one
///   (`T`, `Box<T>`, `Option<T>` or `Option<Box<T>>` where `T: Record`)
///
/// Fields without `#[annotate]` are not part of the descriptor.
///
/// Example:
/// ```ignore
/// use influxqu::Record;
///
/// #[derive(Record)]
/// struct Sample {
///     #[annotate(influxqu = "measurement")]
///     name: String,
///     #[annotate(influxqu = "tag,host", metrics = "tag,hostname")]
///     host: String,
///     #[annotate(influxqu = "field,value")]
///     value: f64,
///     #[annotate(embed)]
///     common: Common,
/// }
/// ```
#[proc_macro_derive(Record, attributes(annotate))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let type_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return syn::Error::new_spanned(&input, "Only named fields are supported")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Only structs are supported")
                .to_compile_error()
                .into()
        }
    };

    let mut attribute_infos = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return syn::Error::new_spanned(field, "Field must have a name")
                .to_compile_error()
                .into();
        };

        let (annotations, embed) = match parse_annotate(field) {
            Ok(parsed) => parsed,
            Err(err) => return err.to_compile_error().into(),
        };

        if annotations.is_empty() && !embed {
            continue;
        }

        let embed = if embed {
            match embed_shape(&field.ty) {
                Some(shape) => Some(shape),
                None => {
                    return syn::Error::new_spanned(
                        &field.ty,
                        "Embedded field must be a record type or a Box/Option of one",
                    )
                    .to_compile_error()
                    .into()
                }
            }
        } else {
            None
        };

        attribute_infos.push(AttributeInfo {
            name: field_name.clone(),
            annotations,
            embed,
        });
    }

    // Generate RecordDescriptor attributes array
    let attribute_descriptors: Vec<_> = attribute_infos
        .iter()
        .map(|a| {
            let name_str = a.name.unraw().to_string();
            let embedded = a.embed.is_some();
            let pairs = a.annotations.iter().map(|(key, annotation)| {
                quote! { (#key, #annotation) }
            });
            quote! {
                ::influxqu::AttributeDescriptor {
                    name: #name_str,
                    annotations: &[#(#pairs),*],
                    embedded: #embedded,
                }
            }
        })
        .collect();

    let attribute_arms: Vec<_> = attribute_infos
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.annotations.is_empty())
        .map(|(index, a)| {
            let field_name = &a.name;
            quote! {
                #index => Some(&self.#field_name as &dyn ::influxqu::Attribute),
            }
        })
        .collect();

    let embedded_arms: Vec<_> = attribute_infos
        .iter()
        .enumerate()
        .filter_map(|(index, a)| {
            let field_name = &a.name;
            let access = match a.embed.as_ref()? {
                EmbedShape::Direct => quote! { Some(&self.#field_name as &dyn ::influxqu::Record) },
                EmbedShape::Boxed => quote! { Some(&*self.#field_name as &dyn ::influxqu::Record) },
                EmbedShape::Optional => quote! {
                    self.#field_name.as_ref().map(|r| r as &dyn ::influxqu::Record)
                },
                EmbedShape::OptionalBoxed => quote! {
                    self.#field_name.as_deref().map(|r| r as &dyn ::influxqu::Record)
                },
            };
            Some(quote! { #index => #access, })
        })
        .collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::influxqu::Record for #name #ty_generics #where_clause {
            fn descriptor(&self) -> &'static ::influxqu::RecordDescriptor {
                static DESCRIPTOR: ::influxqu::RecordDescriptor = ::influxqu::RecordDescriptor {
                    type_name: #type_name,
                    attributes: &[#(#attribute_descriptors),*],
                };
                &DESCRIPTOR
            }

            #[allow(unused_variables)]
            fn attribute(&self, index: usize) -> Option<&dyn ::influxqu::Attribute> {
                match index {
                    #(#attribute_arms)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn embedded(&self, index: usize) -> Option<&dyn ::influxqu::Record> {
                match index {
                    #(#embedded_arms)*
                    _ => None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Collect `#[annotate(...)]` entries of a field.
///
/// Returns the `(key, annotation)` pairs in source order and the embed flag.
fn parse_annotate(field: &syn::Field) -> syn::Result<(Vec<(String, String)>, bool)> {
    let mut annotations: Vec<(String, String)> = Vec::new();
    let mut embed = false;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("annotate")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("embed") {
                embed = true;
                return Ok(());
            }

            let Some(ident) = meta.path.get_ident() else {
                return Err(meta.error("expected `embed` or `<key> = \"...\"`"));
            };
            let key = ident.unraw().to_string();
            let annotation: LitStr = meta.value()?.parse()?;

            if annotations.iter().any(|(k, _)| *k == key) {
                return Err(meta.error(format!("duplicate annotation key `{key}`")));
            }
            annotations.push((key, annotation.value()));
            Ok(())
        })?;
    }

    Ok((annotations, embed))
}

/// Classify the syntactic shape of an embedded field type.
fn embed_shape(ty: &Type) -> Option<EmbedShape> {
    match wrapper(ty) {
        Some(("Box", _)) => Some(EmbedShape::Boxed),
        Some(("Option", inner)) => match wrapper(inner) {
            Some(("Box", _)) => Some(EmbedShape::OptionalBoxed),
            Some(("Option", _)) => None,
            _ => Some(EmbedShape::Optional),
        },
        _ => Some(EmbedShape::Direct),
    }
}

/// `Box<T>` or `Option<T>`: wrapper name and `T`.
fn wrapper(ty: &Type) -> Option<(&'static str, &Type)> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let name = if segment.ident == "Box" {
        "Box"
    } else if segment.ident == "Option" {
        "Option"
    } else {
        return None;
    };

    if let PathArguments::AngleBracketed(args) = &segment.arguments {
        if let Some(GenericArgument::Type(inner)) = args.args.first() {
            return Some((name, inner));
        }
    }
    None
}
