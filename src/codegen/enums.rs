//! String enums with an open-world fallback variant.
//!
//! Decoding never fails on an unrecognized value: it lands in the fallback variant (`Unknown`, or
//! `UnknownValue` when the model already uses `Unknown`).

use std::collections::BTreeMap;

use quote::quote;
use shapegen_core::{escape_ident, to_pascal_case};

use crate::model::{EnumValue, Shape, ShapeKind};

use super::errors::CodegenError;
use super::names::{self, ident};
use super::writer::{CrateWriter, RustModule};
use super::{CodegenCtx, doc_attrs};

/// Variant name for one enum entry.
pub fn enum_variant_name(value: &EnumValue) -> String {
    escape_ident(&to_pascal_case(value.name.as_deref().unwrap_or(&value.value)))
}

/// Name of the fallback variant for `values`.
pub fn fallback_variant_name(values: &[EnumValue]) -> &'static str {
    if values.iter().any(|value| enum_variant_name(value) == "Unknown") {
        "UnknownValue"
    } else {
        "Unknown"
    }
}

pub fn generate_enum(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, shape: &Shape) -> Result<(), CodegenError> {
    let ShapeKind::Enum(values) = &shape.kind else {
        return Ok(());
    };
    let type_name = names::type_name(shape);
    writer.declare(RustModule::Model, &type_name, &shape.id)?;
    tracing::debug!(shape = %shape.id, values = values.len(), "generating enum");

    let name = ident(&type_name, &shape.id)?;
    let meta = ctx.protocol.configurator().container_meta(shape).tokens();
    let docs = doc_attrs(shape.traits.documentation.as_deref());
    let fallback = ident(fallback_variant_name(values), &shape.id)?;

    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut variants = Vec::new();
    let mut from_arms = Vec::new();
    let mut as_str_arms = Vec::new();
    for value in values {
        let variant_name = enum_variant_name(value);
        if let Some(first) = seen.insert(variant_name.clone(), value.value.as_str()) {
            return Err(CodegenError::NameCollision {
                module: RustModule::Model.name(),
                name: format!("{type_name}::{variant_name}"),
                first: shape.id.with_member(first),
                second: shape.id.with_member(value.value.clone()),
            });
        }
        let variant = ident(&variant_name, &shape.id)?;
        let wire = &value.value;
        let variant_docs = doc_attrs(value.documentation.as_deref());
        variants.push(quote!(#variant_docs #variant,));
        from_arms.push(quote!(#wire => #name::#variant,));
        as_str_arms.push(quote!(#name::#variant => #wire,));
    }
    let wire_values = values.iter().map(|value| &value.value);
    let enum_items = ctx.protocol.configurator().enum_items(ctx, shape);

    writer.push(
        RustModule::Model,
        quote! {
            #docs
            #meta
            pub enum #name {
                #(#variants)*
                /// A value this version of the client does not know about.
                #fallback(::std::string::String),
            }

            impl ::std::convert::From<&str> for #name {
                fn from(s: &str) -> Self {
                    match s {
                        #(#from_arms)*
                        other => #name::#fallback(::std::string::String::from(other)),
                    }
                }
            }

            impl ::std::str::FromStr for #name {
                type Err = ::std::convert::Infallible;

                fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                    ::std::result::Result::Ok(#name::from(s))
                }
            }

            impl #name {
                /// The wire value.
                pub fn as_str(&self) -> &str {
                    match self {
                        #(#as_str_arms)*
                        #name::#fallback(value) => value.as_str(),
                    }
                }

                /// Every modeled wire value.
                pub fn values() -> &'static [&'static str] {
                    &[#(#wire_values),*]
                }
            }

            impl ::std::convert::AsRef<str> for #name {
                fn as_ref(&self) -> &str {
                    self.as_str()
                }
            }

            #enum_items
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_prefer_the_symbolic_name() {
        let mut value = EnumValue::new("us-east-1");
        assert_eq!(enum_variant_name(&value), "UsEast1");
        value.name = Some("US_EAST".into());
        assert_eq!(enum_variant_name(&value), "UsEast");
    }

    #[test]
    fn fallback_avoids_modeled_unknown() {
        assert_eq!(fallback_variant_name(&[EnumValue::new("a")]), "Unknown");
        assert_eq!(fallback_variant_name(&[EnumValue::new("UNKNOWN")]), "UnknownValue");
    }
}
