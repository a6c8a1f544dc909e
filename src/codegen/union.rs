//! Tagged unions: one variant per member, sorted by member name.

use quote::{format_ident, quote};

use crate::model::{MemberShape, Shape};

use super::errors::CodegenError;
use super::names::{self, ident};
use super::writer::{CrateWriter, RustModule};
use super::{CodegenCtx, doc_attrs};

pub fn generate_union(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, shape: &Shape) -> Result<(), CodegenError> {
    let type_name = names::type_name(shape);
    writer.declare(RustModule::Model, &type_name, &shape.id)?;
    tracing::debug!(shape = %shape.id, "generating union");
    let name = ident(&type_name, &shape.id)?;
    let configurator = ctx.protocol.configurator();
    let meta = configurator.container_meta(shape).tokens();
    let docs = doc_attrs(shape.traits.documentation.as_deref());

    let mut members: Vec<&MemberShape> = shape.members();
    members.sort_by(|a, b| a.name.cmp(&b.name));

    let mut variants = Vec::new();
    let mut accessors = Vec::new();
    for member in members {
        let symbol = ctx.symbols.resolve_member(shape, member)?;
        for dependency in &symbol.dependencies {
            writer.add_dependency(dependency.clone());
        }
        let ty = symbol.tokens();
        let variant = ident(&names::variant_name(member), &shape.id)?;
        let member_meta = configurator.member_meta(ctx, writer, shape, member)?.tokens();
        let member_docs = doc_attrs(member.traits.documentation.as_deref());
        variants.push(quote! {
            #member_docs
            #member_meta
            #variant(#ty),
        });

        let fragment = names::snake_fragment(&member.name);
        let as_fn = format_ident!("as_{}", fragment);
        let is_fn = format_ident!("is_{}", fragment);
        let as_doc = format!(" The [`{variant}`](Self::{variant}) value, or `Err(self)` for any other variant.");
        accessors.push(quote! {
            #[doc = #as_doc]
            pub fn #as_fn(&self) -> ::std::result::Result<&#ty, &Self> {
                if let Self::#variant(value) = self {
                    ::std::result::Result::Ok(value)
                } else {
                    ::std::result::Result::Err(self)
                }
            }

            pub fn #is_fn(&self) -> bool {
                self.#as_fn().is_ok()
            }
        });
    }

    writer.push(
        RustModule::Model,
        quote! {
            #docs
            #meta
            pub enum #name {
                #(#variants)*
            }

            impl #name {
                #(#accessors)*
            }
        },
    );
    Ok(())
}
