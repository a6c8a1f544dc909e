//! Structure definitions.

use quote::quote;

use crate::model::Shape;

use super::errors::CodegenError;
use super::names::{self, ident};
use super::writer::{CrateWriter, RustModule};
use super::{CodegenCtx, builder, doc_attrs, errors_gen};

/// Emit `shape`'s struct and builder, plus error impls or `to_body` where they apply.
///
/// Synthetic body shapes get no builder.
pub fn generate_structure(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, shape: &Shape) -> Result<(), CodegenError> {
    let symbol = ctx.symbols.resolve(shape)?;
    let module = RustModule::for_location(symbol.location);
    let type_name = names::type_name(shape);
    writer.declare(module, &type_name, &shape.id)?;
    tracing::debug!(shape = %shape.id, module = module.name(), "generating structure");

    let name = ident(&type_name, &shape.id)?;
    let configurator = ctx.protocol.configurator();
    let mut meta = configurator.container_meta(shape);
    if shape.traits.synthetic_body.is_some() {
        meta = meta.attribute(quote!(#[doc(hidden)]));
    }
    let meta = meta.tokens();
    let docs = doc_attrs(shape.traits.documentation.as_deref());

    let mut fields = Vec::new();
    for member in shape.members() {
        let member_symbol = ctx.symbols.resolve_member(shape, member)?;
        for dependency in &member_symbol.dependencies {
            writer.add_dependency(dependency.clone());
        }
        let field = ident(&names::field_name(member), &shape.id)?;
        let ty = member_symbol.tokens();
        let member_meta = configurator.member_meta(ctx, writer, shape, member)?.tokens();
        let member_docs = doc_attrs(member.traits.documentation.as_deref());
        fields.push(quote! {
            #member_docs
            #member_meta
            pub #field: #ty,
        });
    }

    writer.push(
        module,
        quote! {
            #docs
            #meta
            pub struct #name {
                #(#fields)*
            }
        },
    );

    if shape.traits.synthetic_body.is_none() {
        builder::generate_builder(ctx, writer, shape, module)?;
    }
    if shape.is_error() {
        errors_gen::generate_error_impls(ctx, writer, shape)?;
    }
    if let Some(body) = shape.traits.synthetic_input.as_ref().and_then(|marker| marker.body.as_ref()) {
        generate_to_body(ctx, writer, shape, ctx.symbols.shape(body)?)?;
    }
    Ok(())
}

/// `Input::to_body`, copying the body members out of a synthetic input.
fn generate_to_body(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    input: &Shape,
    body: &Shape,
) -> Result<(), CodegenError> {
    let input_symbol = ctx.symbols.resolve(input)?;
    let input_name = ident(&names::type_name(input), &input.id)?;
    let body_ty = ctx.symbols.resolve(body)?.tokens();
    let fields = body
        .members()
        .into_iter()
        .map(|member| ident(&names::field_name(member), &body.id))
        .collect::<Result<Vec<_>, _>>()?;
    writer.push(
        RustModule::for_location(input_symbol.location),
        quote! {
            impl #input_name {
                pub(crate) fn to_body(&self) -> #body_ty {
                    #body_ty {
                        #(#fields: self.#fields.clone(),)*
                    }
                }
            }
        },
    );
    Ok(())
}
