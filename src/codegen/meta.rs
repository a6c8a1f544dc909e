//! Per-item attributes and the configurator hook that supplies them.
//!
//! Generators never decide serialization attributes themselves. They ask the protocol's [`Configurator`] for the
//! derives and attributes of each container and member, so a JSON protocol can add serde annotations while the
//! structure generator stays protocol-agnostic.

use proc_macro2::TokenStream;
use quote::quote;

use crate::model::{MemberShape, Shape, ShapeKind};

use super::CodegenCtx;
use super::errors::CodegenError;
use super::writer::CrateWriter;

/// Derives and outer attributes of one item.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub derives: Vec<TokenStream>,
    pub attributes: Vec<TokenStream>,
}

impl Meta {
    pub fn derive(mut self, derive: TokenStream) -> Self {
        self.derives.push(derive);
        self
    }

    pub fn attribute(mut self, attribute: TokenStream) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn extend(&mut self, other: Meta) {
        self.derives.extend(other.derives);
        self.attributes.extend(other.attributes);
    }

    pub fn tokens(&self) -> TokenStream {
        let derives = &self.derives;
        let attributes = &self.attributes;
        let derive = if derives.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#derives),*)])
        };
        quote! {
            #(#attributes)*
            #derive
        }
    }
}

pub trait Configurator {
    /// Derives and attributes for a structure, union or enum.
    fn container_meta(&self, shape: &Shape) -> Meta;

    /// Attributes for one field or variant.
    fn member_meta(
        &self,
        ctx: &CodegenCtx<'_>,
        writer: &mut CrateWriter,
        container: &Shape,
        member: &MemberShape,
    ) -> Result<Meta, CodegenError>;

    /// Extra items emitted next to an enum definition.
    fn enum_items(&self, ctx: &CodegenCtx<'_>, shape: &Shape) -> TokenStream;
}

/// Structural derives only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfigurator;

impl Configurator for DefaultConfigurator {
    fn container_meta(&self, shape: &Shape) -> Meta {
        match &shape.kind {
            ShapeKind::Enum(_) => Meta::default()
                .attribute(quote!(#[non_exhaustive]))
                .derive(quote!(Debug))
                .derive(quote!(Clone))
                .derive(quote!(PartialEq))
                .derive(quote!(Eq))
                .derive(quote!(PartialOrd))
                .derive(quote!(Ord))
                .derive(quote!(Hash)),
            ShapeKind::Union(_) => Meta::default()
                .derive(quote!(Debug))
                .derive(quote!(Clone))
                .derive(quote!(PartialEq)),
            _ => Meta::default()
                .attribute(quote!(#[non_exhaustive]))
                .derive(quote!(Debug))
                .derive(quote!(Clone))
                .derive(quote!(PartialEq)),
        }
    }

    fn member_meta(
        &self,
        _ctx: &CodegenCtx<'_>,
        _writer: &mut CrateWriter,
        _container: &Shape,
        _member: &MemberShape,
    ) -> Result<Meta, CodegenError> {
        Ok(Meta::default())
    }

    fn enum_items(&self, _ctx: &CodegenCtx<'_>, _shape: &Shape) -> TokenStream {
        quote!()
    }
}
