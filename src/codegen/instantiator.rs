//! Rust expressions that construct a model value from its JSON form.
//!
//! Protocol test cases give inputs and expected outputs as JSON `params`; [`Instantiator::render`] turns such a
//! value into an expression of the shape's generated type, building structures through their builders.
//!
//! ## Notes
//!
//! - Structure members that are absent or `null` are left unset.
//! - Blobs and streams are given as text and become its UTF-8 bytes; timestamps are epoch seconds.
//! - Floats accept the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use serde_json::Value;

use crate::model::{MemberShape, Shape, ShapeKind};

use super::builder::{self, default_value_tokens};
use super::errors::CodegenError;
use super::names::{self, ident};
use super::runtime::LogicalType;
use super::symbol::RustType;
use super::CodegenCtx;

pub struct Instantiator<'c, 'a> {
    ctx: &'c CodegenCtx<'a>,
    /// Protocol test case id, for error messages.
    case: &'c str,
}

impl<'c, 'a> Instantiator<'c, 'a> {
    pub fn new(ctx: &'c CodegenCtx<'a>, case: &'c str) -> Self {
        Instantiator { ctx, case }
    }

    fn invalid(&self, shape: &Shape, message: impl Into<String>) -> CodegenError {
        CodegenError::InvalidTestParams {
            case: self.case.to_string(),
            shape: shape.id.clone(),
            message: message.into(),
        }
    }

    /// An expression of `shape`'s own (unwrapped) type.
    pub fn render(&self, shape: &Shape, value: &Value) -> Result<TokenStream, CodegenError> {
        let symbol = self.ctx.symbols.resolve(shape)?;
        match &shape.kind {
            ShapeKind::Boolean
            | ShapeKind::Byte
            | ShapeKind::Short
            | ShapeKind::Integer
            | ShapeKind::Long
            | ShapeKind::String
            | ShapeKind::Enum(_) => self.scalar(shape, &symbol.rust_type, value),
            ShapeKind::Float | ShapeKind::Double => self.float(shape, &symbol.rust_type, value),
            ShapeKind::Timestamp => {
                let instant = self.ctx.runtime.path(LogicalType::Instant);
                match value {
                    Value::Number(n) if n.is_i64() => {
                        let seconds = default_value_tokens(&RustType::I64, value);
                        Ok(quote!(#instant::from_epoch_seconds(#seconds)))
                    }
                    Value::Number(_) => {
                        let seconds = default_value_tokens(&RustType::F64, value);
                        Ok(quote!(#instant::from_f64(#seconds)))
                    }
                    _ => Err(self.invalid(shape, "timestamps are given as epoch seconds")),
                }
            }
            ShapeKind::Blob => {
                let text = self.text(shape, value)?;
                let blob = self.ctx.runtime.path(LogicalType::Blob);
                Ok(quote!(#blob::new(#text)))
            }
            ShapeKind::Document => Ok(self.document(value)),
            ShapeKind::List(element) | ShapeKind::Set(element) => {
                let Value::Array(items) = value else {
                    return Err(self.invalid(shape, "expected an array"));
                };
                let items = items
                    .iter()
                    .map(|item| self.member_value(shape, element, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match symbol.rust_type {
                    RustType::HashSet(_) => quote!(::std::collections::HashSet::from([#(#items),*])),
                    _ => quote!(::std::vec![#(#items),*]),
                })
            }
            ShapeKind::Map { value: value_member, .. } => {
                let Value::Object(entries) = value else {
                    return Err(self.invalid(shape, "expected an object"));
                };
                let mut inserts = Vec::new();
                for (key, entry) in entries {
                    let entry = self.member_value(shape, value_member, entry)?;
                    inserts.push(quote!(entries.insert(::std::string::String::from(#key), #entry);));
                }
                Ok(quote! {
                    {
                        let mut entries = ::std::collections::HashMap::new();
                        #(#inserts)*
                        entries
                    }
                })
            }
            ShapeKind::Structure(_) => self.structure(shape, value),
            ShapeKind::Union(_) => {
                let ty = symbol.tokens();
                let (name, inner) = match value {
                    Value::Object(entries) if entries.len() == 1 => entries
                        .iter()
                        .next()
                        .ok_or_else(|| self.invalid(shape, "a union value names exactly one member"))?,
                    _ => return Err(self.invalid(shape, "a union value names exactly one member")),
                };
                let member = shape
                    .member(name)
                    .ok_or_else(|| self.invalid(shape, format!("unknown member `{name}`")))?;
                let variant = ident(&names::variant_name(member), &shape.id)?;
                let inner = self.member_value(shape, member, inner)?;
                Ok(quote!(#ty::#variant(#inner)))
            }
            ShapeKind::Operation(_) | ShapeKind::Service(_) => {
                Err(self.invalid(shape, "operations and services have no values"))
            }
        }
    }

    /// A value for `member` as stored in `container`: boxed when the member is, never wrapped in `Option`.
    fn member_value(&self, container: &Shape, member: &MemberShape, value: &Value) -> Result<TokenStream, CodegenError> {
        let target = self.ctx.symbols.shape(&member.target)?;
        if self.ctx.symbols.is_streaming(member)? {
            let text = self.text(target, value)?;
            let stream = self.ctx.runtime.path(LogicalType::ByteStream);
            return Ok(quote!(#stream::new(#text)));
        }
        let rendered = self.render(target, value)?;
        let ty = self.ctx.symbols.resolve_member(container, member)?.rust_type;
        Ok(if ty.is_box() {
            quote!(::std::boxed::Box::new(#rendered))
        } else {
            rendered
        })
    }

    fn structure(&self, shape: &Shape, value: &Value) -> Result<TokenStream, CodegenError> {
        let Value::Object(entries) = value else {
            return Err(self.invalid(shape, "expected an object"));
        };
        let ty = self.ctx.symbols.resolve(shape)?.tokens();
        let mut setters = Vec::new();
        for (name, entry) in entries {
            if entry.is_null() {
                continue;
            }
            let member = shape
                .member(name)
                .ok_or_else(|| self.invalid(shape, format!("unknown member `{name}`")))?;
            let setter = format_ident!("set_{}", names::field_name(member).trim_start_matches("r#"));
            let target = self.ctx.symbols.shape(&member.target)?;
            // Builder fields hold the core type; boxing happens in `build`.
            let core = if self.ctx.symbols.is_streaming(member)? {
                self.member_value(shape, member, entry)?
            } else {
                self.render(target, entry)?
            };
            setters.push(quote!(.#setter(::std::option::Option::Some(#core))));
        }
        let finish = if builder::is_fallible(self.ctx, shape)? {
            let message = format!("{} is complete", names::type_name(shape));
            quote!(.build().expect(#message))
        } else {
            quote!(.build())
        };
        Ok(quote!(#ty::builder() #(#setters)* #finish))
    }

    fn scalar(&self, shape: &Shape, ty: &RustType, value: &Value) -> Result<TokenStream, CodegenError> {
        let compatible = match (&shape.kind, value) {
            (ShapeKind::Boolean, Value::Bool(_)) => true,
            (ShapeKind::Byte | ShapeKind::Short | ShapeKind::Integer | ShapeKind::Long, Value::Number(n)) => n.is_i64(),
            (ShapeKind::String | ShapeKind::Enum(_), Value::String(_)) => true,
            _ => false,
        };
        if !compatible {
            return Err(self.invalid(shape, format!("`{value}` is not a {}", shape.kind_name())));
        }
        Ok(default_value_tokens(ty, value))
    }

    fn float(&self, shape: &Shape, ty: &RustType, value: &Value) -> Result<TokenStream, CodegenError> {
        let primitive = if matches!(ty, RustType::F32) {
            quote!(f32)
        } else {
            quote!(f64)
        };
        match value {
            Value::Number(_) => Ok(default_value_tokens(ty, value)),
            Value::String(text) if text == "NaN" => Ok(quote!(::std::primitive::#primitive::NAN)),
            Value::String(text) if text == "Infinity" => Ok(quote!(::std::primitive::#primitive::INFINITY)),
            Value::String(text) if text == "-Infinity" => Ok(quote!(::std::primitive::#primitive::NEG_INFINITY)),
            _ => Err(self.invalid(shape, format!("`{value}` is not a {}", shape.kind_name()))),
        }
    }

    fn text<'v>(&self, shape: &Shape, value: &'v Value) -> Result<&'v str, CodegenError> {
        value
            .as_str()
            .ok_or_else(|| self.invalid(shape, "binary values are given as text"))
    }

    fn document(&self, value: &Value) -> TokenStream {
        let document = self.ctx.runtime.path(LogicalType::Document);
        match value {
            Value::Null => quote!(#document::Null),
            Value::Bool(flag) => quote!(#document::Bool(#flag)),
            Value::Number(n) => {
                let number = self.ctx.runtime.path(LogicalType::DocumentNumber);
                if let Some(v) = n.as_u64() {
                    quote!(#document::Number(#number::PosInt(#v)))
                } else if n.is_i64() {
                    let v = default_value_tokens(&RustType::I64, value);
                    quote!(#document::Number(#number::NegInt(#v)))
                } else {
                    let v = default_value_tokens(&RustType::F64, value);
                    quote!(#document::Number(#number::Float(#v)))
                }
            }
            Value::String(text) => quote!(#document::String(::std::string::String::from(#text))),
            Value::Array(items) => {
                let items = items.iter().map(|item| self.document(item));
                quote!(#document::Array(::std::vec![#(#items),*]))
            }
            Value::Object(entries) => {
                let inserts = entries.iter().map(|(key, entry)| {
                    let entry = self.document(entry);
                    quote!(entries.insert(::std::string::String::from(#key), #entry);)
                });
                quote! {
                    #document::Object({
                        let mut entries = ::std::collections::HashMap::new();
                        #(#inserts)*
                        entries
                    })
                }
            }
        }
    }
}
