//! Companion builders.
//!
//! Every builder field is `Option<Core>`, where `Core` is the member type without its `Option`/`Box` wrappers.
//! `build` is fallible exactly when some member is required and has no usable default. Streaming members fall
//! back to an empty stream.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use serde_json::Value;

use crate::model::Shape;

use super::errors::CodegenError;
use super::names::{self, ident};
use super::runtime::LogicalType;
use super::symbol::RustType;
use super::writer::{CrateWriter, RustModule};
use super::CodegenCtx;

/// How `build` fills one field.
enum FieldInit {
    Optional,
    Default(TokenStream),
    Required,
}

/// `true` when building `shape` can fail.
pub fn is_fallible(ctx: &CodegenCtx<'_>, shape: &Shape) -> Result<bool, CodegenError> {
    for member in shape.members() {
        let unset = ctx.symbols.usable_default(member)?.is_none() && !ctx.symbols.is_streaming(member)?;
        if member.traits.required && unset {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn generate_builder(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
    module: RustModule,
) -> Result<(), CodegenError> {
    let symbol = ctx.symbols.resolve(shape)?;
    let struct_path = symbol.tokens();
    let Some(builder_path) = symbol.rust_type.builder_path() else {
        return Ok(());
    };
    let type_name = names::type_name(shape);
    let builder_module = ident(&names::snake_name(&type_name), &shape.id)?;
    let build_error = ctx.runtime.path(LogicalType::BuildError);

    let mut fields = Vec::new();
    let mut setters = Vec::new();
    let mut inits = Vec::new();
    for member in shape.members() {
        let member_symbol = ctx.symbols.resolve_member(shape, member)?;
        let ty = &member_symbol.rust_type;
        let core = ty.core();
        let core_tokens = core.tokens();
        let field_name = names::field_name(member);
        let bare = field_name.trim_start_matches("r#");
        let field = ident(&field_name, &shape.id)?;
        let set_field = format_ident!("set_{}", bare);

        fields.push(quote!(pub(crate) #field: ::std::option::Option<#core_tokens>,));
        setters.push(additive_setter(&field, core));
        setters.push(quote! {
            pub fn #set_field(mut self, input: ::std::option::Option<#core_tokens>) -> Self {
                self.#field = input;
                self
            }
        });

        let init = if ty.is_option() || matches!(ty, RustType::Box(inner) if inner.is_option()) {
            FieldInit::Optional
        } else if let Some(default) = ctx.symbols.usable_default(member)? {
            FieldInit::Default(default_value_tokens(core, &default))
        } else if ctx.symbols.is_streaming(member)? {
            FieldInit::Default(quote!(::std::default::Default::default()))
        } else {
            FieldInit::Required
        };
        let value = match init {
            FieldInit::Optional => quote!(self.#field),
            FieldInit::Default(default) => quote!(self.#field.unwrap_or_else(|| #default)),
            FieldInit::Required => {
                let details = format!("{bare} was not specified but it is required when building {type_name}");
                quote! {
                    self.#field.ok_or_else(|| #build_error::MissingField {
                        field: #bare,
                        details: #details,
                    })?
                }
            }
        };
        let value = if ty.is_box() {
            quote!(::std::boxed::Box::new(#value))
        } else {
            value
        };
        inits.push(quote!(#field: #value,));
    }

    let build = if is_fallible(ctx, shape)? {
        quote! {
            /// Consume the builder, failing if a required field was not set.
            pub fn build(self) -> ::std::result::Result<#struct_path, #build_error> {
                ::std::result::Result::Ok(#struct_path {
                    #(#inits)*
                })
            }
        }
    } else {
        quote! {
            pub fn build(self) -> #struct_path {
                #struct_path {
                    #(#inits)*
                }
            }
        }
    };

    let doc = format!(" Builder for [`{type_name}`]({}).", struct_path.to_string().replace(' ', ""));
    let name = ident(&type_name, &shape.id)?;
    writer.push(
        module,
        quote! {
            #[doc = #doc]
            pub mod #builder_module {
                #[non_exhaustive]
                #[derive(Debug, Clone, PartialEq, Default)]
                pub struct Builder {
                    #(#fields)*
                }

                impl Builder {
                    #(#setters)*
                    #build
                }
            }

            impl #name {
                /// Start building a value field by field.
                pub fn builder() -> #builder_path {
                    <#builder_path as ::std::default::Default>::default()
                }
            }
        },
    );
    Ok(())
}

/// The per-member setter: replace for scalars and structures, append for `Vec`/`HashSet`, insert for maps.
fn additive_setter(field: &proc_macro2::Ident, core: &RustType) -> TokenStream {
    match core {
        RustType::Vec(element) => {
            let element = element.tokens();
            quote! {
                pub fn #field(mut self, input: impl ::std::convert::Into<#element>) -> Self {
                    let mut items = self.#field.unwrap_or_default();
                    items.push(input.into());
                    self.#field = ::std::option::Option::Some(items);
                    self
                }
            }
        }
        RustType::HashSet(element) => {
            let element = element.tokens();
            quote! {
                pub fn #field(mut self, input: impl ::std::convert::Into<#element>) -> Self {
                    let mut items = self.#field.unwrap_or_default();
                    items.insert(input.into());
                    self.#field = ::std::option::Option::Some(items);
                    self
                }
            }
        }
        RustType::HashMap(value) => {
            let value = value.tokens();
            quote! {
                pub fn #field(
                    mut self,
                    k: impl ::std::convert::Into<::std::string::String>,
                    v: impl ::std::convert::Into<#value>,
                ) -> Self {
                    let mut entries = self.#field.unwrap_or_default();
                    entries.insert(k.into(), v.into());
                    self.#field = ::std::option::Option::Some(entries);
                    self
                }
            }
        }
        other => {
            let ty = other.tokens();
            quote! {
                pub fn #field(mut self, input: impl ::std::convert::Into<#ty>) -> Self {
                    self.#field = ::std::option::Option::Some(input.into());
                    self
                }
            }
        }
    }
}

/// Expression producing a (compatible) default value of type `core`.
pub fn default_value_tokens(core: &RustType, value: &Value) -> TokenStream {
    match (core, value) {
        (RustType::Bool, Value::Bool(flag)) => quote!(#flag),
        (RustType::I8, Value::Number(n)) => int_literal(n.as_i64(), "i8"),
        (RustType::I16, Value::Number(n)) => int_literal(n.as_i64(), "i16"),
        (RustType::I32, Value::Number(n)) => int_literal(n.as_i64(), "i32"),
        (RustType::I64, Value::Number(n)) => int_literal(n.as_i64(), "i64"),
        (RustType::F32, Value::Number(n)) => {
            let value = n.as_f64().unwrap_or_default() as f32;
            if value.is_infinite() {
                return if value < 0.0 {
                    quote!(::std::primitive::f32::NEG_INFINITY)
                } else {
                    quote!(::std::primitive::f32::INFINITY)
                };
            }
            float_literal(format!("{:?}f32", value.abs()), value < 0.0)
        }
        (RustType::F64, Value::Number(n)) => {
            let value = n.as_f64().unwrap_or_default();
            float_literal(format!("{:?}f64", value.abs()), value < 0.0)
        }
        (RustType::String, Value::String(text)) => quote!(::std::string::String::from(#text)),
        (RustType::Generated { .. }, Value::String(text)) => {
            let ty = core.tokens();
            quote!(<#ty as ::std::convert::From<&str>>::from(#text))
        }
        (RustType::Vec(_), _) => quote!(::std::vec::Vec::new()),
        (RustType::HashSet(_), _) => quote!(::std::collections::HashSet::new()),
        (RustType::HashMap(_), _) => quote!(::std::collections::HashMap::new()),
        _ => quote!(::std::default::Default::default()),
    }
}

fn int_literal(value: Option<i64>, suffix: &str) -> TokenStream {
    let value = value.unwrap_or_default();
    let literal = syn::LitInt::new(&format!("{}{suffix}", value.unsigned_abs()), Span::call_site());
    if value < 0 { quote!(-#literal) } else { quote!(#literal) }
}

fn float_literal(text: String, negative: bool) -> TokenStream {
    let literal = syn::LitFloat::new(&text, Span::call_site());
    if negative { quote!(-#literal) } else { quote!(#literal) }
}
