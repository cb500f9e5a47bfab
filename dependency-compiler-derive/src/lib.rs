//! Derive macro for dependency-compiler
//!
//! `#[derive(Inject)]` produces, at build time, both the class definition the
//! resolver plans from (`Describe`) and the constructor generated factories
//! and the injector call (`Constructible`).
//!
//! ```rust,ignore
//! use dependency_compiler::{Inject, DefinitionStore};
//! use std::sync::Arc;
//!
//! struct Database;
//! struct Cache;
//!
//! #[derive(Inject)]
//! struct UserService {
//!     #[inject]
//!     db: Arc<Database>,
//!     #[inject(optional)]
//!     cache: Option<Arc<Cache>>,
//!     #[inject(value)]
//!     region: String,
//!     #[inject(default = 50)]
//!     page_size: u32,
//!     // Not injected: Default::default()
//!     requests: u64,
//! }
//!
//! let mut store = DefinitionStore::new();
//! store.describe::<UserService>();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Lit, Type, parse_macro_input};

/// Derive `Describe` and `Constructible` for a struct with named fields.
///
/// # Attributes
///
/// - `#[inject]` - typed required dependency. The field must be `Arc<T>`.
/// - `#[inject(optional)]` - typed optional dependency. The field must be
///   `Option<Arc<T>>`.
/// - `#[inject(value)]` - required untyped parameter, converted with
///   `FromValue`.
/// - `#[inject(default = <literal>)]` - untyped parameter with a default.
///
/// Fields without `#[inject]` are not constructor parameters and use
/// `Default::default()`.
///
/// Class and dependency identifiers are `std::any::type_name` of the types.
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// How a field is supplied
enum InjectAttr {
    Required,
    Optional,
    Value,
    Default(Lit),
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Inject can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Inject can only be derived for structs",
            ));
        }
    };

    let mut parameters = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let parameter = field_name.to_string().trim_start_matches("r#").to_owned();

        let Some(attr) = find_inject_attr(&field.attrs)? else {
            field_inits.push(quote! {
                #field_name: ::std::default::Default::default()
            });
            continue;
        };

        let info = match attr {
            InjectAttr::Required => {
                let inner = extract_arc_inner_type(field_type).ok_or_else(|| {
                    syn::Error::new_spanned(field_type, "Fields marked with #[inject] must have type Arc<T>")
                })?;
                quote! {
                    ::dependency_compiler::ParameterInfo::new()
                        .with_type(::std::any::type_name::<#inner>())
                        .required()
                }
            }
            InjectAttr::Optional => {
                let inner = extract_option_arc_inner_type(field_type).ok_or_else(|| {
                    syn::Error::new_spanned(
                        field_type,
                        "Fields marked with #[inject(optional)] must have type Option<Arc<T>>",
                    )
                })?;
                quote! {
                    ::dependency_compiler::ParameterInfo::new()
                        .with_type(::std::any::type_name::<#inner>())
                        .optional()
                }
            }
            InjectAttr::Value => quote! {
                ::dependency_compiler::ParameterInfo::new().required()
            },
            InjectAttr::Default(lit) => {
                let value = literal_value(&lit)?;
                quote! {
                    ::dependency_compiler::ParameterInfo::new().optional().with_default(#value)
                }
            }
        };

        parameters.push(quote! {
            definition.add_method_parameter(::dependency_compiler::CONSTRUCTOR, #parameter, #info);
        });
        field_inits.push(quote! {
            #field_name: arguments.take::<#field_type>(#parameter)?
        });
    }

    // Arguments are only read when at least one field is injected
    let arguments_binding = if parameters.is_empty() {
        quote! { _arguments }
    } else {
        quote! { mut arguments }
    };

    Ok(quote! {
        impl #impl_generics ::dependency_compiler::Describe for #name #ty_generics #where_clause {
            fn definition() -> ::dependency_compiler::ClassDefinition {
                let mut definition =
                    ::dependency_compiler::ClassDefinition::new(::std::any::type_name::<Self>());
                definition.add_method(::dependency_compiler::CONSTRUCTOR, ::std::option::Option::None);
                #(#parameters)*
                definition
            }
        }

        impl #impl_generics ::dependency_compiler::Constructible for #name #ty_generics #where_clause {
            fn construct(
                #arguments_binding: ::dependency_compiler::Arguments,
            ) -> ::dependency_compiler::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #(#field_inits),*
                })
            }
        }
    })
}

fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<InjectAttr>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    if attr.meta.require_path_only().is_ok() {
        return Ok(Some(InjectAttr::Required));
    }

    let mut parsed = None;
    attr.parse_nested_meta(|meta| {
        if parsed.is_some() {
            return Err(meta.error("only one inject option may be given"));
        }
        if meta.path.is_ident("optional") {
            parsed = Some(InjectAttr::Optional);
        } else if meta.path.is_ident("value") {
            parsed = Some(InjectAttr::Value);
        } else if meta.path.is_ident("default") {
            parsed = Some(InjectAttr::Default(meta.value()?.parse()?));
        } else {
            return Err(meta.error("expected `optional`, `value` or `default = <literal>`"));
        }
        Ok(())
    })?;

    Ok(Some(parsed.unwrap_or(InjectAttr::Required)))
}

/// `Value` expression for a default literal
fn literal_value(lit: &Lit) -> syn::Result<TokenStream2> {
    match lit {
        Lit::Str(_) => Ok(quote! { ::dependency_compiler::Value::from(#lit) }),
        Lit::Int(int) => {
            let value: i64 = int.base10_parse()?;
            Ok(quote! { ::dependency_compiler::Value::Int(#value) })
        }
        Lit::Float(float) => {
            let value: f64 = float.base10_parse()?;
            Ok(quote! { ::dependency_compiler::Value::Float(#value) })
        }
        Lit::Bool(_) => Ok(quote! { ::dependency_compiler::Value::Bool(#lit) }),
        _ => Err(syn::Error::new_spanned(
            lit,
            "default must be a string, integer, float or bool literal",
        )),
    }
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument(ty, "Arc")
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument(ty, "Option").and_then(extract_arc_inner_type)
}

fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
