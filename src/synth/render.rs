//! Rust source rendering
//!
//! Turns a [`Synthesis`] into a Rust module: one type per declaration and a
//! `FromValue` impl that builds it from a parse value. The output is built
//! with `quote` and printed without formatting; run it through `rustfmt` or
//! `prettyplease` for a readable listing.
//!
//! Generated constructors make the same decisions as the dynamic builder in
//! [`super::build`], so both produce the same tree for the same input.

use super::model::{Build, Expr, RustType, Synthesis, TypeDecl, TypeRef, TypeShape};
use super::naming::sanitize;
use crate::config::GeneratorConfig;
use crate::logging::log_debug;
use crate::runtime::Repetition;
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::quote;

/// First line of every generated module
pub const GENERATED_HEADER: &str = "// @generated by gllgen. Do not edit.";

/// Render the types and constructors of `synthesis` as Rust source
///
/// Identical inputs produce byte-identical output.
pub fn render_rust(synthesis: &Synthesis, config: &GeneratorConfig) -> String {
    let renderer = Renderer::new(config);
    let runtime = &renderer.runtime;

    let mut items = vec![quote! {
        #[allow(unused_imports)]
        use #runtime::{BuildError, FromValue, Repetition, Value};
    }
    .to_string()];
    for decl in &synthesis.decls {
        items.push(renderer.decl(decl).to_string());
    }

    log_debug!("Rendered {} declarations", synthesis.decls.len());
    format!("{}\n\n{}\n", GENERATED_HEADER, items.join("\n\n"))
}

/// `a::b` or `::a::b` as a path
fn path_tokens(path: &str) -> TokenStream {
    let segments = path
        .split("::")
        .filter(|segment| !segment.is_empty())
        .map(ident);
    if path.starts_with("::") {
        quote!(#(:: #segments)*)
    } else {
        quote!(#(#segments)::*)
    }
}

fn ident(name: &str) -> Ident {
    Ident::new(&sanitize(name.trim()), Span::call_site())
}

fn index(i: usize) -> Literal {
    Literal::usize_unsuffixed(i)
}

struct Renderer {
    runtime: TokenStream,
    builtins: TokenStream,
    derives: Vec<TokenStream>,
}

impl Renderer {
    fn new(config: &GeneratorConfig) -> Self {
        Self {
            runtime: path_tokens(&config.runtime_path),
            builtins: path_tokens(&config.builtins_path),
            derives: config.derives.iter().map(|d| path_tokens(d)).collect(),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn type_ref(&self, ty: &TypeRef) -> TokenStream {
        match ty {
            TypeRef::Local(name) => {
                let name = ident(name);
                quote!(#name)
            }
            TypeRef::Builtin(name) => {
                let builtins = &self.builtins;
                let name = ident(name);
                quote!(#builtins::#name)
            }
        }
    }

    fn rust_type(&self, ty: &RustType) -> TokenStream {
        match ty {
            RustType::Unit => quote!(()),
            RustType::Bool => quote!(bool),
            RustType::String => quote!(String),
            RustType::Named { ty, boxed: true } => {
                let ty = self.type_ref(ty);
                quote!(Box<#ty>)
            }
            RustType::Named { ty, boxed: false } => self.type_ref(ty),
            RustType::Option(inner) => {
                let inner = self.rust_type(inner);
                quote!(Option<#inner>)
            }
            RustType::Vec(item) => {
                let item = self.rust_type(item);
                quote!(Vec<#item>)
            }
        }
    }

    // ========================================================================
    // Expressions (`value: &Value` in scope)
    // ========================================================================

    fn expr(&self, expr: &Expr) -> TokenStream {
        match expr {
            Expr::Unit => quote!({
                let _ = value;
            }),
            Expr::Text => quote!(value.text()?),
            Expr::Presence => quote!(value.present()),
            Expr::Call { ty, boxed } => {
                let ty = self.type_ref(ty);
                if *boxed {
                    quote!(Box::new(<#ty as FromValue>::from_value(value)?))
                } else {
                    quote!(<#ty as FromValue>::from_value(value)?)
                }
            }
            Expr::Capture { label, inner } => {
                let inner = self.expr(inner);
                quote!({
                    let value = value.capture(#label)?;
                    #inner
                })
            }
            Expr::Optional(inner) => {
                let inner = self.expr(inner);
                quote! {
                    match value.optional() {
                        Some(value) => Some(#inner),
                        None => None,
                    }
                }
            }
            Expr::List { item, layout } => {
                let ty = self.rust_type(&item.rust_type());
                let item = self.expr(item);
                let layout = match layout {
                    Repetition::Plain => quote!(Plain),
                    Repetition::Joined => quote!(Joined),
                    Repetition::Trailing => quote!(Trailing),
                    Repetition::TrailingPositive => quote!(TrailingPositive),
                };
                quote! {
                    value
                        .repeated(Repetition::#layout)?
                        .into_iter()
                        .map(|value| -> Result<#ty, BuildError> { Ok(#item) })
                        .collect::<Result<Vec<_>, BuildError>>()?
                }
            }
        }
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn decl(&self, decl: &TypeDecl) -> TokenStream {
        let name = ident(&decl.name);
        let derives = &self.derives;
        let doc = decl.rule.as_ref().map(|rule| {
            let text = format!(" Rule `{}`", rule);
            quote!(#[doc = #text])
        });
        let attrs = quote! {
            #doc
            #[derive(#(#derives),*)]
        };

        let item = match &decl.shape {
            TypeShape::Alias { target } => {
                let target = self.type_ref(target);
                return quote! {
                    #doc
                    pub type #name = #target;
                };
            }
            TypeShape::Unit => quote!(#attrs pub struct #name;),
            TypeShape::Record { fields } => {
                let fields = fields.iter().map(|field| {
                    let name = ident(&field.name);
                    let ty = self.rust_type(&field.ty);
                    quote!(pub #name: #ty)
                });
                quote!(#attrs pub struct #name { #(#fields),* })
            }
            TypeShape::Union { variants } => {
                let variants = variants.iter().map(|variant| {
                    let name = ident(&variant.name);
                    match &variant.payload {
                        Some(ty) => {
                            let ty = self.rust_type(ty);
                            quote!(#name(#ty))
                        }
                        None => quote!(#name),
                    }
                });
                quote!(#attrs pub enum #name { #(#variants),* })
            }
            TypeShape::Enum { tags } => {
                let tags = tags.iter().map(|tag| ident(tag));
                quote!(#attrs pub enum #name { #(#tags),* })
            }
            shape => match shape.single_field() {
                Some((Some(field), ty)) => {
                    let field = ident(field);
                    let ty = self.rust_type(&ty);
                    quote!(#attrs pub struct #name { pub #field: #ty })
                }
                Some((None, ty)) => {
                    let ty = self.rust_type(&ty);
                    quote!(#attrs pub struct #name(pub #ty);)
                }
                None => quote!(#attrs pub struct #name;),
            },
        };

        let capture = decl.constructor.capture.as_ref().map(|label| {
            quote!(let value = value.capture(#label)?;)
        });
        let body = self.constructor(decl);

        quote! {
            #item

            impl FromValue for #name {
                fn from_value(value: &Value) -> Result<Self, BuildError> {
                    #capture
                    #body
                }
            }
        }
    }

    fn constructor(&self, decl: &TypeDecl) -> TokenStream {
        let no_variant = {
            let ty = &decl.name;
            quote!(Err(BuildError::NoVariant { ty: #ty.to_string() }))
        };

        match (&decl.constructor.build, &decl.shape) {
            (Build::Unit, _) | (Build::Alias(_), _) => quote! {
                let _ = value;
                Ok(Self)
            },
            (Build::Field(expr), shape) => {
                let expr = self.expr(expr);
                match shape.single_field() {
                    Some((Some(field), _)) => {
                        let field = ident(field);
                        quote!(Ok(Self { #field: #expr }))
                    }
                    _ => quote!(Ok(Self(#expr))),
                }
            }
            (Build::Fields(exprs), TypeShape::Record { fields }) => {
                let count = index(exprs.len());
                let inits = fields.iter().zip(exprs).enumerate().map(|(i, (field, expr))| {
                    let name = ident(&field.name);
                    let i = index(i);
                    let expr = self.expr(expr);
                    quote! {
                        #name: {
                            let value = &values[#i];
                            #expr
                        }
                    }
                });
                quote! {
                    let values = value.fields(#count)?;
                    Ok(Self { #(#inits),* })
                }
            }
            (Build::Variants(builds), TypeShape::Union { variants }) => {
                let mut keys = Vec::with_capacity(builds.len());
                let mut arms = Vec::with_capacity(builds.len());
                for (variant, build) in variants.iter().zip(builds) {
                    // A repeated key selects its first variant
                    if keys.contains(&&build.key) {
                        continue;
                    }
                    keys.push(&build.key);
                    let name = ident(&variant.name);
                    let key = &build.key;
                    arms.push(match &build.payload {
                        Some(expr) => {
                            let expr = self.expr(expr);
                            quote!(Some((#key, value)) => Ok(Self::#name(#expr)),)
                        }
                        None => quote!(Some((#key, _)) => Ok(Self::#name),),
                    });
                }
                quote! {
                    match value.variant() {
                        #(#arms)*
                        _ => #no_variant,
                    }
                }
            }
            (Build::Tags(labels), TypeShape::Enum { tags }) => {
                let arms = labels.iter().zip(tags).map(|(label, tag)| {
                    let tag = ident(tag);
                    quote!(Some((#label, _)) => Ok(Self::#tag),)
                });
                quote! {
                    match value.variant() {
                        #(#arms)*
                        _ => #no_variant,
                    }
                }
            }
            _ => no_variant,
        }
    }
}
