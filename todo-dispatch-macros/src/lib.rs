//! Procedural macros for todo-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Prefix for every tag, joined with `/`
    #[darling(default)]
    namespace: Option<String>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit tag override (still namespaced)
    #[darling(default)]
    tag: Option<String>,
}

/// Convert PascalCase to SCREAMING_SNAKE_CASE
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(ch.to_uppercase());
    }
    result
}

/// Build the full tag for a variant
fn variant_tag(namespace: Option<&str>, variant: &ActionVariant) -> String {
    let local = match &variant.tag {
        Some(tag) => tag.clone(),
        None => to_screaming_snake_case(&variant.ident.to_string()),
    };
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}/{}", ns, local),
        _ => local,
    }
}

/// Derive macro for the Action trait
///
/// Generates `name()` returning the variant name and `tag()` returning the
/// namespaced type tag. Both are string literals fixed at compile time.
///
/// - `#[action(namespace = "todos")]` on the enum prefixes every tag
/// - `#[action(tag = "TODOS_LOADING")]` on a variant replaces the generated
///   part of its tag
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(namespace = "todos")]
/// enum TodosAction {
///     ToggleCompleted(u64),
///     #[action(tag = "TODOS_LOADING")]
///     BeginLoad,
/// }
///
/// assert_eq!(TodosAction::BeginLoad.name(), "BeginLoad");
/// assert_eq!(TodosAction::BeginLoad.tag(), "todos/TODOS_LOADING");
/// assert_eq!(TodosAction::ToggleCompleted(1).tag(), "todos/TOGGLE_COMPLETED");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    // Try to parse with darling for attributes
    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let pattern = |v: &ActionVariant| {
        let variant_name = &v.ident;
        match &v.fields.style {
            darling::ast::Style::Unit => quote! { #name::#variant_name },
            darling::ast::Style::Tuple => quote! { #name::#variant_name(..) },
            darling::ast::Style::Struct => quote! { #name::#variant_name { .. } },
        }
    };

    let name_arms = variants.iter().map(|v| {
        let pat = pattern(v);
        let variant_str = v.ident.to_string();
        quote! { #pat => #variant_str }
    });

    let namespace = opts.namespace.as_deref();
    let tag_arms = variants.iter().map(|v| {
        let pat = pattern(v);
        let tag = variant_tag(namespace, v);
        quote! { #pat => #tag }
    });

    // Empty enums have no values to match on
    let (name_body, tag_body) = if variants.is_empty() {
        (quote! { match *self {} }, quote! { match *self {} })
    } else {
        (
            quote! { match self { #(#name_arms),* } },
            quote! { match self { #(#tag_arms),* } },
        )
    };

    let expanded = quote! {
        impl todo_dispatch::Action for #name {
            fn name(&self) -> &'static str {
                #name_body
            }

            fn tag(&self) -> &'static str {
                #tag_body
            }
        }
    };

    TokenStream::from(expanded)
}
