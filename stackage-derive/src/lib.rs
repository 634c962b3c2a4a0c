use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Member, parse_macro_input, spanned::Spanned};

/// Locate the single field of a newtype wrapper.
fn wrapped_member(input: &DeriveInput, derive: &str) -> syn::Result<Member> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            format!("#[derive({derive})] only supports structs"),
        ));
    };

    match &data.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => Ok(Member::Unnamed(syn::Index::from(0))),
        Fields::Named(fields) if fields.named.len() == 1 => {
            let ident = fields.named[0].ident.clone().ok_or_else(|| {
                syn::Error::new(fields.span(), "named field without an identifier")
            })?;
            Ok(Member::Named(ident))
        }
        fields => Err(syn::Error::new(
            fields.span(),
            format!("#[derive({derive})] expects a struct with exactly one field"),
        )),
    }
}

/// Shared expansion: the alias trait, `Display`, `Opaque` and the conversion into `Value`.
fn expand(
    input: &DeriveInput,
    member: &Member,
    trait_path: TokenStream2,
    wrapped: TokenStream2,
    accessor: TokenStream2,
    opaque_hook: TokenStream2,
) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #trait_path for #name #ty_generics #where_clause {
            fn #accessor(&self) -> &#wrapped {
                &self.#member
            }
        }

        impl #impl_generics ::core::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.#member, f)
            }
        }

        impl #impl_generics ::stackage::value::Opaque for #name #ty_generics #where_clause {
            #opaque_hook
        }

        impl #impl_generics ::core::convert::From<#name #ty_generics> for ::stackage::value::Value #where_clause {
            fn from(value: #name #ty_generics) -> Self {
                ::stackage::value::Value::opaque(value)
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive [`AsStack`] for a newtype around `Stack`.
///
/// The wrapper also gets `Display` (the stack rendering), `Opaque` (so the core unwraps
/// it wherever a stack is expected) and `From<Wrapper> for Value`. The wrapper must
/// implement `Debug`.
#[proc_macro_derive(AsStack)]
pub fn derive_as_stack(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let member = match wrapped_member(&input, "AsStack") {
        Ok(member) => member,
        Err(err) => return err.to_compile_error().into(),
    };

    expand(
        &input,
        &member,
        quote! { ::stackage::alias::AsStack },
        quote! { ::stackage::stack::Stack },
        quote! { stack },
        quote! {
            fn as_stack(&self) -> ::core::option::Option<::stackage::stack::Stack> {
                ::core::option::Option::Some(self.#member.clone())
            }
        },
    )
}

/// Derive [`AsCondition`] for a newtype around `Condition`.
///
/// Mirrors [`derive_as_stack`] for conditions.
#[proc_macro_derive(AsCondition)]
pub fn derive_as_condition(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let member = match wrapped_member(&input, "AsCondition") {
        Ok(member) => member,
        Err(err) => return err.to_compile_error().into(),
    };

    expand(
        &input,
        &member,
        quote! { ::stackage::alias::AsCondition },
        quote! { ::stackage::condition::Condition },
        quote! { condition },
        quote! {
            fn as_condition(&self) -> ::core::option::Option<::stackage::condition::Condition> {
                ::core::option::Option::Some(self.#member.clone())
            }
        },
    )
}
