use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for the `Attributes` trait.
///
/// Generates `attribute(&self, name)` which reads a named field through
/// `ToToken`. Unknown names yield `None`.
///
/// # Example
///
/// ```ignore
/// use constants_core::Attributes;
///
/// #[derive(Attributes)]
/// struct Element {
///     symbol: String,
///     #[attributes(rename = "number")]
///     atomic_number: u32,
///     #[attributes(skip)]
///     notes: Vec<Note>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[attributes(skip)]` - Do not expose this field
/// - `#[attributes(rename = "name")]` - Expose the field under a custom name
///
/// Tuple struct fields are exposed by position (`"0"`, `"1"`, ...). Enums
/// expose a `variant` attribute with the variant name, plus the fields of the
/// active variant.
#[proc_macro_derive(Attributes, attributes(attributes))]
pub fn derive_attributes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_attributes_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_attributes_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let where_clause = build_where_clause(generics, where_clause);

    let body = match &input.data {
        syn::Data::Struct(data) => generate_struct_body(&data.fields)?,
        syn::Data::Enum(data) => generate_enum_body(data)?,
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(input, "Attributes cannot be derived for unions"));
        }
    };

    Ok(quote! {
        impl #impl_generics ::constants_core::Attributes for #name #ty_generics #where_clause {
            fn attribute(&self, name: &str) -> ::std::option::Option<::constants_core::Token> {
                #body
            }
        }
    })
}

fn build_where_clause(
    generics: &syn::Generics,
    existing: Option<&syn::WhereClause>,
) -> proc_macro2::TokenStream {
    let type_params: Vec<_> = generics.type_params().map(|p| &p.ident).collect();

    if type_params.is_empty() && existing.is_none() {
        return quote! {};
    }

    let token_bounds = type_params.iter().map(|p| {
        quote! { #p: ::constants_core::ToToken }
    });

    let existing_predicates = existing
        .map(|w| {
            let predicates = &w.predicates;
            quote! { #predicates, }
        })
        .unwrap_or_default();

    quote! {
        where
            #existing_predicates
            #(#token_bounds),*
    }
}

/// One exposed field: the attribute name and an expression reading it.
struct Exposed {
    name: String,
    access: proc_macro2::TokenStream,
}

fn exposed_fields(
    fields: &syn::Fields,
    access: impl Fn(usize, &syn::Field) -> proc_macro2::TokenStream,
) -> syn::Result<Vec<Exposed>> {
    let mut exposed = Vec::new();

    for (i, field) in fields.iter().enumerate() {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let name = match (attrs.rename, &field.ident) {
            (Some(rename), _) => rename,
            (None, Some(ident)) => ident.to_string(),
            (None, None) => i.to_string(),
        };
        exposed.push(Exposed {
            name,
            access: access(i, field),
        });
    }

    Ok(exposed)
}

fn match_arms(exposed: &[Exposed]) -> Vec<proc_macro2::TokenStream> {
    exposed
        .iter()
        .map(|Exposed { name, access }| {
            quote! {
                #name => ::std::option::Option::Some(::constants_core::ToToken::to_token(#access)),
            }
        })
        .collect()
}

fn generate_struct_body(fields: &syn::Fields) -> syn::Result<proc_macro2::TokenStream> {
    let exposed = exposed_fields(fields, |i, field| match &field.ident {
        Some(ident) => quote! { &self.#ident },
        None => {
            let idx = syn::Index::from(i);
            quote! { &self.#idx }
        }
    })?;
    let arms = match_arms(&exposed);

    Ok(quote! {
        match name {
            #(#arms)*
            _ => ::std::option::Option::None,
        }
    })
}

fn generate_enum_body(data: &syn::DataEnum) -> syn::Result<proc_macro2::TokenStream> {
    let mut variant_arms = Vec::new();

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        let exposed = exposed_fields(&variant.fields, |i, field| match &field.ident {
            Some(ident) => quote! { #ident },
            None => {
                let binding = quote::format_ident!("f{}", i);
                quote! { #binding }
            }
        })?;
        let arms = match_arms(&exposed);

        let pattern = match &variant.fields {
            syn::Fields::Unit => quote! { Self::#variant_ident },
            syn::Fields::Named(fields) => {
                let names = fields.named.iter().filter_map(|f| f.ident.as_ref());
                quote! { Self::#variant_ident { #(#names),* } }
            }
            syn::Fields::Unnamed(fields) => {
                let names = (0..fields.unnamed.len()).map(|i| quote::format_ident!("f{}", i));
                quote! { Self::#variant_ident(#(#names),*) }
            }
        };

        variant_arms.push(quote! {
            #[allow(unused_variables)]
            #pattern => match name {
                "variant" => ::std::option::Option::Some(::constants_core::Token::Str(#variant_name.to_owned())),
                #(#arms)*
                _ => ::std::option::Option::None,
            },
        });
    }

    if variant_arms.is_empty() {
        return Ok(quote! { match *self {} });
    }

    Ok(quote! {
        match self {
            #(#variant_arms)*
        }
    })
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    rename: Option<String>,
}

fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("attributes") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename`"))
            }
        })?;
    }

    Ok(result)
}
