//! Derive macro for the `Managed` trait.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Field, Fields, Index, Member, Path, Type,
};

/// Derive `Managed`, plus `SharedFromThis` when the struct has a `SelfRef` field.
///
/// A field counts as the self-reference if its type is named `SelfRef` or it
/// carries `#[rudo_rc(self_ref)]`. Use `#[rudo_rc(crate = path)]` on the type
/// when `rudo_rc` is reachable under another path.
#[proc_macro_derive(Managed, attributes(rudo_rc))]
pub fn derive_managed(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let mut rudo_rc: Path = parse_quote!(::rudo_rc);

    for attr in &input.attrs {
        if !attr.path().is_ident("rudo_rc") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                rudo_rc = meta.value()?.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported attribute"))
            }
        });

        if let Err(err) = result {
            return err.into_compile_error().into();
        }
    }

    match expand(&rudo_rc, &input) {
        Ok(generated) => generated.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn expand(rudo_rc: &Path, input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let self_ref = match &input.data {
        Data::Struct(data) => find_self_ref(&data.fields)?,
        Data::Enum(_) => None,
        Data::Union(u) => {
            return Ok(quote_spanned! {
                u.union_token.span => compile_error!("`Managed` must be manually implemented for unions");
            });
        }
    };

    let Some(member) = self_ref else {
        return Ok(quote! {
            impl #impl_generics #rudo_rc::Managed for #name #ty_generics #where_clause {}
        });
    };

    Ok(quote! {
        impl #impl_generics #rudo_rc::Managed for #name #ty_generics #where_clause {
            #[inline]
            fn bind_self_ref(&self, anchor: #rudo_rc::Anchor<'_>) {
                #rudo_rc::SelfRef::bind(&self.#member, anchor, self);
            }
        }

        impl #impl_generics #rudo_rc::SharedFromThis for #name #ty_generics #where_clause {
            #[inline]
            fn self_ref(&self) -> &#rudo_rc::SelfRef<Self> {
                &self.#member
            }
        }
    })
}

fn find_self_ref(fields: &Fields) -> syn::Result<Option<Member>> {
    let mut found: Option<(Member, &Field)> = None;

    for (i, field) in fields.iter().enumerate() {
        if !is_self_ref(field)? {
            continue;
        }
        if let Some((_, first)) = &found {
            let mut err = syn::Error::new_spanned(field, "more than one `SelfRef` field");
            err.combine(syn::Error::new_spanned(first, "first `SelfRef` field is here"));
            return Err(err);
        }
        let member = field.ident.clone().map_or_else(
            || Member::Unnamed(Index::from(i)),
            Member::Named,
        );
        found = Some((member, field));
    }

    Ok(found.map(|(member, _)| member))
}

fn is_self_ref(field: &Field) -> syn::Result<bool> {
    let mut tagged = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("rudo_rc") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("self_ref") {
                tagged = true;
                Ok(())
            } else {
                Err(meta.error("unsupported field attribute"))
            }
        })?;
    }

    if tagged {
        return Ok(true);
    }

    Ok(match &field.ty {
        Type::Path(ty) => ty
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == "SelfRef"),
        _ => false,
    })
}
