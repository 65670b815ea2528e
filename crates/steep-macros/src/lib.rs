use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{
    quote,
    ToTokens,
};
use syn::{
    ext::IdentExt,
    parse::ParseStream,
    parse_macro_input,
    punctuated::Punctuated,
    spanned::Spanned,
    Data,
    DeriveInput,
    Field,
    Fields as SynFields,
    Ident,
    Token,
    Type,
    Visibility,
};

/// Derives `steep::Fields` for a struct with named fields.
///
/// Fields opt into environment roles with `#[steep(...)]`:
///
/// ```rust,ignore
/// #[derive(Clone, Fields)]
/// struct Connect {
///     #[steep(save)]
///     pub role: String,
///     #[steep(match, load)]
///     pub name: String,
/// }
/// ```
///
/// `save` fields must be `Clone + Debug + Send + Sync + 'static`, `match`
/// fields additionally `PartialEq`. `load` fields must be `Clone` and
/// implement `steep::Vacant`, which decides whether the field is still unset.
/// Shared handles such as `Arc<Mutex<_>>` have no unset value of their own;
/// declare them as `Option<Arc<Mutex<_>>>`, which is vacant while `None`.
///
/// Roles on private fields are recorded in the field table but never
/// accessed; the classifier reports them as plan errors.
#[proc_macro_derive(Fields, attributes(steep))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_fields(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default, Clone, Copy)]
struct Roles {
    save: bool,
    load: bool,
    matches: bool,
}

impl Roles {
    fn is_empty(&self) -> bool {
        !(self.save || self.load || self.matches)
    }
}

struct FieldInfo<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    visible: bool,
    roles: Roles,
}

fn expand_fields(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            SynFields::Named(named) => named.named.iter().collect(),
            SynFields::Unit => Vec::new(),
            SynFields::Unnamed(unnamed) =>
                return Err(syn::Error::new(
                    unnamed.span(),
                    "Fields can only be derived for structs with named fields",
                )),
        },
        _ =>
            return Err(syn::Error::new(
                input.ident.span(),
                "Fields can only be derived for structs",
            )),
    };
    let fields = named
        .into_iter()
        .map(field_info)
        .collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) =
        input.generics.split_for_impl();

    let specs = fields.iter().map(|f| {
        let field_name = f.ident.unraw().to_string();
        let visible = f.visible;
        let Roles {
            save,
            load,
            matches,
        } = f.roles;
        quote! {
            ::steep::FieldSpec {
                name: #field_name,
                visible: #visible,
                roles: ::steep::Roles {
                    save: #save,
                    load: #load,
                    matches: #matches,
                },
            }
        }
    });

    // only visible fields get accessors
    let accessible = || fields.iter().filter(|f| f.visible);

    let save_arms = accessible().filter(|f| f.roles.save).map(|f| {
        let ident = f.ident;
        let field_name = f.ident.unraw().to_string();
        quote! {
            #field_name => ::std::option::Option::Some(
                ::steep::fields::store(&self.#ident)
            ),
        }
    });
    let vacant_arms = accessible().filter(|f| f.roles.load).map(|f| {
        let ident = f.ident;
        let field_name = f.ident.unraw().to_string();
        quote! {
            #field_name => ::steep::Vacant::is_vacant(&self.#ident),
        }
    });
    let accepts_arms = accessible()
        .filter(|f| f.roles.load || f.roles.matches)
        .map(|f| {
            let ty = f.ty;
            let field_name = f.ident.unraw().to_string();
            quote! {
                #field_name => ::steep::fields::downcast::<#ty>(value).is_some(),
            }
        });
    let load_arms = accessible().filter(|f| f.roles.load).map(|f| {
        let ident = f.ident;
        let ty = f.ty;
        let field_name = f.ident.unraw().to_string();
        quote! {
            #field_name => match ::steep::fields::downcast::<#ty>(value) {
                ::std::option::Option::Some(v) => {
                    self.#ident = ::std::clone::Clone::clone(v);
                    true
                },
                ::std::option::Option::None => false,
            },
        }
    });
    let match_arms = accessible().filter(|f| f.roles.matches).map(|f| {
        let ident = f.ident;
        let ty = f.ty;
        let field_name = f.ident.unraw().to_string();
        quote! {
            #field_name => ::steep::fields::downcast::<#ty>(value)
                .map(|v| v == &self.#ident),
        }
    });

    Ok(quote! {
        impl #impl_generics ::steep::Fields for #name #ty_generics #where_clause {
            fn field_specs(&self) -> &'static [::steep::FieldSpec] {
                const SPECS: &[::steep::FieldSpec] = &[#(#specs),*];
                SPECS
            }
            fn type_name(&self) -> &'static str {
                #type_name
            }
            #[allow(unused_variables)]
            fn save_value(
                &self,
                name: &str,
            ) -> ::std::option::Option<::steep::fields::Stored> {
                match name {
                    #(#save_arms)*
                    _ => ::std::option::Option::None,
                }
            }
            #[allow(unused_variables)]
            fn is_vacant(
                &self,
                name: &str,
            ) -> bool {
                match name {
                    #(#vacant_arms)*
                    _ => false,
                }
            }
            #[allow(unused_variables)]
            fn accepts(
                &self,
                name: &str,
                value: &dyn ::steep::Value,
            ) -> bool {
                match name {
                    #(#accepts_arms)*
                    _ => false,
                }
            }
            #[allow(unused_variables)]
            fn load_value(
                &mut self,
                name: &str,
                value: &dyn ::steep::Value,
            ) -> bool {
                match name {
                    #(#load_arms)*
                    _ => false,
                }
            }
            #[allow(unused_variables)]
            fn match_value(
                &self,
                name: &str,
                value: &dyn ::steep::Value,
            ) -> ::std::option::Option<bool> {
                match name {
                    #(#match_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}

fn field_info(field: &Field) -> syn::Result<FieldInfo<'_>> {
    let ident = field.ident.as_ref().ok_or_else(|| {
        syn::Error::new(field.span(), "expected a named field")
    })?;
    let mut roles = Roles::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("steep")) {
        // `match` is a keyword, so role names are parsed with `parse_any`
        let tags = attr.parse_args_with(|input: ParseStream| {
            Punctuated::<Ident, Token![,]>::parse_terminated_with(
                input,
                Ident::parse_any,
            )
        })?;
        for tag in tags {
            match tag.to_string().as_str() {
                "save" => roles.save = true,
                "load" => roles.load = true,
                "match" => roles.matches = true,
                other =>
                    return Err(syn::Error::new(
                        tag.span(),
                        format!(
                            "unknown steep role `{}`, expected one of `save`, `load`, `match`",
                            other
                        ),
                    )),
            }
        }
    }
    if roles.is_empty() && field.attrs.iter().any(|a| a.path().is_ident("steep"))
    {
        return Err(syn::Error::new(
            field.span(),
            format!(
                "`#[steep]` on `{}` names no role",
                ident.to_token_stream()
            ),
        ));
    }
    Ok(FieldInfo {
        ident,
        ty: &field.ty,
        visible: !matches!(field.vis, Visibility::Inherited),
        roles,
    })
}
