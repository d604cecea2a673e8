/**
* Copyright 2019 Comcast Cable Communications Management, LLC
*
* Licensed under the Apache License, Version 2.0 (the "License");
* you may not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
* http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing, software
* distributed under the License is distributed on an "AS IS" BASIS,
* WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
* See the License for the specific language governing permissions and
* limitations under the License.
*
* SPDX-License-Identifier: Apache-2.0
*/

extern crate proc_macro;
extern crate proc_macro2;
#[macro_use]
extern crate quote;
extern crate syn;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type};

/// Generates `ZapiValue` (and `ZapiElement` when `#[zapi(name = "...")]` is
/// given) for a struct with named fields.
///
/// Field attributes:
/// * `rename = "..."` overrides the kebab-case element name
/// * `wrap = "..."` nests the value inside one more element
/// * `item = "..."` names the element each `Vec` entry is written as
#[proc_macro_derive(ZapiObject, attributes(zapi))]
pub fn zapi_object(input: TokenStream) -> TokenStream {
    // Parse the input stream
    let ast = syn::parse_macro_input!(input as DeriveInput);

    // Build the impl
    match impl_zapi(&ast) {
        Ok(gen) => gen.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[derive(Default)]
struct ZapiAttrs {
    name: Option<String>,
    rename: Option<String>,
    wrap: Option<String>,
    item: Option<String>,
}

fn parse_attrs(attrs: &[Attribute]) -> syn::Result<ZapiAttrs> {
    let mut out = ZapiAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("zapi") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let value: LitStr = meta.value()?.parse()?;
            if meta.path.is_ident("name") {
                out.name = Some(value.value());
            } else if meta.path.is_ident("rename") {
                out.rename = Some(value.value());
            } else if meta.path.is_ident("wrap") {
                out.wrap = Some(value.value());
            } else if meta.path.is_ident("item") {
                out.item = Some(value.value());
            } else {
                return Err(meta.error("unknown zapi attribute"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

enum FieldKind {
    Required,
    Optional,
    List,
}

fn field_kind(ty: &Type) -> FieldKind {
    if let Type::Path(p) = ty {
        if let Some(segment) = p.path.segments.last() {
            if segment.ident == "Option" {
                return FieldKind::Optional;
            }
            if segment.ident == "Vec" {
                return FieldKind::List;
            }
        }
    }
    FieldKind::Required
}

// volume_id_attributes -> volume-id-attributes
fn element_name(ident: &syn::Ident) -> String {
    let raw = ident.to_string();
    raw.trim_start_matches("r#").replace('_', "-")
}

fn impl_zapi(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &ast.ident;
    let container = parse_attrs(&ast.attrs)?;
    let fields = match ast.data {
        Data::Struct(ref data) => match data.fields {
            Fields::Named(ref named) => &named.named,
            Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    name,
                    "ZapiObject needs braces, use `struct Name {}`",
                ))
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "ZapiObject does not support tuple structs",
                ))
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "ZapiObject can only be derived for structs",
            ))
        }
    };

    let mut reads = Vec::new();
    let mut writes = Vec::new();
    for field in fields.iter() {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "unnamed field"))?;
        let attrs = parse_attrs(&field.attrs)?;
        let element = attrs.rename.clone().unwrap_or_else(|| element_name(ident));
        let wrap = match attrs.wrap {
            Some(ref w) => quote! { ::std::option::Option::Some(#w) },
            None => quote! { ::std::option::Option::None },
        };

        match field_kind(&field.ty) {
            FieldKind::Required => {
                reads.push(quote! {
                    #ident: ::ontap_zapi::codec::read_required(element, #element, #wrap)?
                });
                writes.push(quote! {
                    ::ontap_zapi::codec::write_required(w, #element, #wrap, &self.#ident)?;
                });
            }
            FieldKind::Optional => {
                reads.push(quote! {
                    #ident: ::ontap_zapi::codec::read_optional(element, #element, #wrap)?
                });
                writes.push(quote! {
                    ::ontap_zapi::codec::write_optional(w, #element, #wrap, &self.#ident)?;
                });
            }
            FieldKind::List => {
                if attrs.wrap.is_some() {
                    return Err(syn::Error::new_spanned(
                        field,
                        "`wrap` cannot be used on a list, the list element already wraps its items",
                    ));
                }
                let item = attrs.item.ok_or_else(|| {
                    syn::Error::new_spanned(field, "list fields need #[zapi(item = \"...\")]")
                })?;
                reads.push(quote! {
                    #ident: ::ontap_zapi::codec::read_list(element, #element)?
                });
                writes.push(quote! {
                    ::ontap_zapi::codec::write_list(w, #element, #item, &self.#ident)?;
                });
            }
        }
    }

    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let element_impl = match container.name {
        Some(ref element) => quote! {
            impl #impl_generics ::ontap_zapi::codec::ZapiElement for #name #ty_generics #where_clause {
                const ELEMENT: &'static str = #element;
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        impl #impl_generics ::ontap_zapi::codec::ZapiValue for #name #ty_generics #where_clause {
            fn from_element(
                element: &::ontap_zapi::codec::Element,
            ) -> ::ontap_zapi::error::ZapiResult<Self> {
                let _ = element;
                Ok(#name {
                    #(#reads,)*
                })
            }

            fn write_body<W: ::std::io::Write>(
                &self,
                w: &mut ::ontap_zapi::codec::XmlWriter<W>,
            ) -> ::ontap_zapi::error::ZapiResult<()> {
                let _ = &w;
                #(#writes)*
                Ok(())
            }
        }

        #element_impl
    })
}
