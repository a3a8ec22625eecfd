//! Derive macros for `structural-mapper`.
//!
//! `#[derive(Shape)]` makes a type usable as a mapping source and
//! `#[derive(Assemble)]` as a mapping target. For structs with named fields
//! the expansion lists the fields by their Rust identifier, independent of
//! any serde attribute. Tuple structs, unit structs and enums have no field
//! identifiers to offer and are delegated to their serde impls.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt as _;
use syn::{Data, DeriveInput, Fields, FieldsNamed, Ident, Type, parse_macro_input};

#[proc_macro_derive(Shape)]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input, Side::Source)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Assemble)]
pub fn derive_assemble(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input, Side::Target)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Clone, Copy)]
enum Side {
    Source,
    Target,
}

fn expand(input: &DeriveInput, side: Side) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "structural mapping cannot be derived for generic types",
        ));
    }

    let name = &input.ident;
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let record = Record::new(fields);
                Ok(match side {
                    Side::Source => record.shape(name),
                    Side::Target => record.assemble(name),
                })
            }
            Fields::Unnamed(_) | Fields::Unit => Ok(through_serde(name, side)),
        },
        Data::Enum(_) => Ok(through_serde(name, side)),
        Data::Union(data) => Err(syn::Error::new_spanned(
            data.union_token,
            "structural mapping cannot be derived for unions",
        )),
    }
}

struct Record<'a> {
    idents: Vec<&'a Ident>,
    // the identifier as written, minus any `r#`
    labels: Vec<String>,
    types: Vec<&'a Type>,
}

impl<'a> Record<'a> {
    fn new(fields: &'a FieldsNamed) -> Self {
        let mut record = Record {
            idents: Vec::new(),
            labels: Vec::new(),
            types: Vec::new(),
        };
        for field in &fields.named {
            if let Some(ident) = &field.ident {
                record.idents.push(ident);
                record.labels.push(ident.unraw().to_string());
                record.types.push(&field.ty);
            }
        }
        record
    }

    fn shape(&self, name: &Ident) -> TokenStream2 {
        let Record {
            idents,
            labels,
            types,
        } = self;
        let len = idents.len();

        quote! {
            impl ::structural_mapper::Shape for #name {
                fn shape(
                    &self,
                ) -> ::core::result::Result<
                    ::structural_mapper::Value<'_>,
                    ::structural_mapper::MapError,
                > {
                    #[allow(unused_imports)]
                    use ::structural_mapper::__private::{SerializeField as _, ShapeField as _};

                    #[allow(unused_mut)]
                    let mut fields = ::std::vec::Vec::with_capacity(#len);
                    #(
                        let shape = (&::structural_mapper::__private::Tag::<#types>::new())
                            .shape_field(&self.#idents)
                            .map_err(|e| {
                                e.within(::structural_mapper::__private::Segment::Field(#labels))
                            })?;
                        fields.push((
                            #labels,
                            ::structural_mapper::__private::shared(&self.#idents, shape),
                        ));
                    )*
                    ::core::result::Result::Ok(::structural_mapper::Value::Record(fields))
                }
            }
        }
    }

    fn assemble(&self, name: &Ident) -> TokenStream2 {
        let Record {
            idents,
            labels,
            types,
        } = self;

        quote! {
            impl ::structural_mapper::Assemble for #name {
                fn assemble(
                    value: ::structural_mapper::Value<'_>,
                ) -> ::core::result::Result<Self, ::structural_mapper::MapError> {
                    #[allow(unused_imports)]
                    use ::structural_mapper::__private::{
                        AssembleField as _, DeserializeField as _, RebuildField as _, ReuseField as _,
                    };

                    #[allow(unused_mut, unused_variables)]
                    let mut fields = ::structural_mapper::__private::record(value)?;
                    ::core::result::Result::Ok(Self {
                        #(
                            #idents: {
                                let tag = ::structural_mapper::__private::Tag::<#types>::new();
                                match ::structural_mapper::__private::take_field(&mut fields, #labels) {
                                    ::core::option::Option::Some(value) => match (&tag).reuse_field(value) {
                                        ::core::result::Result::Ok(reused) => ::core::result::Result::Ok(reused),
                                        ::core::result::Result::Err(value) => (&tag).assemble_field(value),
                                    },
                                    ::core::option::Option::None => (&tag).zero_field(),
                                }
                                .map_err(|e| {
                                    e.within(::structural_mapper::__private::Segment::Field(#labels))
                                })?
                            },
                        )*
                    })
                }

                fn zero() -> ::core::result::Result<Self, ::structural_mapper::MapError> {
                    #[allow(unused_imports)]
                    use ::structural_mapper::__private::{AssembleField as _, DeserializeField as _};

                    let _building = ::structural_mapper::__private::building(
                        ::core::any::type_name::<Self>(),
                    )?;
                    ::core::result::Result::Ok(Self {
                        #(
                            #idents: (&::structural_mapper::__private::Tag::<#types>::new())
                                .zero_field()
                                .map_err(|e| {
                                    e.within(::structural_mapper::__private::Segment::Field(#labels))
                                })?,
                        )*
                    })
                }
            }
        }
    }
}

fn through_serde(name: &Ident, side: Side) -> TokenStream2 {
    match side {
        Side::Source => quote! {
            impl ::structural_mapper::Shape for #name {
                fn shape(
                    &self,
                ) -> ::core::result::Result<
                    ::structural_mapper::Value<'_>,
                    ::structural_mapper::MapError,
                > {
                    ::structural_mapper::__private::shape_serialize(self)
                }
            }
        },
        Side::Target => quote! {
            impl ::structural_mapper::Assemble for #name {
                fn assemble(
                    value: ::structural_mapper::Value<'_>,
                ) -> ::core::result::Result<Self, ::structural_mapper::MapError> {
                    ::structural_mapper::__private::assemble_deserialize(value)
                }

                fn zero() -> ::core::result::Result<Self, ::structural_mapper::MapError> {
                    ::structural_mapper::__private::zero_deserialize()
                }
            }
        },
    }
}
