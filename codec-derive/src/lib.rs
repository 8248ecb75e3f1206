use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident};

/// Rust field name without the raw identifier prefix.
fn field_name(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn impl_derive_abi_tuple(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let named_fields = match &ast.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(named_fields) => &named_fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    "AbiTuple only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "AbiTuple only supports structs",
            ))
        }
    };

    let struct_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();

    let idents: Vec<&Ident> = named_fields
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .collect();
    let names: Vec<String> = idents.iter().map(|ident| field_name(ident)).collect();
    let len = idents.len();
    let indexes = 0..len;

    Ok(quote! {
        impl #impl_generics ::abi_codec::IntoValue for #struct_name #type_generics #where_clause {
            fn into_value(self) -> ::abi_codec::Value {
                let fields: [(&'static str, ::abi_codec::Value); #len] = [
                    #(
                        (#names, ::abi_codec::IntoValue::into_value(self.#idents)),
                    )*
                ];
                ::abi_codec::Value::tuple(fields)
            }
        }

        impl #impl_generics ::abi_codec::FromValue for #struct_name #type_generics #where_clause {
            #[allow(unused_mut, unused_variables)]
            fn from_value(
                value: ::abi_codec::Value,
            ) -> ::core::result::Result<Self, ::abi_codec::DecodingError> {
                let mut reader = ::abi_codec::FieldReader::new(value)?;
                ::core::result::Result::Ok(Self {
                    #(
                        #idents: ::abi_codec::FromValue::from_value(reader.take(#indexes, #names)?)?,
                    )*
                })
            }
        }
    })
}

/// Implements `IntoValue` and `FromValue` for a struct with named fields,
/// mapping it to an ABI tuple by field name. Names are matched the way
/// `abi_codec::field_key` folds them, so `token_uri` reads `tokenURI`.
#[proc_macro_derive(AbiTuple)]
pub fn abi_tuple_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    impl_derive_abi_tuple(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
