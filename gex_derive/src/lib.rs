use std::borrow::Cow;

use proc_macro2::{TokenStream, Ident, Span};
use syn::{Attribute, DeriveInput, Data, Fields, DataStruct, FieldsNamed, FieldsUnnamed, LitInt};
use quote::quote;

/// Number of bytes to skip before a field, given as `#[skip(N)]`.
fn skip_len(attrs: &[Attribute]) -> syn::Result<usize> {
	let mut skip = None;
	for attr in attrs.iter().filter(|attr| attr.path().is_ident("skip")) {
		if skip.is_some() {
			return Err(syn::Error::new_spanned(attr, "cannot use skip more than once"));
		}
		skip = Some(attr.parse_args::<LitInt>()?.base10_parse::<usize>()?);
	}
	Ok(skip.unwrap_or(0))
}

fn read_derive_impl(input: &DeriveInput) -> syn::Result<TokenStream> {
	let (fields, tuple) = match &input.data {
		Data::Struct(DataStruct { fields: Fields::Named(FieldsNamed { named, .. }), .. }) => (named, false),
		Data::Struct(DataStruct { fields: Fields::Unnamed(FieldsUnnamed { unnamed, .. }), .. }) => (unnamed, true),
		_ => return Err(syn::Error::new_spanned(input, "only tuple struct or struct with named fields supported")),
	};
	let mut body = quote! {};
	let mut initializer = quote! {};
	let mut size = quote! { 0 };
	let mut tuple_field_num = 0u8..;
	for field in fields {
		let skip = skip_len(&field.attrs)?;
		let ty = &field.ty;
		if skip > 0 {
			body = quote! {
				#body
				cursor.skip(#skip)?;
			};
		}
		let field_ident = match &field.ident {
			Some(field_ident) => Cow::Borrowed(field_ident),
			None => {
				let num = tuple_field_num.next().unwrap_or(u8::MAX);
				Cow::Owned(Ident::new(&format!("field{}", num), Span::call_site()))
			},
		};
		body = quote! {
			#body
			let #field_ident = <#ty as gex_reader::Readable>::read(cursor)?;
		};
		initializer = quote! { #initializer #field_ident, };
		size = quote! { #size + #skip + <#ty as gex_reader::Readable>::SIZE };
	}
	initializer = if tuple { quote! { (#initializer) } } else { quote! { {#initializer} } };
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let type_name = &input.ident;
	Ok(quote! {
		impl #impl_generics gex_reader::Readable for #type_name #ty_generics #where_clause {
			const SIZE: usize = #size;
			
			fn read(cursor: &mut gex_reader::ByteCursor<'_>) -> gex_reader::Result<Self> {
				#body
				Ok(#type_name #initializer)
			}
		}
	})
}

/// Reads a fixed-layout little-endian record field by field, advancing the cursor.
/// `#[skip(N)]` skips N bytes before the field it is attached to.
#[proc_macro_derive(Readable, attributes(skip))]
pub fn read_derive(tokens: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(tokens as DeriveInput);
	read_derive_impl(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}
