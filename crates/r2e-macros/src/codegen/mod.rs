//! Code generation for the `#[routes]` attribute macro, split by concern.

pub mod controller_impl;
pub mod handlers;
pub mod wrapping;

use proc_macro2::TokenStream;
use quote::quote;

use crate::routes_parsing::RoutesImplDef;

/// Generate the full `#[routes]` expansion: the rewritten `impl` block plus
/// the generated handler functions and `Controller<State>` impl.
pub fn generate(def: &RoutesImplDef) -> TokenStream {
    let impl_block = wrapping::generate_impl_block(def);
    let handlers = handlers::generate_handlers(def);
    let controller_impl = controller_impl::generate_controller_impl(def);

    quote! {
        #impl_block
        #handlers
        #controller_impl
    }
}
