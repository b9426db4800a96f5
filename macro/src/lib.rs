#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Not an issue in a macro crate"
)]
//! Procedural macro turning a SID literal such as `"S-1-5-32-544"` into a
//! `queue_security::ConstSid` at compile time.
mod core;
use core::sid_impl;
use proc_macro::TokenStream;

use syn::{LitStr, parse_macro_input};

/// Parses a SID string literal at compile time and expands to a `ConstSid<N>`.
///
/// A malformed literal is reported as a compile error on the literal itself.
#[proc_macro]
pub fn sid(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitStr);
    match sid_impl(&lit) {
        Ok(token_stream) => token_stream,
        Err(err) => err.to_compile_error(),
    }
    .into()
}
