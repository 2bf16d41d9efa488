#![deny(missing_docs)]

//! Attribute macro for `fn_invoker` entry points.
//!
//! An asynchronous `main` annotated with `#[function]` must accept an
//! argument of type `A` which implements [`serde::Deserialize`], a
//! `fn_invoker::Context`, and return a `Result<B, E>` where `B` implements
//! [`serde::Serialize`] and `E` converts into
//! `Box<dyn std::error::Error + Send + Sync + 'static>`.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote_spanned;
use syn::{spanned::Spanned, FnArg, ItemFn};

#[proc_macro_attribute]
/// Wrap an async `main` into a runtime loop driving it as the handler
pub fn function(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemFn);
    let ret = &input.sig.output;
    let name = &input.sig.ident;
    let body = &input.block;
    let attrs = &input.attrs;
    let asyncness = &input.sig.asyncness;
    let inputs = &input.sig.inputs;

    if name != "main" {
        let tokens = quote_spanned! { name.span() =>
            compile_error!("only the main function can be tagged with #[function]");
        };
        return TokenStream::from(tokens);
    }

    if asyncness.is_none() {
        let tokens = quote_spanned! { input.span() =>
          compile_error!("the async keyword is missing from the function declaration");
        };
        return TokenStream::from(tokens);
    }

    if inputs.len() != 2 {
        let tokens = quote_spanned! { inputs.span() =>
            compile_error!("the #[function] macro expects two arguments: an invocation input and its context");
        };
        return TokenStream::from(tokens);
    }

    let mut typed = inputs.iter().map(|arg| match arg {
        FnArg::Typed(arg) => Some(arg),
        FnArg::Receiver(_) => None,
    });
    let (event, context) = match (typed.next().flatten(), typed.next().flatten()) {
        (Some(event), Some(context)) => (event, context),
        _ => {
            let tokens = quote_spanned! { inputs.span() =>
                compile_error!("fn main's arguments must be fully formed");
            };
            return TokenStream::from(tokens);
        }
    };
    let event_name = &event.pat;
    let event_type = &event.ty;
    let context_name = &context.pat;
    let context_type = &context.ty;

    let result = quote_spanned! { input.span() =>

        #(#attrs)*
        #asyncness fn main() {
            async fn actual(#event_name: #event_type, #context_name: #context_type) #ret #body

            let f = fn_invoker::handler_fn(actual);
            fn_invoker::run(f).await.unwrap();
        }
    };

    result.into()
}
