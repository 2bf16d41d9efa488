use fn_invoker::{function, invoke, Context, Error, InvocationInput};

// #[function] removes the need for the boilerplate
// `run(handler_fn(func)).await?` shown in the fn-echo binary.

#[function]
#[tokio::main]
async fn main(input: InvocationInput, _: Context) -> Result<InvocationInput, Error> {
    Ok(invoke(input)?)
}
