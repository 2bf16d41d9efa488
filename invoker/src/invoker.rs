//! The echo invoker: print the `env` and `args` fields, hand the input back.

use crate::{render::render, Context, Error, InvocationInput};
use std::io::{self, Write};
use tracing::debug;

/// Key holding the execution environment descriptor.
pub const ENV_KEY: &str = "env";
/// Key holding the invocation arguments.
pub const ARGS_KEY: &str = "args";

/// Print `ENV: ...` and `ARGS: ...` to stdout and return `input` unchanged.
///
/// Both lines are written while holding the stdout lock, so concurrent
/// invocations never split a pair. A write failure is returned as is.
///
/// ```
/// use fn_invoker::{invoke, InvocationInput};
///
/// let input = InvocationInput::new();
/// let output = invoke(input.clone()).unwrap();
/// assert_eq!(output, input);
/// ```
pub fn invoke(input: InvocationInput) -> io::Result<InvocationInput> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    invoke_with(&mut handle, input)
}

/// Same as [`invoke`], writing to `out` instead of stdout.
pub fn invoke_with<W: Write>(out: &mut W, input: InvocationInput) -> io::Result<InvocationInput> {
    writeln!(out, "ENV: {}", render(input.get(ENV_KEY)))?;
    writeln!(out, "ARGS: {}", render(input.get(ARGS_KEY)))?;
    out.flush()?;
    Ok(input)
}

/// Handler adapter for [`run`](crate::run).
pub async fn echo(input: InvocationInput, ctx: Context) -> Result<InvocationInput, Error> {
    debug!(request_id = %ctx.request_id, keys = input.len(), "echoing input");
    Ok(invoke(input)?)
}
