use fn_invoker::{echo, handler_fn, run, Error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // stdout carries the ENV/ARGS lines, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting fn-echo");
    run(handler_fn(echo)).await?;
    Ok(())
}
