mod handler;

use handler::{handle, S3Copier, S3Event};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

fn init_logging() {
    // Defaults to info so each copy shows up in CloudWatch
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

async fn handle_request(event: LambdaEvent<S3Event>) -> Result<Value, Error> {
    let source_bucket = std::env::var("SOURCE_BUCKET")
        .map_err(|_| Error::from("SOURCE_BUCKET must be configured"))?;
    let destination_bucket =
        std::env::var("DEST_BUCKET").map_err(|_| Error::from("DEST_BUCKET must be configured"))?;

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let copier = S3Copier::new(&config);

    handle(&copier, &source_bucket, &destination_bucket, event.payload).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    lambda_runtime::run(service_fn(handle_request)).await
}
