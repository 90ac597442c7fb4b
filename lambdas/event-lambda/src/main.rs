use aws_lambda_events::event::s3::S3Event;
use imagekit_shared::{AppState, ChangeNotification};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    // Missing buckets stop the process here
    let state = AppState::from_env().await?;

    run(service_fn(move |event: LambdaEvent<S3Event>| {
        let state = Arc::clone(&state);
        async move { function_handler(event, state).await }
    }))
    .await
}

async fn function_handler(event: LambdaEvent<S3Event>, state: Arc<AppState>) -> Result<(), Error> {
    tracing::info!("S3 event received with {} records", event.payload.records.len());

    let records = notifications(&event.payload);
    let processed = state.handler.handle_events(&records).await?;

    tracing::info!("Processed {} of {} records", processed, records.len());
    Ok(())
}

/// Flatten an S3 event into notifications with decoded keys.
fn notifications(event: &S3Event) -> Vec<ChangeNotification> {
    event
        .records
        .iter()
        .filter_map(|record| {
            let Some(key) = record.s3.object.key.as_deref() else {
                tracing::warn!("Skipping record without object key");
                return None;
            };

            Some(ChangeNotification {
                bucket: record.s3.bucket.name.clone().unwrap_or_default(),
                key: decode_key(key),
            })
        })
        .collect()
}

/// S3 notification keys are form-encoded: `+` is a space.
fn decode_key(key: &str) -> String {
    let key_with_spaces = key.replace('+', " ");
    urlencoding::decode(&key_with_spaces)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| key.to_string())
}
