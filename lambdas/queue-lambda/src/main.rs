use aws_lambda_events::event::sqs::{BatchItemFailure, SqsBatchResponse, SqsEvent, SqsMessage};
use imagekit_shared::{AppState, ImageHandler, JobOutcome, TranscodeJob};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let state = AppState::from_env().await?;

    run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let state = Arc::clone(&state);
        async move { function_handler(event, state).await }
    }))
    .await
}

async fn function_handler(
    event: LambdaEvent<SqsEvent>,
    state: Arc<AppState>,
) -> Result<SqsBatchResponse, Error> {
    tracing::info!("SQS event received with {} messages", event.payload.records.len());
    Ok(process_messages(&state.handler, &event.payload.records).await)
}

/// Run every message, reporting the failed ones for redrive.
async fn process_messages(handler: &ImageHandler, messages: &[SqsMessage]) -> SqsBatchResponse {
    let mut batch_item_failures = Vec::new();

    for message in messages {
        let message_id = message.message_id.clone().unwrap_or_default();

        match process_message(handler, message).await {
            Ok(outcome) => tracing::info!("Message {} done: {:?}", message_id, outcome),
            Err(e) => {
                tracing::error!("Failed to process message {}: {}", message_id, e);
                batch_item_failures.push(BatchItemFailure {
                    item_identifier: message_id,
                });
            }
        }
    }

    SqsBatchResponse { batch_item_failures }
}

async fn process_message(handler: &ImageHandler, message: &SqsMessage) -> Result<JobOutcome, Error> {
    let body = message.body.as_deref().ok_or("Missing message body")?;
    let job: TranscodeJob = serde_json::from_str(body)?;

    Ok(handler.process_job(&job).await?)
}
