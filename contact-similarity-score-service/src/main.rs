use contact_similarity::dto::{Record, ScoreConfig, ScoreSummary};
use contact_similarity::error::ServiceError;
use contact_similarity::response::make_response_payload;
use contact_similarity::util::{
    get_optional_env_var, get_optional_usize, get_region, read_local_file, write_local_file,
};
use contact_similarity_score_service::index::RecordIndex;
use contact_similarity_score_service::pairwise::{
    CancelFlag, LogObserver, PairwiseScorer, ScoreMap,
};
use contact_similarity_score_service::util;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use lazy_static::lazy_static;
use log::{error, info, warn};
use rusoto_core::{Client, Region};
use rusoto_s3::S3Client;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

lazy_static! {
    // AWS Region
    static ref REGION: Region = get_region().unwrap();
}

// Time left to upload and respond once the sweep is cancelled.
const DEADLINE_MARGIN: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let (Some(input), Some(output)) = (
        get_optional_env_var("INPUT_FILE"),
        get_optional_env_var("OUTPUT_FILE"),
    ) {
        return score_local(PathBuf::from(input), PathBuf::from(output))
            .await
            .map_err(|err| {
                error!("{}", err.msg);
                Error::from(err)
            });
    }
    run(service_fn(process)).await?;
    Ok(())
}

async fn process(event: LambdaEvent<ScoreConfig>) -> Result<Value, Error> {
    let (config, context) = event.into_parts();
    let deadline = UNIX_EPOCH + Duration::from_millis(context.deadline);
    let result = score(config, deadline)
        .await
        .and_then(|summary| {
            serde_json::to_value(summary).map_err(ServiceError::internal_server_error)
        });
    if let Err(err) = &result {
        error!("Scoring failed: {}", err.msg);
    }
    make_response_payload(result)
}

async fn score(config: ScoreConfig, deadline: SystemTime) -> Result<ScoreSummary, ServiceError> {
    let start = Instant::now();
    let client = S3Client::new_with_client(Client::shared(), REGION.clone());
    let records = util::pull_data_file(&client, &config.data).await?;
    info!(
        "File downloaded in {:.4} secs",
        start.elapsed().as_secs_f64()
    );
    let num_records = records.len();

    let cancel = CancelFlag::new();
    let watchdog = tokio::spawn(cancel_at(cancel.clone(), deadline));
    let num_threads = match config.num_threads {
        Some(n) => Some(n),
        None => get_optional_usize("SCORE_THREADS")?,
    };
    let scores = score_records(records, num_threads, cancel).await;
    watchdog.abort();
    let scores = scores?;

    let start = Instant::now();
    let output = util::push_result_file(&client, &config.data, &scores).await?;
    info!(
        "Uploaded {} scores to s3://{}/{} in {:.4} secs",
        scores.len(),
        output.bucket,
        output.key,
        start.elapsed().as_secs_f64()
    );
    Ok(ScoreSummary {
        bucket: output.bucket,
        key: output.key,
        records: num_records,
        pairs: scores.len(),
    })
}

async fn score_local(input: PathBuf, output: PathBuf) -> Result<(), ServiceError> {
    let start = Instant::now();
    let records = util::parse_records(&read_local_file(&input)?)?;
    info!(
        "Read {} contacts from {} in {:.4} secs",
        records.len(),
        input.display(),
        start.elapsed().as_secs_f64()
    );
    let num_threads = get_optional_usize("SCORE_THREADS")?;
    let scores = score_records(records, num_threads, CancelFlag::new()).await?;
    write_local_file(&output, &util::render_scores(&scores)?)?;
    info!("Similarity scores written to {}", output.display());
    Ok(())
}

/// Builds the index and runs the sweep off the async runtime.
async fn score_records(
    records: Vec<Record>,
    num_threads: Option<usize>,
    cancel: CancelFlag,
) -> Result<ScoreMap, ServiceError> {
    tokio::task::spawn_blocking(move || -> Result<ScoreMap, ServiceError> {
        let start = Instant::now();
        let index = RecordIndex::build(records)?;
        info!(
            "Indexed {} contacts in {:.4} secs",
            index.len(),
            start.elapsed().as_secs_f64()
        );
        let scorer = PairwiseScorer::new(num_threads)?
            .with_cancel_flag(cancel)
            .with_observer(Arc::new(LogObserver));
        let start = Instant::now();
        let scores = scorer.score_all(&index)?;
        info!(
            "Scored {} pairs on {} threads in {:.4} secs",
            scores.len(),
            scorer.num_threads(),
            start.elapsed().as_secs_f64()
        );
        Ok(scores)
    })
    .await
    .map_err(ServiceError::internal_server_error)?
}

async fn cancel_at(cancel: CancelFlag, deadline: SystemTime) {
    let remaining = deadline
        .duration_since(SystemTime::now())
        .unwrap_or_default()
        .saturating_sub(DEADLINE_MARGIN);
    tokio::time::sleep(remaining).await;
    warn!("Invocation deadline approaching, cancelling similarity scoring");
    cancel.cancel();
}
