use crate::pairwise::ScoreMap;
use contact_similarity::dto::{DataFile, Record};
use contact_similarity::error::ServiceError;
use contact_similarity::util::{download_object_from_s3, upload_object_to_s3};
use csv::{ReaderBuilder, StringRecord, Writer};
use rusoto_s3::S3Client;

const OUTPUT_HEADER: [&str; 3] = ["ContactID1", "ContactID2", "SimilarityScore"];

pub async fn pull_data_file(
    client: &S3Client,
    data: &DataFile,
) -> Result<Vec<Record>, ServiceError> {
    let bytes = download_object_from_s3(client, data.bucket.clone(), data.key.clone()).await?;
    parse_records(&bytes)
}

/// Uploads the scores next to the input, swapping `/input` for `/output` in the bucket.
pub async fn push_result_file(
    client: &S3Client,
    data: &DataFile,
    scores: &ScoreMap,
) -> Result<DataFile, ServiceError> {
    let object = render_scores(scores)?;
    let output = DataFile {
        bucket: data.bucket.replace("/input", "/output"),
        key: data.key.clone(),
    };
    upload_object_to_s3(client, object, output.bucket.clone(), output.key.clone()).await?;
    Ok(output)
}

///
/// Reads contacts from CSV: a header row, then `id` followed by first name, last
/// name, email, zip code and address. Short rows leave the trailing fields empty.
///
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, ServiceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    reader
        .records()
        .enumerate()
        .map(|(idx, row)| match row {
            // header is line 1
            Ok(row) => to_record(&row, idx + 2),
            Err(err) => Err(ServiceError::bad_request(err)),
        })
        .collect()
}

fn to_record(row: &StringRecord, line: usize) -> Result<Record, ServiceError> {
    let field = |i: usize| row.get(i).unwrap_or_default().to_string();
    let raw_id = row.get(0).unwrap_or_default();
    let id = raw_id.trim().parse::<i64>().map_err(|_| {
        ServiceError::bad_request(format!("line {line}: invalid contact id '{raw_id}'"))
    })?;
    Ok(Record {
        id,
        first_name: field(1),
        last_name: field(2),
        email: field(3),
        zip_code: field(4),
        address: field(5),
    })
}

pub fn render_scores(scores: &ScoreMap) -> Result<Vec<u8>, ServiceError> {
    let mut writer = Writer::from_writer(vec![]);
    writer
        .write_record(OUTPUT_HEADER)
        .map_err(ServiceError::internal_server_error)?;
    for entry in scores {
        writer
            .write_record(&[
                entry.key.first.to_string(),
                entry.key.second.to_string(),
                entry.score.to_string(),
            ])
            .map_err(ServiceError::internal_server_error)?;
    }
    writer
        .into_inner()
        .map_err(ServiceError::internal_server_error)
}
