use crate::error::ServiceError;
use crate::response::Status;
use futures::stream::TryStreamExt;
use log::debug;
use rusoto_core::Region;
use rusoto_s3::{GetObjectRequest, PutObjectRequest, S3Client, S3};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub fn get_region() -> Result<Region, ServiceError> {
    match env::var("REGION") {
        Ok(val) => Region::from_str(val.as_str()).map_err(|_| ServiceError {
            msg: format!("Unable to parse region {}", val),
            status: Status::InternalServerError,
        }),
        _ => Err(ServiceError::internal_server_error(
            "Environment variable 'REGION' not found",
        )),
    }
}

/// Reads an optional variable; unset and empty are both `None`.
pub fn get_optional_env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.is_empty())
}

/// Parses an optional numeric variable, rejecting values that are set but malformed.
pub fn get_optional_usize(name: &str) -> Result<Option<usize>, ServiceError> {
    get_optional_env_var(name)
        .map(|val| {
            val.parse::<usize>().map_err(|_| {
                ServiceError::internal_server_error(format!(
                    "Environment variable '{}' is not a valid count: {}",
                    name, val
                ))
            })
        })
        .transpose()
}

pub fn read_local_file(path: &Path) -> Result<Vec<u8>, ServiceError> {
    debug!("Reading {}", path.display());
    fs::read(path).map_err(|err| {
        ServiceError::bad_request(format!("Unable to read {}: {}", path.display(), err))
    })
}

pub fn write_local_file(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    debug!("Writing {} bytes to {}", bytes.len(), path.display());
    fs::write(path, bytes).map_err(|err| {
        ServiceError::internal_server_error(format!("Unable to write {}: {}", path.display(), err))
    })
}

pub async fn download_object_from_s3(
    client: &S3Client,
    bucket: String,
    key: String,
) -> Result<Vec<u8>, ServiceError> {
    debug!("Downloading s3://{}/{}", bucket, key);
    let request = GetObjectRequest {
        bucket,
        key,
        ..Default::default()
    };
    let mut object = client
        .get_object(request)
        .await
        .map_err(ServiceError::internal_server_error)?;
    let body = object
        .body
        .take()
        .ok_or(ServiceError::internal_server_error(
            "Unable to extract body",
        ))?;
    body.map_ok(|b| b.to_vec())
        .try_concat()
        .await
        .map_err(ServiceError::internal_server_error)
}

pub async fn upload_object_to_s3(
    client: &S3Client,
    object: Vec<u8>,
    bucket: String,
    key: String,
) -> Result<(), ServiceError> {
    debug!("Uploading {} bytes to s3://{}/{}", object.len(), bucket, key);
    let request = PutObjectRequest {
        bucket,
        key,
        body: Some(object.into()),
        ..Default::default()
    };
    client
        .put_object(request)
        .await
        .map(|_| ())
        .map_err(ServiceError::internal_server_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_usize_rejects_garbage() {
        env::set_var("CONTACT_SIMILARITY_TEST_THREADS", "four");
        assert!(get_optional_usize("CONTACT_SIMILARITY_TEST_THREADS").is_err());
        env::set_var("CONTACT_SIMILARITY_TEST_THREADS", "4");
        assert_eq!(
            get_optional_usize("CONTACT_SIMILARITY_TEST_THREADS").unwrap(),
            Some(4)
        );
        env::remove_var("CONTACT_SIMILARITY_TEST_THREADS");
        assert_eq!(
            get_optional_usize("CONTACT_SIMILARITY_TEST_THREADS").unwrap(),
            None
        );
    }

    #[test]
    fn missing_local_file_is_bad_request() {
        let err = read_local_file(Path::new("/nonexistent/contacts.csv")).unwrap_err();
        assert!(matches!(err.status, Status::BadRequest));
    }
}
