use crate::response::Status;
use serde::{Deserialize, Serialize};
use std::error;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceError {
    pub msg: String,
    pub status: Status,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl error::Error for ServiceError {}

impl ServiceError {
    pub fn bad_request<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::BadRequest,
        }
    }

    pub fn conflict<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::Conflict,
        }
    }

    pub fn internal_server_error<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::InternalServerError,
        }
    }

    pub fn gateway_timeout<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::GatewayTimeout,
        }
    }
}

/// Two input records share all five text fields. `id` is the later record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyError {
    pub id: i64,
}

impl fmt::Display for DuplicateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "contact with ID {} already exists", self.id)
    }
}

impl error::Error for DuplicateKeyError {}

impl From<DuplicateKeyError> for ServiceError {
    fn from(err: DuplicateKeyError) -> Self {
        ServiceError::conflict(err)
    }
}

/// A pairwise sweep was aborted through its cancel flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("similarity scoring was cancelled before completion")
    }
}

impl error::Error for Cancelled {}

impl From<Cancelled> for ServiceError {
    fn from(err: Cancelled) -> Self {
        ServiceError::gateway_timeout(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_maps_to_conflict() {
        let err: ServiceError = DuplicateKeyError { id: 42 }.into();
        assert!(matches!(err.status, Status::Conflict));
        assert_eq!(err.msg, "contact with ID 42 already exists");
    }

    #[test]
    fn display_renders_status_code() {
        let err = ServiceError::bad_request("row 3: invalid contact id 'x'");
        let rendered = err.to_string();
        assert!(rendered.contains("400"));
        assert!(rendered.contains("row 3"));
    }
}
