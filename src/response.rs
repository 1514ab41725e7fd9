use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ServiceError;

/// HTTP-style status carried in invocation responses; serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Status {
    Ok,
    BadRequest,
    Conflict,
    InternalServerError,
    GatewayTimeout,
}

impl From<Status> for u16 {
    fn from(status: Status) -> u16 {
        match status {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::Conflict => 409,
            Status::InternalServerError => 500,
            Status::GatewayTimeout => 504,
        }
    }
}

impl TryFrom<u16> for Status {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(Status::Ok),
            400 => Ok(Status::BadRequest),
            409 => Ok(Status::Conflict),
            500 => Ok(Status::InternalServerError),
            504 => Ok(Status::GatewayTimeout),
            other => Err(format!("unsupported status code {other}")),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub status_code: Status,
    pub headers: Value,
    pub body: Value,
}

impl ResponsePayload {
    pub fn from_result(result: Result<Value, ServiceError>) -> Self {
        let headers = json!({ "Content-Type": "application/json" });
        match result {
            Ok(body) => ResponsePayload {
                status_code: Status::Ok,
                headers,
                body,
            },
            Err(err) => ResponsePayload {
                status_code: err.status,
                headers,
                body: json!({ "message": err.msg }),
            },
        }
    }
}

pub fn make_response_payload(
    result: Result<Value, ServiceError>,
) -> Result<Value, lambda_runtime::Error> {
    serde_json::to_value(ResponsePayload::from_result(result)).map_err(lambda_runtime::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_code() {
        assert_eq!(serde_json::to_value(Status::Conflict).unwrap(), json!(409));
        let status: Status = serde_json::from_value(json!(504)).unwrap();
        assert_eq!(status, Status::GatewayTimeout);
        assert!(serde_json::from_value::<Status>(json!(418)).is_err());
        assert!(serde_json::from_value::<Status>(json!(202)).is_err());
    }

    #[test]
    fn error_result_carries_message() {
        let payload = make_response_payload(Err(ServiceError::conflict("dup"))).unwrap();
        assert_eq!(payload["statusCode"], json!(409));
        assert_eq!(payload["body"]["message"], json!("dup"));
    }

    #[test]
    fn ok_result_passes_body_through() {
        let payload = make_response_payload(Ok(json!({ "pairs": 3 }))).unwrap();
        assert_eq!(payload["statusCode"], json!(200));
        assert_eq!(payload["body"]["pairs"], json!(3));
    }
}
