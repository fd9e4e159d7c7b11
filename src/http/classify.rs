//! Response classification
//!
//! Pure mapping from a status code to an outcome. Only 401 is ever
//! intercepted by the retry coordinator; everything else is terminal.

use super::transport::RawResponse;
use crate::error::{Error, Result};
use bytes::Bytes;

/// Outcome class of an HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 200-299
    Success,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 500-599
    ServerError,
    /// Anything else
    Unknown,
}

/// Classify a raw status code
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        401 => StatusClass::Unauthorized,
        403 => StatusClass::Forbidden,
        404 => StatusClass::NotFound,
        500..=599 => StatusClass::ServerError,
        _ => StatusClass::Unknown,
    }
}

impl StatusClass {
    /// Turn the class into the caller-facing result
    pub fn into_result(self, status: u16, body: Bytes) -> Result<Bytes> {
        match self {
            StatusClass::Success => Ok(body),
            StatusClass::Unauthorized => Err(Error::Unauthorized),
            StatusClass::Forbidden => Err(Error::Forbidden),
            StatusClass::NotFound => Err(Error::NotFound),
            StatusClass::ServerError => Err(Error::ServerError { status }),
            StatusClass::Unknown => Err(Error::Unknown { status }),
        }
    }
}

/// Classify a transport response. A response without an HTTP status is
/// rejected before the status table is consulted.
pub fn classify_response(response: RawResponse) -> Result<Bytes> {
    let Some(status) = response.status else {
        return Err(Error::InvalidResponse);
    };
    classify_status(status).into_result(status, response.body)
}
