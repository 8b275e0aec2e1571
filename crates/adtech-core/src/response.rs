//! Outbound response envelope.
//!
//! Every response carries a `statusCode` and a `body` holding JSON encoded as
//! a string. The one exception is a failed read of all tenants, which carries
//! `message` directly and no `body`; callers consuming that path rely on the
//! shape, so it is kept as is.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::TenantRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum StatusCode {
    Ok,
    InternalError,
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::Ok => 200,
            StatusCode::InternalError => 500,
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = String;

    fn try_from(code: u16) -> std::result::Result<Self, Self::Error> {
        match code {
            200 => Ok(Self::Ok),
            500 => Ok(Self::InternalError),
            other => Err(format!("unsupported status code {other}")),
        }
    }
}

/// Body payload of message responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded.
    pub fn message(status_code: StatusCode, message: impl Into<String>) -> Result<Self> {
        let body = MessageBody {
            message: message.into(),
        };
        Self::with_body(status_code, &body)
    }

    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded.
    pub fn success(message: impl Into<String>) -> Result<Self> {
        Self::message(StatusCode::Ok, message)
    }

    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded.
    pub fn failure(message: impl Into<String>) -> Result<Self> {
        Self::message(StatusCode::InternalError, message)
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded.
    pub fn record(record: &TenantRecord) -> Result<Self> {
        Self::with_body(StatusCode::Ok, record)
    }

    /// # Errors
    ///
    /// Returns an error if the records cannot be encoded.
    pub fn records(records: &[TenantRecord]) -> Result<Self> {
        Self::with_body(StatusCode::Ok, &records)
    }

    /// Failure shape used only when reading all tenants fails.
    #[must_use]
    pub fn bare_failure(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::InternalError,
            body: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code == StatusCode::Ok
    }

    /// Decodes the `body` as a message payload, if it is one.
    #[must_use]
    pub fn body_message(&self) -> Option<String> {
        let body = self.body.as_deref()?;
        serde_json::from_str::<MessageBody>(body)
            .ok()
            .map(|b| b.message)
    }

    /// # Errors
    ///
    /// Returns an error if the envelope cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(CoreError::ResponseEncode)
    }

    fn with_body<T: Serialize + ?Sized>(status_code: StatusCode, body: &T) -> Result<Self> {
        let body = serde_json::to_string(body).map_err(CoreError::ResponseEncode)?;
        Ok(Self {
            status_code,
            body: Some(body),
            message: None,
        })
    }
}
