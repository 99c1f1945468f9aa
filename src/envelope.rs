use serde_json::Value;

use crate::error::{Error, Result};

/// One decoded API response body.
///
/// The wire protocol answers either with a list of documents or with a coded
/// error object; a 404 may also arrive wrapped as the sole element of a
/// list. The body is decoded into this sum type once, at the transport
/// boundary, so callers match on variants instead of re-inspecting JSON
/// shapes.
#[derive(Debug)]
pub(crate) enum ApiReply {
    /// Successful query: zero or more result documents.
    Results(Vec<Value>),
    /// Code 429: wait `wait` seconds before retrying, then pace follow-up
    /// requests by `latency`.
    RateLimited { wait: f64, latency: f64 },
    /// Code 404: the query matched nothing.
    NotFound,
    /// Any other coded error; fatal.
    Error { code: i64, message: String },
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    delay: Option<(f64, f64)>,
}

impl ApiReply {
    pub(crate) fn decode(body: Value) -> Result<Self> {
        match body {
            Value::Array(docs) => {
                // A 404 may be wrapped as the sole element of the list.
                if docs.len() == 1 {
                    if let Ok(err) = serde_json::from_value::<ErrorBody>(docs[0].clone()) {
                        if err.code == 404 {
                            return Ok(Self::NotFound);
                        }
                    }
                }
                Ok(Self::Results(docs))
            }
            Value::Object(_) => {
                let err: ErrorBody =
                    serde_json::from_value(body).map_err(|_| Error::UnexpectedResponse)?;
                Ok(match (err.code, err.delay) {
                    (404, _) => Self::NotFound,
                    (429, Some((wait, latency))) => Self::RateLimited { wait, latency },
                    // A 429 without its delay hint is a protocol violation;
                    // surface it instead of retrying blind.
                    (code, _) => Self::Error {
                        code,
                        message: err.message,
                    },
                })
            }
            _ => Err(Error::UnexpectedResponse),
        }
    }
}
