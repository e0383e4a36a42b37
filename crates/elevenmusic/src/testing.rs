//! In-memory transport for unit tests.

use crate::error::{MusicError, Result};
use crate::transport::MusicTransport;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub enum Canned {
    Audio(Bytes),
    Json(Value),
    Status(u16, String),
}

impl Canned {
    fn audio(self) -> Result<Bytes> {
        match self {
            Canned::Audio(bytes) => Ok(bytes),
            Canned::Json(value) => Ok(Bytes::from(value.to_string())),
            Canned::Status(status, body) => Err(MusicError::Http { status, body }),
        }
    }

    fn json(self) -> Result<Value> {
        match self {
            Canned::Json(value) => Ok(value),
            Canned::Audio(_) => Err(MusicError::Decode("expected JSON, got audio".into())),
            Canned::Status(status, body) => Err(MusicError::Http { status, body }),
        }
    }
}

/// Records every call and answers from a script, then from a fallback.
pub struct RecordingTransport {
    script: Mutex<VecDeque<Canned>>,
    fallback: Canned,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new(fallback: Canned) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_audio(audio: &[u8]) -> Self {
        Self::new(Canned::Audio(Bytes::copy_from_slice(audio)))
    }

    pub fn with_json(value: Value) -> Self {
        Self::new(Canned::Json(value))
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self::new(Canned::Status(status, body.to_string()))
    }

    /// Queue a reply used before the fallback.
    pub fn then(self, reply: Canned) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) -> Canned {
        self.calls.lock().unwrap().push(call);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl MusicTransport for RecordingTransport {
    async fn post_audio(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Bytes> {
        self.record(RecordedCall {
            method: "POST",
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Some(body.clone()),
        })
        .audio()
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.record(RecordedCall {
            method: "POST",
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
        .json()
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        self.record(RecordedCall {
            method: "GET",
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        })
        .json()
    }
}
