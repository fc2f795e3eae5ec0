//! Common test utilities and setup

#![allow(dead_code)]

use async_trait::async_trait;
use llm::{ImageInput, LlmError, VisionModel};
use moonraker_mcp::catalog::{ActionSpec, ParamKind};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use utils::{RemoteReply, RemoteRequest, RemoteTransport, TransportFailure};

pub const BASE_URL: &str = "http://printer.test";

type Reply = Result<RemoteReply, TransportFailure>;

/// Transport that records requests and replays scripted replies
///
/// Queued replies are used first; afterwards every call gets the fallback.
pub struct MockTransport {
    queued: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: Mutex<Vec<RemoteRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(fallback: Reply) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call answers with `status` and a JSON body
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(Ok(RemoteReply::json(status, &body)))
    }

    /// Every call fails the way a non-2xx answer does
    pub fn status(status: u16) -> Self {
        Self::new(Err(TransportFailure::Status {
            url: BASE_URL.to_string(),
            status,
            body: "Internal Server Error".to_string(),
        }))
    }

    pub fn then(self, reply: Reply) -> Self {
        self.queued.lock().unwrap().push_back(reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RemoteRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteReply, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Vision model with a scripted answer
pub struct MockVisionModel {
    answer: Result<String, String>,
    seen: Mutex<Vec<(String, ImageInput)>>,
}

impl MockVisionModel {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with a rate-limit error
    pub fn rate_limited(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, ImageInput)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    async fn describe_image(&self, prompt: &str, image: &ImageInput) -> llm::Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((prompt.to_string(), image.clone()));
        match &self.answer {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(LlmError::RateLimitExceeded(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}

/// Arguments that pass declaration checks for any action
pub fn sample_params(spec: &ActionSpec) -> Value {
    let mut args = Map::new();
    for param in spec.params {
        let value = match param.kind {
            ParamKind::String => json!("0000000066D99C90"),
            ParamKind::Number => json!(200.0),
            ParamKind::Boolean => json!(false),
            ParamKind::StringList => json!(["benchy.gcode"]),
            ParamKind::Selector(allowed) => json!(allowed[0]),
        };
        args.insert(param.name.to_string(), value);
    }
    Value::Object(args)
}
