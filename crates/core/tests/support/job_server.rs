//! Scripted asynchronous job endpoint

use std::collections::VecDeque;

use async_trait::async_trait;
use conduit_core::ports::{ApiRequest, ApiResponse, HttpMethod, RestDispatcher};
use conduit_domain::{ConduitError, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Answers every start with `token` and every poll with the next scripted
/// body; the last body repeats once the script runs out.
pub struct ScriptedJobServer {
    token: String,
    polls: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedJobServer {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            polls: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, body: Value) -> Self {
        self.polls.lock().push_back(body.to_string());
        self
    }

    pub fn then_processing(self, times: usize) -> Self {
        (0..times).fold(self, |server, i| {
            server.then(json!({"jobState": "PROCESSING", "jobId": "1", "progressCurrent": i, "progressTotal": times}))
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.requests.lock().iter().filter(|request| request.path.contains("/async/get/")).count()
    }
}

#[async_trait]
impl RestDispatcher for ScriptedJobServer {
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().push(request.clone());

        match request.method {
            HttpMethod::Post if request.path.ends_with("/async/start") => {
                Ok(ApiResponse::new(201, json!({"token": self.token}).to_string()))
            }
            HttpMethod::Get if request.path.contains("/async/get/") => {
                let next = self.polls.lock().pop_front();
                let mut last = self.last.lock();
                if let Some(body) = next {
                    *last = Some(body);
                }
                last.clone()
                    .map(|body| ApiResponse::new(200, body))
                    .ok_or_else(|| ConduitError::NotFound("no scripted poll body".into()))
            }
            HttpMethod::Get if request.path.ends_with("/cancel") => Ok(ApiResponse::new(200, "")),
            _ => Err(ConduitError::NotFound(format!("{} {}", request.method, request.path))),
        }
    }
}
