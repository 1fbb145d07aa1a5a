//! Scripted transport for unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;

use crate::common::{Error, Result};

use super::{Request, StepResult, Transport};

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, String),
    Refuse,
}

/// Replies per (method, path); the last reply for a route repeats forever
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Reply::Respond(status, body.to_string()))
    }

    pub fn refuse(self, method: Method, path: &str) -> Self {
        self.push(method, path, Reply::Refuse)
    }

    fn push(self, method: Method, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn exchange(&self, request: &Request) -> Result<StepResult> {
        self.requests.lock().unwrap().push(request.clone());

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let queue = routes.get_mut(&(request.method.clone(), request.path.clone()));
            match queue {
                Some(q) if q.len() > 1 => q.pop_front(),
                Some(q) => q.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Respond(status, body)) => Ok(StepResult::new(status, &body)),
            Some(Reply::Refuse) => Err(Error::ServerUnreachable {
                url: request.path.clone(),
                reason: "Connection refused".to_string(),
            }),
            None => Ok(StepResult::new(404, "Not Found")),
        }
    }
}
