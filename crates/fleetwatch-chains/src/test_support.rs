//! In-memory fakes for chain tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use fleetwatch_protocols::{
    DueStep, HttpError, HttpReply, HttpRequest, HttpSender, RepositoryError, RouteRepository,
    RouteStep, StepStatus,
};

#[derive(Default)]
pub struct FakeRoutes {
    pub due: Mutex<Vec<DueStep>>,
    pub recorded: Mutex<Vec<HashMap<i64, StepStatus>>>,
    pub registered: Mutex<Vec<RouteStep>>,
    pub fail_record: AtomicBool,
}

impl FakeRoutes {
    pub fn with_due(due: Vec<DueStep>) -> Self {
        let routes = Self::default();
        *routes.due.lock() = due;
        routes
    }

    /// Outcomes of the single recorded batch.
    pub fn outcomes(&self) -> HashMap<i64, StepStatus> {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.len(), 1, "expected one batch update");
        recorded[0].clone()
    }
}

#[async_trait]
impl RouteRepository for FakeRoutes {
    async fn list_due_steps(&self) -> Result<Vec<DueStep>, RepositoryError> {
        Ok(self.due.lock().clone())
    }

    async fn record_step_outcomes(
        &self,
        outcomes: &HashMap<i64, StepStatus>,
    ) -> Result<(), RepositoryError> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("database is locked".to_string()));
        }
        self.recorded.lock().push(outcomes.clone());
        Ok(())
    }

    async fn register_chain(
        &self,
        app_id: i64,
        chain_name: &str,
        steps: Vec<RouteStep>,
    ) -> Result<Vec<RouteStep>, RepositoryError> {
        let stored: Vec<RouteStep> = steps
            .into_iter()
            .map(|s| {
                let parent_id = s.parent_id;
                s.in_chain(app_id, chain_name, parent_id)
            })
            .collect();
        self.registered.lock().extend(stored.iter().cloned());
        Ok(stored)
    }
}

/// Replies per URL path; unknown paths get a transport error.
#[derive(Default)]
pub struct ScriptedSender {
    replies: Mutex<HashMap<String, (u16, Value)>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedSender {
    pub fn reply(self, path: &str, status: u16, body: Value) -> Self {
        self.replies.lock().insert(path.to_string(), (status, body));
        self
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| path_of(&r.url)).collect()
    }
}

fn path_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path = without_scheme
        .find('/')
        .map(|i| &without_scheme[i..])
        .unwrap_or("/");
    path.split('?').next().unwrap_or(path).to_string()
}

#[async_trait]
impl HttpSender for ScriptedSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, HttpError> {
        let path = path_of(&request.url);
        self.requests.lock().push(request);
        let scripted = self.replies.lock().get(&path).cloned();
        match scripted {
            Some((status, body)) => Ok(HttpReply {
                status,
                body: body.as_object().cloned().unwrap_or_default(),
            }),
            None => Err(HttpError::Transport(format!("no route for {}", path))),
        }
    }
}
