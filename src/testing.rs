//! In-memory collaborators for unit tests.

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use url::{Position, Url};

use crate::diagnostics::Diagnostics;
use crate::error::{ResolveError, Result};
use crate::http_client::{FetchedPage, Transport};

#[derive(Debug, Clone)]
enum Reply {
    Served { from: String, body: String },
    Status(u16),
}

/// Transport that answers from a fixed script and records every request.
///
/// Routes match on scheme, host and path; the query is ignored. Each route
/// replays its replies in order and keeps repeating the last one.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<String>>,
}

fn route_key(url: &str) -> String {
    let url = Url::parse(url).expect("scripted route must be absolute");
    url[..Position::AfterPath].to_string()
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(self, url: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route_key(url))
            .or_default()
            .push_back(reply);
        self
    }

    /// Serve `body` from `url` itself.
    pub(crate) fn page(self, url: &str, body: &str) -> Self {
        let from = url.to_string();
        self.push(url, Reply::Served { from, body: body.to_string() })
    }

    /// Serve `body` as if the transport had been redirected to `served_from`.
    pub(crate) fn redirect(self, url: &str, served_from: &str, body: &str) -> Self {
        self.push(
            url,
            Reply::Served {
                from: served_from.to_string(),
                body: body.to_string(),
            },
        )
    }

    /// Always bounce `url` to `served_from`.
    pub(crate) fn redirect_always(self, url: &str, served_from: &str) -> Self {
        self.redirect(url, served_from, "")
    }

    /// Fail `url` with an HTTP status.
    pub(crate) fn status(self, url: &str, status: u16) -> Self {
        self.push(url, Reply::Status(status))
    }

    /// Full URLs requested so far, in order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<FetchedPage> {
        self.requests.lock().unwrap().push(url.to_string());

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes.get_mut(&url[..Position::AfterPath]).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match reply {
            Some(Reply::Served { from, body }) => Ok(FetchedPage {
                url: Url::parse(&from)?,
                body: Box::new(Cursor::new(body.into_bytes())),
            }),
            Some(Reply::Status(status)) => Err(ResolveError::Status {
                status,
                url: url.to_string(),
            }),
            None => Err(ResolveError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

/// Diagnostics sink that remembers event names.
#[derive(Debug, Default)]
pub(crate) struct RecordingDiagnostics {
    events: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report_unexpected_event(&self, event: &str, _error: &ResolveError) {
        self.events.lock().unwrap().push(event.to_string());
    }
}
