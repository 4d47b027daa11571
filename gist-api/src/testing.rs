//! Transports for tests: a scripted one that replays canned responses and an
//! in-memory gist host that behaves like the real collection endpoint.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::json;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::endpoints::gists::{Gist, GistFile, GistRevision, NewGist};
use crate::endpoints::GistId;
use crate::error::GistApiError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Replays responses in order and records every request
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, GistApiError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| GistApiError::Transport("connection refused".to_string()))
    }
}

#[derive(Default)]
struct HostState {
    // Revisions per gist, oldest first
    gists: BTreeMap<String, Vec<Gist>>,
    next_id: u64,
    next_revision: u64,
    requests: Vec<HttpRequest>,
}

/// In-memory gist collection that only accepts one access token
pub struct MemoryGistHost {
    accepted_token: String,
    state: Mutex<HostState>,
}

impl MemoryGistHost {
    pub fn new(accepted_token: impl Into<String>) -> Self {
        Self {
            accepted_token: accepted_token.into(),
            state: Mutex::new(HostState::default()),
        }
    }

    /// Store a gist as-is, e.g. one with files the app would never write
    pub fn insert(&self, id: &str, files: BTreeMap<String, GistFile>) {
        let mut state = self.lock();
        let version = state.bump_revision();
        let gist = Gist {
            id: Some(GistId::from(id)),
            description: None,
            public: true,
            files,
            html_url: Some(format!("https://gist.github.com/{}", id)),
            history: vec![GistRevision {
                version,
                committed_at: None,
            }],
        };
        state.gists.insert(id.to_string(), vec![gist]);
    }

    pub fn remove(&self, id: &str) {
        self.lock().gists.remove(id);
    }

    pub fn get(&self, id: &str) -> Option<Gist> {
        self.lock()
            .gists
            .get(id)
            .and_then(|revisions| revisions.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().gists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HostState {
    fn bump_revision(&mut self) -> String {
        self.next_revision += 1;
        format!("rev-{}", self.next_revision)
    }

    fn handle(&mut self, request: &HttpRequest) -> HttpResponse {
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|segments| segments.map(str::to_string).collect())
            .unwrap_or_default();

        match (&request.method, segments.as_slice()) {
            (&Method::POST, [_]) => match parse_body(request) {
                Ok(new_gist) => {
                    self.next_id += 1;
                    let id = format!("gist-{}", self.next_id);
                    let gist = self.commit(&id, None, new_gist);
                    ok(StatusCode::CREATED, &gist)
                }
                Err(response) => response,
            },
            (&Method::GET, [_, id]) => match self.gists.get(id).and_then(|revs| revs.last()) {
                Some(gist) => ok(StatusCode::OK, gist),
                None => not_found(),
            },
            (&Method::GET, [_, id, sha]) => {
                let revision = self.gists.get(id).and_then(|revs| {
                    revs.iter()
                        .find(|gist| gist.latest_revision() == Some(sha.as_str()))
                });
                match revision {
                    Some(gist) => ok(StatusCode::OK, gist),
                    None => not_found(),
                }
            }
            (&Method::PATCH, [_, id]) => {
                let Some(previous) = self.gists.get(id).and_then(|revs| revs.last()).cloned()
                else {
                    return not_found();
                };
                match parse_body(request) {
                    Ok(new_gist) => {
                        let gist = self.commit(id, Some(previous), new_gist);
                        ok(StatusCode::OK, &gist)
                    }
                    Err(response) => response,
                }
            }
            _ => not_found(),
        }
    }

    fn commit(&mut self, id: &str, previous: Option<Gist>, new_gist: NewGist) -> Gist {
        let version = self.bump_revision();
        let mut files = previous.map(|gist| gist.files).unwrap_or_default();
        for (name, file) in new_gist.files {
            files.insert(
                name.clone(),
                GistFile {
                    content: file.content,
                    filename: Some(name),
                },
            );
        }

        let revisions = self.gists.entry(id.to_string()).or_default();
        let mut history: Vec<GistRevision> = revisions
            .last()
            .map(|gist| gist.history.clone())
            .unwrap_or_default();
        history.insert(
            0,
            GistRevision {
                version,
                committed_at: None,
            },
        );

        let gist = Gist {
            id: Some(GistId::from(id)),
            description: Some(new_gist.description),
            public: new_gist.public,
            files,
            html_url: Some(format!("https://gist.github.com/{}", id)),
            history,
        };
        revisions.push(gist.clone());
        gist
    }
}

fn parse_body(request: &HttpRequest) -> Result<NewGist, HttpResponse> {
    let body = request.body.clone().unwrap_or_default();
    serde_json::from_value(body).map_err(|e| {
        HttpResponse::json(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({ "message": format!("Invalid request: {}", e) }),
        )
    })
}

fn ok(status: StatusCode, gist: &Gist) -> HttpResponse {
    match serde_json::to_value(gist) {
        Ok(body) => HttpResponse::json(status, &body),
        Err(e) => HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::json(StatusCode::NOT_FOUND, &json!({ "message": "Not Found" }))
}

#[async_trait]
impl Transport for MemoryGistHost {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, GistApiError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if request.query("access_token").as_deref() != Some(self.accepted_token.as_str()) {
            return Ok(HttpResponse::json(
                StatusCode::UNAUTHORIZED,
                &json!({ "message": "Bad credentials" }),
            ));
        }

        Ok(state.handle(&request))
    }
}
