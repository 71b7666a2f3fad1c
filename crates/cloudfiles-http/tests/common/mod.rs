#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cloudfiles_http::headers::{ETAG, RANGE, X_AUTH_TOKEN};
use cloudfiles_http::testing::{MockError, MockHttpClient};
use cloudfiles_http::{
    AuthState, Authentication, Authenticator, HttpRequest, Response, Result, Session, SessionHandle,
};
use cloudfiles_verify::Md5Hasher;
use http::{HeaderValue, Method};
use url::Url;

pub const STORAGE_URL: &str = "https://storage.example.com/v1/acct";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cloudfiles_http=trace")
        .with_test_writer()
        .try_init();
}

pub fn md5_hex(data: &[u8]) -> String { hex::encode(Md5Hasher::digest(data)) }

pub fn auth_state(token: &str) -> AuthState {
    AuthState {
        auth_token:         token.to_owned(),
        storage_url:        Url::parse(STORAGE_URL).unwrap(),
        cdn_management_url: Url::parse("https://cdn.example.com/v1/acct").unwrap(),
        storage_token:      token.to_owned(),
    }
}

/// Hands out `tok-<n>` tokens and records every call to the store.
pub struct TokenIssuer {
    store: FakeStore,
    calls: AtomicU32,
}

impl TokenIssuer {
    pub fn new(store: FakeStore) -> Arc<Self> {
        Arc::new(Self {
            store,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl Authenticator for TokenIssuer {
    async fn reauthenticate(&self, session: &SessionHandle) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let token = self.store.issue_token();
        session.replace(auth_state(&token));
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    token:       String,
    generation:  u32,
    objects:     BTreeMap<String, Vec<u8>>,
    /// Listing names per collection path.
    collections: BTreeMap<String, Vec<String>>,
    ignore_range: bool,
    wrong_etag:  bool,
    served:      usize,
    expire_after: Option<usize>,
}

impl StoreState {
    fn rotate(&mut self) -> String {
        self.generation += 1;
        self.token = format!("tok-{}", self.generation);
        self.token.clone()
    }
}

/// A Swift-like object store answering through a [`MockHttpClient`].
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.issue_token();
        store
    }

    /// Invalidates the current token and returns the new valid one.
    pub fn issue_token(&self) -> String {
        self.state.lock().unwrap().rotate()
    }

    /// Rotates the token right after the `n`th exchange has been answered.
    pub fn expire_after(&self, n: usize) { self.state.lock().unwrap().expire_after = Some(n); }

    pub fn token(&self) -> String { self.state.lock().unwrap().token.clone() }

    pub fn put_object(&self, container: &str, name: &str, data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(format!("/v1/acct/{container}/{name}"), data);
    }

    pub fn put_collection(&self, path: &str, names: impl IntoIterator<Item = String>) {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        self.state.lock().unwrap().collections.insert(path.to_owned(), names);
    }

    pub fn ignore_range(&self) { self.state.lock().unwrap().ignore_range = true; }

    pub fn corrupt_etags(&self) { self.state.lock().unwrap().wrong_etag = true; }

    /// A session logged in with the current token.
    pub fn session(&self) -> SessionHandle { SessionHandle::new(Session::authenticated(auth_state(&self.token()))) }

    pub fn authentication(&self) -> (Authentication, Arc<TokenIssuer>) {
        let issuer = TokenIssuer::new(self.clone());
        (Authentication::new(issuer.clone(), self.session()), issuer)
    }

    pub fn client(&self) -> MockHttpClient {
        let store = self.clone();
        MockHttpClient::new(move |request| Ok(store.handle(request)))
    }

    fn handle(&self, request: &HttpRequest) -> Response {
        let mut state = self.state.lock().unwrap();
        let response = respond(&state, request);
        state.served += 1;
        if state.expire_after == Some(state.served) {
            state.rotate();
        }
        response
    }
}

fn respond(state: &StoreState, request: &HttpRequest) -> Response {
    let presented = request.headers.get(X_AUTH_TOKEN).and_then(|v| v.to_str().ok());
    if presented != Some(state.token.as_str()) {
        return Response::new(401, "Unauthorized");
    }

    if request.method != Method::GET {
        return Response::new(405, "Method Not Allowed");
    }

    let path = request.url.path().to_owned();
    let query: BTreeMap<String, String> = request.url.query_pairs().into_owned().collect();

    if query.get("format").map(String::as_str) == Some("json") {
        return match state.collections.get(&path) {
            Some(names) => listing(names, &query),
            None => Response::new(404, "Not Found"),
        };
    }

    let Some(data) = state.objects.get(&path) else {
        return Response::new(404, "Not Found");
    };

    let etag = if state.wrong_etag {
        md5_hex(b"something else")
    } else {
        md5_hex(data)
    };
    let etag = HeaderValue::from_str(&format!("\"{etag}\"")).unwrap();

    let range = request.headers.get(RANGE).and_then(|v| v.to_str().ok());
    match range.and_then(parse_range) {
        Some(_) if state.ignore_range => Response::new(200, "OK").with_header(ETAG, etag).with_body(data.clone()),
        Some((start, _)) if start >= data.len() as u64 => {
            Response::new(416, "Requested Range Not Satisfiable").with_header(ETAG, etag)
        }
        Some((start, end)) => {
            let end = end.min(data.len() as u64 - 1);
            let body = data[start as usize..=end as usize].to_vec();
            Response::new(206, "Partial Content").with_header(ETAG, etag).with_body(body)
        }
        None => Response::new(200, "OK").with_header(ETAG, etag).with_body(data.clone()),
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

fn listing(names: &[String], query: &BTreeMap<String, String>) -> Response {
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10_000);
    let page: Vec<serde_json::Value> = names
        .iter()
        .filter(|name| query.get("marker").is_none_or(|marker| name.as_str() > marker.as_str()))
        .take(limit)
        .map(|name| serde_json::json!({ "name": name, "bytes": name.len() }))
        .collect();

    if page.is_empty() {
        return Response::new(204, "No Content");
    }
    Response::new(200, "OK").with_body(serde_json::to_vec(&page).unwrap())
}

/// Transport that fails every exchange, as if the host were unreachable.
pub fn unreachable_client() -> MockHttpClient {
    MockHttpClient::new(|_| Err(MockError("connection refused".into())))
}
