#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use cloudfiles::{Account, AccountSettings, Credentials, login};
use cloudfiles_http::headers::{
    CONTENT_TYPE, ETAG, RANGE, X_ACCOUNT_BYTES_USED, X_ACCOUNT_CONTAINER_COUNT, X_ACCOUNT_OBJECT_COUNT, X_AUTH_KEY,
    X_AUTH_TOKEN, X_AUTH_USER, X_CDN_ENABLED, X_CDN_MANAGEMENT_URL, X_CDN_SSL_URI, X_CDN_URI,
    X_CONTAINER_BYTES_USED, X_CONTAINER_OBJECT_COUNT, X_COPY_FROM, X_STORAGE_TOKEN, X_STORAGE_URL,
};
use cloudfiles_http::testing::MockHttpClient;
use cloudfiles_http::{HttpRequest, Response};
use cloudfiles_verify::Md5Hasher;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

pub const IDENTITY_URL: &str = "https://identity.example.com/v1.0";
pub const USERNAME: &str = "alice";
pub const API_KEY: &str = "key-1";

const STORAGE_PREFIX: &str = "/v1/acct";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cloudfiles=debug,cloudfiles_http=debug")
        .with_test_writer()
        .try_init();
}

pub fn md5_hex(data: &[u8]) -> String { hex::encode(Md5Hasher::digest(data)) }

#[derive(Debug, Clone, Default)]
pub struct StoredObject {
    pub data:         Vec<u8>,
    pub content_type: String,
    pub metadata:     BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct StoredContainer {
    pub objects:     BTreeMap<String, StoredObject>,
    pub metadata:    BTreeMap<String, String>,
    pub cdn_enabled: bool,
}

#[derive(Default)]
struct State {
    token:       String,
    logins:      u32,
    containers:  BTreeMap<String, StoredContainer>,
    log:         Vec<(Method, String)>,
    /// Remaining exchanges before the current token is revoked.
    expire_in:   Option<u32>,
}

/// In-memory Swift account with an identity endpoint.
#[derive(Clone, Default)]
pub struct FakeSwift {
    state: Arc<Mutex<State>>,
}

impl FakeSwift {
    pub fn new() -> Self { Self::default() }

    pub fn client(&self) -> MockHttpClient {
        let swift = self.clone();
        MockHttpClient::new(move |request| Ok(swift.handle(request)))
    }

    pub fn credentials() -> Credentials {
        Credentials::new(USERNAME, API_KEY).identity_url(Url::parse(IDENTITY_URL).unwrap())
    }

    pub async fn login(&self) -> Account<MockHttpClient> {
        self.login_with(AccountSettings::default()).await
    }

    pub async fn login_with(&self, settings: AccountSettings) -> Account<MockHttpClient> {
        login(self.client(), Self::credentials(), settings).await.unwrap()
    }

    pub fn logins(&self) -> u32 { self.state.lock().unwrap().logins }

    /// Revokes the current token.
    pub fn expire_token(&self) { self.state.lock().unwrap().token = String::new(); }

    /// Revokes the current token after `n` more storage exchanges.
    pub fn expire_token_after(&self, n: u32) { self.state.lock().unwrap().expire_in = Some(n); }

    pub fn add_container(&self, name: &str) { self.state.lock().unwrap().containers.entry(name.to_owned()).or_default(); }

    pub fn add_object(&self, container: &str, name: &str, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.containers.entry(container.to_owned()).or_default().objects.insert(
            name.to_owned(),
            StoredObject {
                data: data.to_vec(),
                content_type: "application/octet-stream".into(),
                metadata: BTreeMap::new(),
            },
        );
    }

    pub fn container(&self, name: &str) -> Option<StoredContainer> {
        self.state.lock().unwrap().containers.get(name).cloned()
    }

    pub fn object(&self, container: &str, name: &str) -> Option<StoredObject> {
        self.container(container).and_then(|c| c.objects.get(name).cloned())
    }

    /// Method and decoded path of every storage request, in order.
    pub fn log(&self) -> Vec<(Method, String)> { self.state.lock().unwrap().log.clone() }

    fn handle(&self, request: &HttpRequest) -> Response {
        let mut state = self.state.lock().unwrap();

        if request.url.as_str() == IDENTITY_URL {
            return identity(&mut state, &request.headers);
        }

        let presented = request.headers.get(X_AUTH_TOKEN).and_then(|v| v.to_str().ok());
        if state.token.is_empty() || presented != Some(state.token.as_str()) {
            return Response::new(401, "Unauthorized");
        }

        let segments: Vec<String> = request
            .url
            .path()
            .strip_prefix(STORAGE_PREFIX)
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode)
            .collect();

        state.log.push((request.method.clone(), format!("/{}", segments.join("/"))));
        let cdn = request.url.host_str() == Some("cdn.example.com");

        let response = match (cdn, segments.as_slice()) {
            (true, [container]) => cdn_request(&mut state, request, container),
            (false, []) => account(&state, request),
            (false, [container]) => container_request(&mut state, request, container),
            (false, [container, object]) => object_request(&mut state, request, container, object),
            _ => Response::new(400, "Bad Request"),
        };

        if let Some(remaining) = state.expire_in.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                state.expire_in = None;
                state.token = String::new();
            }
        }

        response
    }
}

fn decode(segment: &str) -> String {
    url::form_urlencoded::parse(format!("k={}", segment.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

fn header(name: HeaderName, value: &str) -> (HeaderName, HeaderValue) { (name, HeaderValue::from_str(value).unwrap()) }

fn with_headers(mut response: Response, pairs: impl IntoIterator<Item = (HeaderName, HeaderValue)>) -> Response {
    for (name, value) in pairs {
        response = response.with_header(name, value);
    }
    response
}

fn identity(state: &mut State, headers: &HeaderMap) -> Response {
    let user = headers.get(X_AUTH_USER).and_then(|v| v.to_str().ok());
    let key = headers.get(X_AUTH_KEY).and_then(|v| v.to_str().ok());
    if user != Some(USERNAME) || key != Some(API_KEY) {
        return Response::new(401, "Unauthorized");
    }

    state.logins += 1;
    state.token = format!("tok-{}", state.logins);
    with_headers(Response::new(204, "No Content"), [
        header(X_AUTH_TOKEN, &state.token),
        header(X_STORAGE_TOKEN, &state.token),
        header(X_STORAGE_URL, &format!("https://storage.example.com{STORAGE_PREFIX}")),
        header(X_CDN_MANAGEMENT_URL, &format!("https://cdn.example.com{STORAGE_PREFIX}")),
    ])
}

fn account(state: &State, request: &HttpRequest) -> Response {
    let objects = state.containers.values().map(|c| c.objects.len()).sum::<usize>();
    let bytes = state
        .containers
        .values()
        .flat_map(|c| c.objects.values())
        .map(|o| o.data.len())
        .sum::<usize>();

    match request.method {
        Method::HEAD => with_headers(Response::new(204, "No Content"), [
            header(X_ACCOUNT_CONTAINER_COUNT, &state.containers.len().to_string()),
            header(X_ACCOUNT_OBJECT_COUNT, &objects.to_string()),
            header(X_ACCOUNT_BYTES_USED, &bytes.to_string()),
        ]),
        Method::GET => {
            let names = state.containers.iter().map(|(name, c)| {
                let bytes: usize = c.objects.values().map(|o| o.data.len()).sum();
                (name.clone(), serde_json::json!({ "name": name, "count": c.objects.len(), "bytes": bytes }))
            });
            listing(&request.url, names.collect())
        }
        _ => Response::new(405, "Method Not Allowed"),
    }
}

fn listing(url: &Url, entries: Vec<(String, serde_json::Value)>) -> Response {
    let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10_000);
    let page: Vec<serde_json::Value> = entries
        .into_iter()
        .filter(|(name, _)| query.get("marker").is_none_or(|marker| name > marker))
        .take(limit)
        .map(|(_, value)| value)
        .collect();

    if page.is_empty() {
        return Response::new(204, "No Content");
    }
    Response::new(200, "OK").with_body(serde_json::to_vec(&page).unwrap())
}

fn custom_metadata(headers: &HeaderMap, prefix: &str) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix)?;
            Some((key.to_owned(), value.to_str().ok()?.to_owned()))
        })
        .collect()
}

fn container_request(state: &mut State, request: &HttpRequest, name: &str) -> Response {
    match request.method {
        Method::PUT => {
            let created = !state.containers.contains_key(name);
            state.containers.entry(name.to_owned()).or_default();
            if created { Response::new(201, "Created") } else { Response::new(202, "Accepted") }
        }
        Method::DELETE => match state.containers.get(name) {
            None => Response::new(404, "Not Found"),
            Some(c) if !c.objects.is_empty() => Response::new(409, "Conflict"),
            Some(_) => {
                state.containers.remove(name);
                Response::new(204, "No Content")
            }
        },
        Method::HEAD => match state.containers.get(name) {
            None => Response::new(404, "Not Found"),
            Some(c) => {
                let bytes: usize = c.objects.values().map(|o| o.data.len()).sum();
                let mut response = with_headers(Response::new(204, "No Content"), [
                    header(X_CONTAINER_OBJECT_COUNT, &c.objects.len().to_string()),
                    header(X_CONTAINER_BYTES_USED, &bytes.to_string()),
                ]);
                for (key, value) in &c.metadata {
                    let name = HeaderName::from_bytes(format!("x-container-meta-{key}").as_bytes()).unwrap();
                    response = response.with_header(name, HeaderValue::from_str(value).unwrap());
                }
                response
            }
        },
        Method::POST => match state.containers.get_mut(name) {
            None => Response::new(404, "Not Found"),
            Some(c) => {
                for (key, value) in custom_metadata(&request.headers, "x-container-meta-") {
                    c.metadata.insert(key, value);
                }
                for (key, _) in custom_metadata(&request.headers, "x-remove-container-meta-") {
                    c.metadata.remove(&key);
                }
                Response::new(204, "No Content")
            }
        },
        Method::GET => match state.containers.get(name) {
            None => Response::new(404, "Not Found"),
            Some(c) => {
                let entries = c.objects.iter().map(|(name, o)| {
                    (name.clone(), serde_json::json!({
                        "name": name,
                        "hash": md5_hex(&o.data),
                        "bytes": o.data.len(),
                        "content_type": o.content_type,
                        "last_modified": "2013-03-01T10:00:00.000000",
                    }))
                });
                listing(&request.url, entries.collect())
            }
        },
        _ => Response::new(405, "Method Not Allowed"),
    }
}

fn object_request(state: &mut State, request: &HttpRequest, container: &str, name: &str) -> Response {
    let Some(bucket) = state.containers.get(container) else {
        return Response::new(404, "Not Found");
    };

    match request.method {
        Method::PUT => {
            let object = if let Some(source) = request.headers.get(X_COPY_FROM) {
                let source = source.to_str().unwrap_or_default();
                let parts: Vec<String> = source.trim_start_matches('/').splitn(2, '/').map(decode).collect();
                let Some(object) = state.containers.get(&parts[0]).and_then(|c| c.objects.get(&parts[1])) else {
                    return Response::new(404, "Not Found");
                };
                object.clone()
            } else {
                let data = request.body.clone().unwrap_or_default().to_vec();
                if let Some(etag) = request.headers.get(ETAG) {
                    if etag.to_str().unwrap_or_default() != md5_hex(&data) {
                        return Response::new(422, "Unprocessable Entity");
                    }
                }
                StoredObject {
                    data,
                    content_type: request
                        .headers
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_owned(),
                    metadata: BTreeMap::new(),
                }
            };
            let etag = md5_hex(&object.data);
            state
                .containers
                .entry(container.to_owned())
                .or_default()
                .objects
                .insert(name.to_owned(), object);
            with_headers(Response::new(201, "Created"), [header(ETAG, &etag)])
        }
        Method::DELETE => {
            let removed = state
                .containers
                .get_mut(container)
                .and_then(|c| c.objects.remove(name));
            match removed {
                Some(_) => Response::new(204, "No Content"),
                None => Response::new(404, "Not Found"),
            }
        }
        Method::HEAD => match bucket.objects.get(name) {
            None => Response::new(404, "Not Found"),
            Some(o) => {
                let mut response = with_headers(Response::new(200, "OK"), [header(ETAG, &md5_hex(&o.data))]);
                for (key, value) in &o.metadata {
                    let name = HeaderName::from_bytes(format!("x-object-meta-{key}").as_bytes()).unwrap();
                    response = response.with_header(name, HeaderValue::from_str(value).unwrap());
                }
                response
            }
        },
        Method::POST => match state.containers.get_mut(container).and_then(|c| c.objects.get_mut(name)) {
            None => Response::new(404, "Not Found"),
            Some(o) => {
                o.metadata = custom_metadata(&request.headers, "x-object-meta-").into_iter().collect();
                Response::new(202, "Accepted")
            }
        },
        Method::GET => match bucket.objects.get(name) {
            None => Response::new(404, "Not Found"),
            Some(o) => {
                let etag = header(ETAG, &md5_hex(&o.data));
                let range = request
                    .headers
                    .get(RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("bytes="))
                    .and_then(|v| v.split_once('-'))
                    .and_then(|(s, e)| Some((s.parse::<usize>().ok()?, e.parse::<usize>().ok()?)));
                match range {
                    None => with_headers(Response::new(200, "OK"), [etag]).with_body(o.data.clone()),
                    Some((start, _)) if start >= o.data.len() => {
                        with_headers(Response::new(416, "Requested Range Not Satisfiable"), [etag])
                    }
                    Some((start, end)) => {
                        let end = end.min(o.data.len() - 1);
                        with_headers(Response::new(206, "Partial Content"), [etag])
                            .with_body(o.data[start..=end].to_vec())
                    }
                }
            }
        },
        _ => Response::new(405, "Method Not Allowed"),
    }
}

fn cdn_request(state: &mut State, request: &HttpRequest, name: &str) -> Response {
    let Some(container) = state.containers.get_mut(name) else {
        return Response::new(404, "Not Found");
    };

    let uris = |name: &str| {
        [
            header(X_CDN_URI, &format!("http://c0.cdn.example.com/{name}")),
            header(X_CDN_SSL_URI, &format!("https://ssl.cdn.example.com/{name}")),
        ]
    };

    match request.method {
        Method::PUT => {
            let enabled = request.headers.get(X_CDN_ENABLED).and_then(|v| v.to_str().ok()) == Some("True");
            container.cdn_enabled = enabled;
            if enabled {
                with_headers(Response::new(201, "Created"), uris(name))
            } else {
                Response::new(202, "Accepted")
            }
        }
        Method::HEAD if container.cdn_enabled => with_headers(Response::new(204, "No Content"), uris(name)),
        Method::HEAD => Response::new(204, "No Content"),
        _ => Response::new(405, "Method Not Allowed"),
    }
}
