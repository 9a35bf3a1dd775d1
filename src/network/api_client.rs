//! REST client shared by every role page.
//!
//! All requests go through [`ApiClient::call`] (or one of its typed wrappers)
//! so headers, 401 handling and error classification live in one place. The
//! wire itself sits behind [`Transport`]: `fetch` in the browser, a scripted
//! mock in native tests.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::config::ApiConfig;
use super::envelope;
use crate::constants::{CSRF_HEADER, MSG_SESSION_EXPIRED};
use crate::error::ApiError;
use crate::models::{AuthMe, UserInfo};
use crate::platform::{self, BrowserPlatform, Platform};
use crate::state::AppContext;

pub type LocalFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Methods that carry the CSRF token.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Method::Get)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    /// Multipart form fields, sent as `FormData`.
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Body,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Body::Json(body),
            headers: Vec::new(),
        }
    }

    pub fn post_form(fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            body: Body::Form(fields),
            headers: Vec::new(),
        }
    }

    pub fn post() -> Self {
        Self {
            method: Method::Post,
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::Delete,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            status_text: String::new(),
            body: body.to_string().into_bytes(),
        }
    }
}

/// The wire. A failed send means no HTTP response was received at all.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> LocalFuture<'_, Result<HttpResponse, ApiError>>;
}

/// Merge the automatic headers into the caller's.
///
/// Caller-set headers always win (names compare case-insensitively):
/// * `Authorization: Bearer <token>` when a token is present
/// * the CSRF header on mutating methods when the page issued a token
/// * `Content-Type: application/json` for JSON bodies
/// * `Accept: application/json`
pub fn merge_headers(
    caller: &[(String, String)],
    method: Method,
    body: &Body,
    token: Option<&str>,
    csrf_token: Option<&str>,
) -> Vec<(String, String)> {
    let mut headers = caller.to_vec();
    let has = |headers: &[(String, String)], name: &str| {
        headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    };

    if let Some(token) = token {
        if !has(&headers, "Authorization") {
            headers.push(("Authorization".into(), format!("Bearer {}", token)));
        }
    }
    if method.is_mutating() {
        if let Some(csrf) = csrf_token {
            if !has(&headers, CSRF_HEADER) {
                headers.push((CSRF_HEADER.into(), csrf.to_string()));
            }
        }
    }
    if matches!(body, Body::Json(_)) && !has(&headers, "Content-Type") {
        headers.push(("Content-Type".into(), "application/json".into()));
    }
    if !has(&headers, "Accept") {
        headers.push(("Accept".into(), "application/json".into()));
    }
    headers
}

// ---------------------------------------------------------------------------
// Browser transport
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    fn send(&self, request: HttpRequest) -> LocalFuture<'_, Result<HttpResponse, ApiError>> {
        Box::pin(async move {
            fetch(request)
                .await
                .map_err(|e| ApiError::Network(js_error_text(&e)))
        })
    }
}

async fn fetch(req: HttpRequest) -> Result<HttpResponse, JsValue> {
    use web_sys::{FormData, Headers, Request, RequestCredentials, RequestInit, RequestMode, Response};

    let opts = RequestInit::new();
    opts.set_method(req.method.as_str());
    opts.set_mode(RequestMode::Cors);
    opts.set_credentials(RequestCredentials::SameOrigin);

    let headers = Headers::new()?;
    for (name, value) in &req.headers {
        headers.append(name, value)?;
    }
    opts.set_headers(&headers);

    match &req.body {
        Body::Empty => {}
        Body::Json(value) => opts.set_body(&JsValue::from_str(&value.to_string())),
        Body::Form(fields) => {
            let form = FormData::new()?;
            for (name, value) in fields {
                form.append_with_str(name, value)?;
            }
            opts.set_body(&form);
        }
    }

    let request = Request::new_with_str_and_init(&req.url, &opts)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    let buffer = JsFuture::from(resp.array_buffer()?).await?;
    let body = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(HttpResponse {
        status: resp.status(),
        status_text: resp.status_text(),
        body,
    })
}

fn js_error_text(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| {
            js_sys::Reflect::get(e, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", e))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ApiClient<T: Transport = FetchTransport> {
    ctx: AppContext,
    config: ApiConfig,
    transport: T,
    platform: Rc<dyn Platform>,
}

impl ApiClient<FetchTransport> {
    /// Client wired to `fetch` and the real page.
    pub fn browser(ctx: AppContext, config: ApiConfig) -> Self {
        Self::new(ctx, config, FetchTransport, Rc::new(BrowserPlatform))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(ctx: AppContext, config: ApiConfig, transport: T, platform: Rc<dyn Platform>) -> Self {
        Self {
            ctx,
            config,
            transport,
            platform,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one request and classify the status. Never retries.
    async fn send(&self, endpoint: &str, opts: RequestOptions) -> Result<HttpResponse, ApiError> {
        let headers = merge_headers(
            &opts.headers,
            opts.method,
            &opts.body,
            self.ctx.token().as_deref(),
            self.ctx.csrf_token().as_deref(),
        );
        let request = HttpRequest {
            method: opts.method,
            url: self.config.url(endpoint),
            headers,
            body: opts.body,
        };
        debug_log!("{} {}", request.method.as_str(), request.url);

        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("{} failed: {}", endpoint, e);
            e
        })?;

        match response.status {
            200..=299 => Ok(response),
            401 => {
                platform::expire_session(&self.ctx, self.platform.as_ref(), MSG_SESSION_EXPIRED);
                Err(ApiError::Unauthorized)
            }
            status => {
                let message = envelope::error_message(&response.body)
                    .unwrap_or_else(|| response.status_text.clone());
                log::warn!("{} answered {}: {}", endpoint, status, message);
                Err(ApiError::Http { status, message })
            }
        }
    }

    /// Parsed JSON body of a successful response (`null` when empty).
    pub async fn call(&self, endpoint: &str, opts: RequestOptions) -> Result<Value, ApiError> {
        let response = self.send(endpoint, opts).await?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// `GET` and decode through the response envelope.
    pub async fn get_data<D: DeserializeOwned>(&self, endpoint: &str) -> Result<D, ApiError> {
        self.send_data(endpoint, RequestOptions::get()).await
    }

    /// Any method, decoded through the response envelope.
    pub async fn send_data<D: DeserializeOwned>(
        &self,
        endpoint: &str,
        opts: RequestOptions,
    ) -> Result<D, ApiError> {
        let response = self.send(endpoint, opts).await?;
        envelope::decode(&response.body)
    }

    /// Opaque bytes of a successful response (report downloads).
    pub async fn download(&self, endpoint: &str, opts: RequestOptions) -> Result<Vec<u8>, ApiError> {
        let opts = opts.with_header("Accept", "*/*");
        Ok(self.send(endpoint, opts).await?.body)
    }

    /// Bootstrap check of the stored token against `/auth/me`.
    ///
    /// Skipped without a token. On success the user lands in the session.
    /// Other failures are only logged; the server decides what to render.
    pub async fn check_auth_status(&self) -> Option<UserInfo> {
        self.ctx.token()?;
        match self.call("/auth/me", RequestOptions::get()).await {
            Ok(value) => match serde_json::from_value::<AuthMe>(value) {
                Ok(me) => {
                    self.ctx.set_current_user(me.user.clone());
                    me.user
                }
                Err(e) => {
                    log::warn!("unexpected /auth/me payload: {}", e);
                    None
                }
            },
            Err(e) => {
                log::warn!("auth check failed: {}", e);
                None
            }
        }
    }
}
