use std::{sync::Arc, time::Duration};

use axum::{
    body::{boxed, Full},
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use tracing::debug;

use super::{CachedPage, PageCache};

const KEY_PREFIX: &str = "index_page";

/// What the caching middleware needs: the store and how long entries live.
#[derive(Clone)]
pub struct PageCacheState {
    pub cache: Arc<dyn PageCache>,
    pub ttl: Duration,
}

impl PageCacheState {
    pub fn new(cache: Arc<dyn PageCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Drops every stored page, so the next request renders fresh.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

fn cache_key<B>(request: &Request<B>) -> String {
    let uri = request.uri();
    match uri.query() {
        Some(query) => format!("{KEY_PREFIX}:{}?{query}", uri.path()),
        None => format!("{KEY_PREFIX}:{}", uri.path()),
    }
}

/// Serves GET requests from the page cache and stores fresh `200 OK` renders.
pub async fn index_page_cache<B>(
    Extension(state): Extension<PageCacheState>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request);
    if let Some(cached) = state.cache.get(&key) {
        debug!(cache = "page", outcome = "hit", key = %key, "serving cached page");
        return build_response(cached);
    }
    debug!(cache = "page", outcome = "miss", key = %key, "rendering page");

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match hyper::body::to_bytes(body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to buffer page for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cached = CachedPage {
        status: parts.status.as_u16(),
        headers: parts
            .headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect(),
        body: bytes.clone(),
    };
    state.cache.set(&key, cached, state.ttl);

    Response::from_parts(parts, boxed(Full::from(bytes)))
}

fn build_response(cached: CachedPage) -> Response {
    let mut builder = Response::builder().status(cached.status);
    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }
    builder
        .body(boxed(Full::from(cached.body)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
