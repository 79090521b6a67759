//! axum middleware that preloads sections for every request.
//!
//! Handlers read the result with `Extension<Content>`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, instrument};

use crate::application::loader::ContentClient;
use crate::domain::ids::SectionIds;
use crate::domain::options::LoadOptions;

/// Shared state for [`content_layer`].
#[derive(Clone)]
pub struct ContentState {
    pub client: Arc<ContentClient>,
    pub ids: SectionIds,
    pub options: LoadOptions,
}

impl ContentState {
    pub fn new(client: Arc<ContentClient>, ids: impl Into<SectionIds>) -> Self {
        Self {
            client,
            ids: ids.into(),
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }
}

/// Load the configured sections and attach them to the request.
///
/// Edit mode set to `querystring` is resolved against this request's query.
/// A failed load short-circuits with `502 Bad Gateway`.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn content_layer(
    State(state): State<ContentState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let query = request.uri().query().map(str::to_string);

    let loaded = state
        .client
        .load_for_query(state.ids.clone(), &state.options, query.as_deref())
        .await;

    match loaded {
        Ok(content) => {
            request.extensions_mut().insert(content);
            next.run(request).await
        }
        Err(err) => {
            error!(
                target = "tessera::http::content",
                kind = ?err.kind(),
                error = %err,
                "failed to load content for request"
            );
            (StatusCode::BAD_GATEWAY, "Content unavailable").into_response()
        }
    }
}
