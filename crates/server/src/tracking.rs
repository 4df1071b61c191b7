//! Request tracking middleware
//!
//! Times every request passing through the router and records an
//! observation once the response has been produced.

use crate::api::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use telemetry_lib::RequestInfo;

pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let timer = state.monitor.start_request();
    let method = request.method().to_string();
    let endpoint = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    let observation = state
        .monitor
        .finish_request(
            timer,
            RequestInfo {
                endpoint,
                method,
                status_code: response.status().as_u16(),
                user_agent,
            },
        )
        .await;

    let threshold_ms = state.slow_request_threshold.as_secs_f64() * 1000.0;
    if observation.response_time_ms >= threshold_ms {
        state.logger.log_slow_request(
            &observation.method,
            &observation.endpoint,
            observation.response_time_ms,
            threshold_ms,
        );
    }

    response
}
