//! # HTTP メトリクスミドルウェア
//!
//! すべての HTTP リクエストについてメトリクスを収集する。

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::metrics::{
    normalize_path,
    record_http_duration,
    record_http_request,
    record_http_response,
};

/// HTTP メトリクスを収集するミドルウェア
///
/// 各リクエストについて以下を記録する:
/// - `http_requests_total`: 総リクエスト数（method, path ラベル）
/// - `http_responses_total`: 総レスポンス数（method, path, status ラベル）
/// - `http_request_duration_seconds`: 処理時間ヒストグラム
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    record_http_request(&method, &path);

    let response = next.run(request).await;

    let status = response.status().as_u16();
    record_http_response(&method, &path, status);
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}
