//! # Prometheus メトリクス
//!
//! HTTP リクエストメトリクスを収集し、`/metrics` エンドポイントで公開する。
//!
//! ## 収集するメトリクス
//!
//! | 名前 | 種別 | ラベル |
//! |------|------|--------|
//! | `http_requests_total` | Counter | method, path |
//! | `http_responses_total` | Counter | method, path, status |
//! | `http_request_duration_seconds` | Histogram | method, path |

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus メトリクスレコーダーを設定しハンドルを返す
///
/// 返り値のハンドルは `/metrics` ハンドラがレンダリングに使用する。
///
/// # パニック
///
/// レコーダーが既にインストールされている場合はパニックする
/// （プロセス起動時に一度だけ呼び出すこと）。
pub fn setup_metrics_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )
        .expect("ヒストグラムバケットの設定に失敗しました")
        .install_recorder()
        .expect("Prometheus レコーダーのインストールに失敗しました")
}

/// パスラベルを正規化する
///
/// UUID セグメントを `{id}` に置き換え、メトリクスのカーディナリティ爆発を防ぐ。
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.parse::<uuid::Uuid>().is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// HTTP リクエストカウンターを増加させる
pub fn record_http_request(method: &str, path: &str) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .increment(1);
}

/// HTTP レスポンスカウンターを増加させる
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP リクエスト処理時間を記録する
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}
