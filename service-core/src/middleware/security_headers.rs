use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Adds hardening headers to every response.
///
/// HTML pages get a same-origin CSP that still allows the inline styles and
/// the small inline script of the tracker UI; everything else (JSON, blobs)
/// gets a deny-all policy. A CSP already set by the handler is left alone.
pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let mut response = next.run(req).await;

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));

    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if headers.contains_key(header::CONTENT_SECURITY_POLICY) {
        return response;
    }

    if is_html {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; \
                 frame-ancestors 'none'",
            ),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router, body::Body, http::Request, middleware::from_fn, response::Html, routing::get,
    };
    use tower::ServiceExt;

    const SANDBOX: &str = "sandbox; default-src 'none'";

    fn app() -> Router {
        Router::new()
            .route("/page", get(|| async { Html("<p>hi</p>") }))
            .route(
                "/file",
                get(|| async {
                    (
                        [
                            (header::CONTENT_TYPE, "text/html"),
                            (header::CONTENT_SECURITY_POLICY, SANDBOX),
                        ],
                        "<script></script>",
                    )
                }),
            )
            .layer(from_fn(security_headers_middleware))
    }

    async fn csp(uri: &str) -> String {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn html_pages_get_the_page_policy() {
        assert!(csp("/page").await.contains("script-src 'self' 'unsafe-inline'"));
    }

    #[tokio::test]
    async fn handler_policy_is_not_replaced() {
        assert_eq!(csp("/file").await, SANDBOX);
    }
}
