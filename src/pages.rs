//! The demonstration site: a small server-rendered page tree implementing
//! the delegate contract.
//!
//! Routes mirror a layout/outlet structure: `/test-route` is a layout with
//! an index child, a static nested child, and a dynamic segment child whose
//! loader receives the route parameter. Pages are plain `format!`-built
//! HTML; the adapter does not care how the bytes are produced.
//!
//! Failure surfaces live here, not in the adapter: unknown paths get the
//! site's 404 page, non-read-only methods a 405, and a loader error the
//! error boundary page (with the message visible in development mode only).

use std::sync::Arc;

use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Request, Response, StatusCode};
use matchit::Router;

use crate::app::{LoadContext, RunMode};
use crate::body::{Body, BoxError};
use crate::bridge::is_read_only;
use crate::handler::Handler;

/// The site as a rendering delegate. Hand it to [`App::new`](crate::App::new).
pub fn site() -> impl Handler {
    let site = Arc::new(Site::new());
    move |req: Request<Body>, ctx: LoadContext| {
        let site = Arc::clone(&site);
        async move { site.respond(req, ctx).await }
    }
}

#[derive(Clone, Copy)]
enum Page {
    Home,
    TestIndex,
    TestNested,
    TestSegment,
}

struct Site {
    routes: Router<Page>,
}

impl Site {
    fn new() -> Self {
        let mut routes = Router::new();
        for (path, page) in [
            ("/", Page::Home),
            ("/test-route", Page::TestIndex),
            ("/test-route/nested", Page::TestNested),
            // The bare path still reaches the segment page; its loader then
            // fails on the missing parameter and the error boundary renders.
            ("/test-route/segmented", Page::TestSegment),
            ("/test-route/segmented/{segment}", Page::TestSegment),
        ] {
            routes
                .insert(path, page)
                .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        }
        Self { routes }
    }

    async fn respond(
        &self,
        req: Request<Body>,
        ctx: LoadContext,
    ) -> Result<Response<Body>, BoxError> {
        if !is_read_only(req.method()) {
            return Ok(method_not_allowed());
        }

        let path = req.uri().path();
        let Ok(matched) = self.routes.at(path) else {
            return Ok(not_found());
        };
        let page = *matched.value;
        let segment = matched.params.get("segment").map(str::to_owned);

        let response = match page {
            Page::Home => html(StatusCode::OK, render_home()),
            Page::TestIndex => html(StatusCode::OK, in_layout(INDEX_SECTION)),
            Page::TestNested => html(StatusCode::OK, in_layout(NESTED_SECTION)),
            Page::TestSegment => match segment_loader(segment.as_deref()).await {
                Ok(data) => html(StatusCode::OK, in_layout(&render_segment(&data))),
                Err(err) => error_boundary(ctx.mode, &err),
            },
        };
        Ok(response)
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

struct SegmentData {
    segment: String,
}

/// Loader of the dynamic segment page. A missing or empty parameter is a
/// generic error that surfaces through the error boundary.
async fn segment_loader(segment: Option<&str>) -> Result<SegmentData, BoxError> {
    let segment = segment.filter(|s| !s.is_empty()).ok_or("Missing segment")?;
    Ok(SegmentData {
        segment: segment.to_owned(),
    })
}

// ── Rendering ─────────────────────────────────────────────────────────────────

const INDEX_SECTION: &str = "<section>\n<h2>Test Route</h2>\n<p>This should render correctly</p>\n<a href=\"/test-route/nested\">Here's a link to a nested route</a>\n<br />\n<a href=\"/test-route/segmented\">Here's a link to a nested route with a dynamic segment</a>\n</section>";

const NESTED_SECTION: &str = "<section>\n<h2>Nested Dynamic Route</h2>\n<p>This should render correctly</p>\n</section>";

fn render_segment(data: &SegmentData) -> String {
    format!(
        "<section>\n<h2>Nested Dynamic Route</h2>\n<p>This should render correctly</p>\n<p>Segment: {}</p>\n</section>",
        escape(&data.segment)
    )
}

fn render_home() -> String {
    document(
        "Home",
        "<main>\n<h1>Welcome</h1>\n<ul>\n<li><a href=\"/test-route\">Test route</a></li>\n</ul>\n</main>",
    )
}

/// Wraps a child section in the test-route layout and the document shell.
fn in_layout(outlet: &str) -> String {
    document(
        "Test Route",
        &format!("<main>\n<h1>Test Route Layout</h1>\n<div class=\"p-4\">\n{outlet}\n</div>\n</main>"),
    )
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n<title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

// ── Boundary pages ────────────────────────────────────────────────────────────

fn html(status: StatusCode, markup: String) -> Response<Body> {
    let mut res = Response::new(Body::full(markup));
    *res.status_mut() = status;
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    res
}

fn not_found() -> Response<Body> {
    html(
        StatusCode::NOT_FOUND,
        document(
            "Not Found",
            "<main>\n<h1>404</h1>\n<p>There is no page at this address</p>\n</main>",
        ),
    )
}

fn method_not_allowed() -> Response<Body> {
    let mut res = html(
        StatusCode::METHOD_NOT_ALLOWED,
        document("Method Not Allowed", "<main>\n<h1>405</h1>\n</main>"),
    );
    res.headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    res
}

/// The site's standard error boundary: loader failures become a generic
/// 500 page. The message is shown in development and withheld in
/// production.
fn error_boundary(mode: RunMode, err: &BoxError) -> Response<Body> {
    let detail = if mode.is_development() {
        format!("<pre>{}</pre>\n", escape(&err.to_string()))
    } else {
        String::new()
    };
    html(
        StatusCode::INTERNAL_SERVER_ERROR,
        document(
            "Application Error",
            &format!("<main>\n<h1>Application Error</h1>\n{detail}</main>"),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn ctx(mode: RunMode) -> LoadContext {
        LoadContext { mode }
    }

    async fn get(site: &Site, path: &str, mode: RunMode) -> (StatusCode, String) {
        let req = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let res = site.respond(req, ctx(mode)).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect_bytes().await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn nested_child_renders_without_segment() {
        let site = Site::new();
        let (status, html) = get(&site, "/test-route/nested", RunMode::Development).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<h1>Test Route Layout</h1>"));
        assert!(html.contains("<h2>Nested Dynamic Route</h2>"));
        assert!(!html.contains("Segment"));
    }

    #[tokio::test]
    async fn segment_page_renders_loader_data() {
        let site = Site::new();
        let (status, html) = get(&site, "/test-route/segmented/abc", RunMode::Development).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Segment: abc"));
    }

    #[tokio::test]
    async fn segment_values_are_escaped() {
        let site = Site::new();
        let (_, html) = get(&site, "/test-route/segmented/a&b", RunMode::Development).await;
        assert!(html.contains("Segment: a&amp;b"));
    }

    #[tokio::test]
    async fn missing_segment_hits_the_error_boundary() {
        let site = Site::new();
        let (status, html) = get(&site, "/test-route/segmented", RunMode::Development).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(html.contains("Application Error"));
        assert!(html.contains("Missing segment"));
    }

    #[tokio::test]
    async fn production_error_boundary_withholds_the_message() {
        let site = Site::new();
        let (status, html) = get(&site, "/test-route/segmented", RunMode::Production).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(html.contains("Application Error"));
        assert!(!html.contains("Missing segment"));
    }

    #[tokio::test]
    async fn unknown_path_is_the_site_404() {
        let site = Site::new();
        let (status, html) = get(&site, "/no-such-page", RunMode::Development).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("404"));
    }

    #[tokio::test]
    async fn non_read_only_methods_get_405() {
        let site = Site::new();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/test-route")
            .body(Body::empty())
            .unwrap();
        let res = site
            .respond(req, ctx(RunMode::Development))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers().get(ALLOW).unwrap(), "GET, HEAD");
    }
}
