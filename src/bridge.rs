//! Request and response translation.
//!
//! The two directions of the adapter. [`to_standard`] turns the server
//! library's inbound request into the vendor-neutral `http` request the
//! delegate consumes; [`to_outbound`] turns the delegate's standard
//! response into the response hyper writes out. Exactly one standard
//! request is derived per inbound request and exactly one outbound
//! response per standard response; nothing here is reused across
//! connections.

use bytes::Bytes;
use http::header::HOST;
use http::{Method, Request, Response, Uri};
use hyper::body::Body as HttpBody;

use crate::body::{Body, BoxError, OutboundBody};
use crate::signal::AbortSignal;

/// Whether `method` is read-only (no meaningful request body, safely
/// repeatable). Read-only requests may be answered by the static asset
/// resolver and never carry a translated body stream.
pub fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// Builds the standard request from an inbound one.
///
/// The URL becomes absolute: scheme (from the request target if present,
/// `http` otherwise), authority (request target, else the `host` header,
/// else `localhost`), and the original path plus query. Headers are copied
/// verbatim; malformed values pass through untouched. `signal` lands in the
/// request extensions so the delegate can observe client disconnects.
///
/// For methods that may carry a body the inbound body is attached as a
/// stream: the request streams in while the response has not begun
/// (half-duplex). Read-only methods get an empty body.
///
/// The only rejection this layer produces is an authority that fails the
/// constructed [`Uri`]'s own validation.
pub fn to_standard<B>(req: Request<B>, signal: AbortSignal) -> Result<Request<Body>, http::Error>
where
    B: HttpBody<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();

    let scheme = parts.uri.scheme_str().unwrap_or("http");
    let authority = parts
        .uri
        .authority()
        .map(|a| a.as_str().to_owned())
        .or_else(|| {
            parts
                .headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "localhost".to_owned());
    let path_and_query = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());

    let uri = Uri::try_from(format!("{scheme}://{authority}{path_and_query}"))?;

    let standard_body = if is_read_only(&parts.method) {
        Body::empty()
    } else {
        Body::wrap(body)
    };

    let mut standard = Request::new(standard_body);
    *standard.method_mut() = parts.method;
    *standard.uri_mut() = uri;
    *standard.version_mut() = parts.version;
    *standard.headers_mut() = parts.headers;
    standard.extensions_mut().insert(signal);
    Ok(standard)
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// Builds the outbound response from a standard one.
///
/// Status first, then every header entry (a name with multiple values is
/// copied once per value), then the body: a body with frames left is piped
/// out as a stream, an ended body is sent as a single buffered payload.
/// Absent and zero-length bodies take the same buffered path, so a `204`
/// goes out with a zero-length payload rather than an error.
pub async fn to_outbound(res: Response<Body>) -> Response<OutboundBody> {
    let (parts, body) = res.into_parts();

    let mut out = Response::new(OutboundBody::buffered(Bytes::new()));
    *out.status_mut() = parts.status;
    *out.version_mut() = parts.version;
    for (name, value) in &parts.headers {
        out.headers_mut().append(name, value.clone());
    }

    if !body.is_end_stream() {
        *out.body_mut() = OutboundBody::streamed(body);
    } else if let Ok(payload) = body.collect_bytes().await {
        *out.body_mut() = OutboundBody::buffered(payload);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::AbortGuard;
    use http::header::{HeaderValue, SET_COOKIE};
    use http::StatusCode;
    use http_body_util::{BodyExt, Empty, Full};

    fn signal() -> AbortSignal {
        let guard = AbortGuard::new();
        let signal = guard.signal();
        guard.disarm();
        signal
    }

    #[test]
    fn absolute_url_from_host_header() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/test-route/nested?tab=2")
            .header(HOST, "example.com:3000")
            .body(Empty::<Bytes>::new())
            .unwrap();

        let standard = to_standard(req, signal()).unwrap();
        assert_eq!(
            standard.uri().to_string(),
            "http://example.com:3000/test-route/nested?tab=2"
        );
    }

    #[test]
    fn missing_host_falls_back_to_localhost() {
        let req = Request::builder()
            .uri("/")
            .body(Empty::<Bytes>::new())
            .unwrap();

        let standard = to_standard(req, signal()).unwrap();
        assert_eq!(standard.uri().to_string(), "http://localhost/");
    }

    #[test]
    fn invalid_authority_is_rejected() {
        let req = Request::builder()
            .uri("/")
            .header(HOST, "not a host")
            .body(Empty::<Bytes>::new())
            .unwrap();

        assert!(to_standard(req, signal()).is_err());
    }

    #[test]
    fn headers_survive_verbatim_including_repeats() {
        let req = Request::builder()
            .uri("/")
            .header("a", "1")
            .header("b", "2")
            .header("x-tag", "first")
            .header("x-tag", "second")
            .body(Empty::<Bytes>::new())
            .unwrap();

        let standard = to_standard(req, signal()).unwrap();
        assert_eq!(standard.headers().get("a").unwrap(), "1");
        assert_eq!(standard.headers().get("b").unwrap(), "2");
        let tags: Vec<_> = standard.headers().get_all("x-tag").iter().collect();
        assert_eq!(tags, ["first", "second"]);
    }

    #[tokio::test]
    async fn read_only_methods_carry_no_body() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/")
            .body(Full::new(Bytes::from("ignored")))
            .unwrap();

        let standard = to_standard(req, signal()).unwrap();
        assert!(standard.body().is_end_stream());
    }

    #[tokio::test]
    async fn other_methods_stream_the_inbound_body() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/submit")
            .body(Full::new(Bytes::from("payload")))
            .unwrap();

        let standard = to_standard(req, signal()).unwrap();
        assert!(!standard.body().is_end_stream());
        let collected = standard.into_body().collect_bytes().await.unwrap();
        assert_eq!(collected, Bytes::from("payload"));
    }

    #[test]
    fn signal_lands_in_extensions() {
        let req = Request::builder()
            .uri("/")
            .body(Empty::<Bytes>::new())
            .unwrap();

        let standard = to_standard(req, signal()).unwrap();
        assert!(standard.extensions().get::<AbortSignal>().is_some());
    }

    #[tokio::test]
    async fn outbound_preserves_status_and_repeated_headers() {
        let mut res = Response::new(Body::full("ok"));
        *res.status_mut() = StatusCode::CREATED;
        res.headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("a=1"));
        res.headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = to_outbound(res).await;
        assert_eq!(out.status(), StatusCode::CREATED);
        let cookies: Vec<_> = out.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
        assert_eq!(
            out.into_body().collect().await.unwrap().to_bytes(),
            Bytes::from("ok")
        );
    }

    #[tokio::test]
    async fn outbound_204_with_empty_body_is_zero_length() {
        let mut res = Response::new(Body::empty());
        *res.status_mut() = StatusCode::NO_CONTENT;

        let out = to_outbound(res).await;
        assert_eq!(out.status(), StatusCode::NO_CONTENT);
        assert!(out.into_body().collect().await.unwrap().to_bytes().is_empty());
    }
}
