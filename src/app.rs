//! Process-scoped context and the per-request pipeline.
//!
//! [`App`] replaces what the original layer kept as module-level state: the
//! compiled delegate, the asset directories, and the run mode live in one
//! object constructed at startup and passed explicitly into the listener's
//! connection closures. Tests inject fake delegates through the same
//! constructor and drive [`App::handle`] directly, no socket required.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response, StatusCode};
use hyper::body::Body as HttpBody;
use tracing::{debug, error};

use crate::assets::StaticAssets;
use crate::body::{BoxError, OutboundBody};
use crate::bridge;
use crate::handler::{BoxedHandler, Handler};
use crate::signal::AbortGuard;

// ── Run mode ──────────────────────────────────────────────────────────────────

/// The process runtime mode, threaded into every [`LoadContext`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    /// Reads `APP_ENV`. Anything other than `production` means development.
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request context handed to the delegate alongside the standard
/// request.
#[derive(Clone, Copy, Debug)]
pub struct LoadContext {
    pub mode: RunMode,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Everything one running process needs to answer requests: the rendering
/// delegate, the static asset resolver, and the run mode. Built once,
/// shared read-only across connections.
pub struct App {
    delegate: BoxedHandler,
    assets: StaticAssets,
    mode: RunMode,
}

impl App {
    /// Wraps `delegate` with the default asset directories (`build`, then
    /// `public`) and the run mode from the environment.
    pub fn new(delegate: impl Handler) -> Self {
        Self {
            delegate: delegate.into_boxed_handler(),
            assets: StaticAssets::new("build", "public"),
            mode: RunMode::from_env(),
        }
    }

    /// Overrides the two asset directories, consulted in this order.
    pub fn static_dirs(
        mut self,
        build_dir: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
    ) -> Self {
        self.assets = StaticAssets::new(build_dir, public_dir);
        self
    }

    /// Overrides the run mode (tests mostly; processes read `APP_ENV`).
    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn run_mode(&self) -> RunMode {
        self.mode
    }

    /// The per-request pipeline: static asset resolution, request
    /// translation, delegate invocation, response translation.
    ///
    /// An asset hit short-circuits before the delegate and before any
    /// translation of the inbound request. Otherwise the request is
    /// translated (picking up an abort signal that fires if this future is
    /// dropped before the delegate resolves) and handed to the delegate. A
    /// delegate error is this layer's boundary: it is logged and answered
    /// with a generic `500`, the hosting-side equivalent of an unhandled
    /// exception becoming a generic server error.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<OutboundBody>
    where
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        if let Some(asset) = self.assets.resolve(req.method(), req.uri().path()).await {
            return bridge::to_outbound(asset).await;
        }

        let guard = AbortGuard::new();
        let standard = match bridge::to_standard(req, guard.signal()) {
            Ok(standard) => standard,
            Err(e) => {
                debug!("inbound request rejected: {e}");
                return plain_status(StatusCode::BAD_REQUEST, "Bad Request");
            }
        };

        let ctx = LoadContext { mode: self.mode };
        let result = self.delegate.call(standard, ctx).await;
        guard.disarm();

        match result {
            Ok(response) => bridge::to_outbound(response).await,
            Err(e) => {
                error!("delegate failed: {e}");
                plain_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn plain_status(status: StatusCode, text: &'static str) -> Response<OutboundBody> {
    let mut res = Response::new(OutboundBody::buffered(Bytes::from_static(text.as_bytes())));
    *res.status_mut() = status;
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_labels() {
        assert_eq!(RunMode::Development.as_str(), "development");
        assert_eq!(RunMode::Production.to_string(), "production");
        assert!(RunMode::Development.is_development());
        assert!(!RunMode::Production.is_development());
    }
}
