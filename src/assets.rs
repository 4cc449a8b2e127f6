//! Static asset resolution.
//!
//! Sits in front of the delegate: read-only requests are checked against a
//! built-assets directory and then a public directory, and the first
//! regular file found at the request path is streamed out with an inferred
//! content type. Everything else falls through. A miss is never an error.

use std::path::{Path, PathBuf};

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Method, Response};
use tokio::fs::{self, File};

use crate::body::{Body, FileStream};
use crate::bridge::is_read_only;
use crate::mime;

/// Resolver over the two asset directories, consulted in order.
pub struct StaticAssets {
    roots: [PathBuf; 2],
}

impl StaticAssets {
    pub fn new(build_dir: impl Into<PathBuf>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            roots: [build_dir.into(), public_dir.into()],
        }
    }

    /// Returns a file response for the first directory containing a
    /// regular file at `path`, or `None` to defer to the delegate.
    ///
    /// Non-read-only methods are never served from disk. Paths that
    /// resolve to directories or special files are misses, as are paths
    /// carrying `..` segments.
    pub(crate) async fn resolve(&self, method: &Method, path: &str) -> Option<Response<Body>> {
        if !is_read_only(method) {
            return None;
        }
        let relative = sanitize(path)?;

        for root in &self.roots {
            let candidate = root.join(&relative);
            let Ok(meta) = fs::metadata(&candidate).await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Ok(file) = File::open(&candidate).await else {
                continue;
            };
            return Some(file_response(&candidate, file, meta.len(), method));
        }
        None
    }
}

/// Maps the request path onto a relative filesystem path.
///
/// Empty paths and paths containing a `..` segment resolve to nothing; the
/// request then falls through to the delegate instead of escaping the
/// asset roots.
fn sanitize(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let mut clean = PathBuf::new();
    for part in trimmed.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            part => clean.push(part),
        }
    }
    if clean.as_os_str().is_empty() { None } else { Some(clean) }
}

fn file_response(path: &Path, file: File, len: u64, method: &Method) -> Response<Body> {
    // HEAD gets the same headers with no payload.
    let body = if *method == Method::HEAD {
        Body::empty()
    } else {
        Body::file(FileStream::new(file, len))
    };

    let mut res = Response::new(body);
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(mime::from_path(path)));
    res.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
    res
}
