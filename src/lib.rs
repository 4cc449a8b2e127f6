//! # gantry
//!
//! Bridges a hyper server to a web-standard request-handling contract.
//!
//! ## The contract
//!
//! A rendering delegate is an async function from a standard request plus a
//! small per-request context to a standard response. gantry owns everything
//! between the socket and that function:
//!
//! - **Static assets** — read-only requests are checked against a
//!   built-assets directory and a public directory before the delegate ever
//!   runs; the first regular file found is streamed back.
//! - **Request translation** — hyper's inbound request becomes an
//!   `http::Request<Body>` with an absolute URL, verbatim headers, an abort
//!   signal that fires on client disconnect, and (for methods that carry
//!   one) the inbound body as a half-duplex stream.
//! - **Response translation** — the delegate's response is written back as
//!   status, every header entry, and a streamed or buffered body.
//! - **Hosting** — tokio accept loop, HTTP/1.1 + HTTP/2 via hyper-util,
//!   graceful shutdown, and a generic `500` for delegate errors.
//!
//! What gantry deliberately does not own: routing and rendering. Those live
//! behind the delegate ([`pages`] ships a small server-rendered site as the
//! reference delegate).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use gantry::{App, Server, pages};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = App::new(pages::site()).static_dirs("build", "public");
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```
//!
//! A delegate is any async function with the right shape:
//!
//! ```rust
//! use gantry::{App, Body, BoxError, LoadContext};
//! use http::{Request, Response};
//!
//! async fn delegate(
//!     req: Request<Body>,
//!     ctx: LoadContext,
//! ) -> Result<Response<Body>, BoxError> {
//!     let markup = format!("<p>{} in {} mode</p>", req.uri().path(), ctx.mode);
//!     Ok(Response::new(Body::full(markup)))
//! }
//!
//! let app = App::new(delegate);
//! ```

mod app;
mod assets;
mod body;
mod error;
mod handler;
mod server;
mod signal;

pub mod bridge;
pub mod mime;
pub mod pages;

pub use app::{App, LoadContext, RunMode};
pub use assets::StaticAssets;
pub use body::{Body, BoxError, OutboundBody};
pub use error::Error;
pub use handler::Handler;
pub use server::Server;
pub use signal::{AbortGuard, AbortSignal};
