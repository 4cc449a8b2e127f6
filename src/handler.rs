//! The rendering delegate contract, and its type erasure.
//!
//! # The contract
//!
//! A delegate is an async function taking the translated standard request
//! plus a small per-request [`LoadContext`], and resolving to a standard
//! response or an error. The adapter never looks inside: how a delegate
//! turns a URL into a response (a page tree, a proxy, a fixture in a test)
//! is its own business. Errors it returns are converted into a generic
//! server failure by the hosting listener, not by this layer.
//!
//! # How delegates are stored
//!
//! The [`App`](crate::App) must hold a delegate of an arbitrary concrete
//! type behind one field, so the concrete type is hidden behind a trait
//! object. The chain from user code to vtable call is:
//!
//! ```text
//! async fn render(req, ctx) -> Result<Response<Body>, BoxError> { … }
//!        ↓ App::new(render)
//! render.into_boxed_handler()              ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(render))              ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! delegate.call(req, ctx)  at request time ← one vtable dispatch
//! ```
//!
//! The only runtime cost per request is one Arc clone plus one virtual
//! call, negligible next to the network I/O around it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Request, Response};

use crate::app::LoadContext;
use crate::body::{Body, BoxError};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to a standard response.
///
/// `Pin<Box<…>>` because the runtime polls the future in place; `Send`
/// so tokio may move it across worker threads.
pub(crate) type BoxFuture =
    Pin<Box<dyn Future<Output = Result<Response<Body>, BoxError>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request<Body>, ctx: LoadContext) -> BoxFuture;
}

/// A heap-allocated, type-erased delegate shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid rendering delegate.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or capturing closure) with the signature:
///
/// ```text
/// async fn name(req: Request<Body>, ctx: LoadContext) -> Result<Response<Body>, E>
/// ```
///
/// for any error type convertible into [`BoxError`]. The trait is sealed:
/// only the blanket impl below can satisfy it, which keeps the delegate
/// surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, E> private::Sealed for F
where
    F: Fn(Request<Body>, LoadContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<Body>, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
}

impl<F, Fut, E> Handler for F
where
    F: Fn(Request<Body>, LoadContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<Body>, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete delegate `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, E> ErasedHandler for FnHandler<F>
where
    F: Fn(Request<Body>, LoadContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Body>, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn call(&self, req: Request<Body>, ctx: LoadContext) -> BoxFuture {
        let fut = (self.0)(req, ctx);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}
