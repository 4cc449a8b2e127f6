//! The demonstration site behind the gantry adapter.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example site
//!
//! Try:
//!   curl http://localhost:3000/test-route
//!   curl http://localhost:3000/test-route/nested
//!   curl http://localhost:3000/test-route/segmented/abc
//!   curl http://localhost:3000/styles.css

use gantry::{App, Server, pages};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Built assets first, then the public directory; everything else goes
    // to the site delegate. Run mode comes from APP_ENV.
    let app = App::new(pages::site()).static_dirs("build", "public");

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}
