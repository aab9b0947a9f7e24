mod app;
mod blocks;
mod config;
mod ctx;
mod db;
mod errors;
mod notes;
mod tags;
mod templates;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

pub use config::config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};

#[tokio::main]
async fn main() -> errors::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldnotes=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let conn = init_db().await?;

    let app = app::create(conn).layer(TraceLayer::new_for_http());

    let port = config().port;
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await.unwrap();

    tracing::info!("listening on http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();

    Ok(())
}

#[cfg(test)]
pub mod tests {
    use axum_test::TestServer;

    use crate::{errors::Result, DB};

    pub async fn test_server(db: DB) -> Result<TestServer> {
        let app = crate::app::create(db);

        let server = TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .mock_transport()
            .build(app)
            .unwrap();

        Ok(server)
    }
}
