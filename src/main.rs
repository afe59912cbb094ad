use std::env;

use ga_timetable::handlers::{app, AppState};
use log::info;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let addr = env::var("GA_TIMETABLE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let app = app(AppState::new());

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
