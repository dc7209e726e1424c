#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    if let Err(e) = parish_api_rust::routes::serve(None).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
