use configuration::load_config;

// This main function is the entry point when running `cargo run -p web-server`.
// It serves whatever `config.toml` in the working directory describes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = web_server::telemetry::init_tracing();
    let settings = load_config(None)?;
    web_server::run_server(settings).await
}
