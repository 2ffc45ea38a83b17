use chat_relay::config::AppConfig;
use std::io::Write;

#[tokio::main]
async fn main() {
    // default level is info, RUST_LOG overrides
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = AppConfig::from_env();
    log::info!(
        "Starting chat-relay on {}:{} (backend {})",
        config.server_host,
        config.server_port,
        config.backend_base_url
    );

    if let Err(e) = chat_relay::server::start(config).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
