use env_logger::Env;
use log::{error, info};

use cookie2json::{Configuration, Cookie2Json, get_path_pattern};

#[tokio::main]
async fn main() {
    // ロガーの初期化
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // 設定の読み込み（起動時に一度だけ）
    let config = match Configuration::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // アプリケーションの構築
    let app = match Cookie2Json::builder().scope(get_path_pattern(), config) {
        Ok(builder) => builder.build(),
        Err(e) => {
            error!("Failed to build application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting cookie2json application");

    #[cfg(feature = "cloud_run")]
    {
        let port = match cookie2json::get_listen_port() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error parsing port: {}", e);
                std::process::exit(1);
            }
        };
        let host = "0.0.0.0";
        info!("Running as HTTP server on port {}", port);
        if let Err(e) = cookie2json::cloudrun::run_cloud_run(app, host, port).await {
            eprintln!("Cloud Run error: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "cloud_run"))]
    {
        let _ = app;
        println!("Please enable the 'cloud_run' feature to run the HTTP server.");
        println!("Example: cargo run --features cloud_run --bin cookie2json-server");
        std::process::exit(1);
    }
}
