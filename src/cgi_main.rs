//! CGI環境でのエントリポイント
//!
//! CGI環境で実行される際のメインプログラム

use env_logger::Env;
use log::{error, info};
use cookie2json::{cgi, get_path_pattern, Configuration, Cookie2Json, Response};

#[tokio::main]
async fn main() {
    // ログ設定（標準エラー出力に出力）
    // CGIでは標準出力がHTTPレスポンスとなるため、ログは標準エラー出力に出力する
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("Starting cookie2json CGI application");

    // 設定エラーはリクエストを処理せず500を返す
    let app = match Configuration::load()
        .and_then(|config| Cookie2Json::builder().scope(get_path_pattern(), config))
    {
        Ok(builder) => builder.build(),
        Err(e) => {
            error!("Failed to initialise cookie2json: {}", e);
            cgi::error_logging::log_error_to_file(&format!("Configuration error: {}", e));
            let mut writer = cgi::CgiWriter::stdout();
            cookie2json::deliver(&Response::from_error(&e), &mut writer);
            std::process::exit(1);
        }
    };

    // CGI処理の実行
    if let Err(err) = cgi::run_cgi(app).await {
        error!("Error running CGI application: {:?}", err);
        std::process::exit(1);
    }
}
