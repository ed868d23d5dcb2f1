use std::env;
use std::process::exit;

use redlite::config::Config;
use redlite::server;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = match args.len() {
        1 => Config::load(None),
        2 => Config::load(Some(&args[1])),
        _ => {
            eprintln!("Usage: redlite-server [/path/to/redlite.conf]");
            exit(1);
        }
    };

    if let Err(e) = server::run(config).await {
        log::error!("fatal: {e}");
        exit(1);
    }
}
