use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use jmdict_db::{LoadMode, load_index};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::fmt::format::{DefaultFields, Format};

use jmresolve::{AppState, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DICT_PATH: &str = "JMdict_e.json";
const DEFAULT_MAX_FRAGMENTS: usize = 2000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using dictionary at {} (mode: {:?})",
        config.dict_path.display(),
        config.load_mode
    );
    match &config.kana_path {
        Some(path) => info!("using kana table at {}", path.display()),
        None => info!("using built-in katakana table"),
    }

    let start = Instant::now();
    let loader = {
        let dict_path = config.dict_path.clone();
        let kana_path = config.kana_path.clone();
        let mode = config.load_mode;
        tokio::task::spawn_blocking(move || load_index(&dict_path, kana_path.as_deref(), mode))
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {addr}, waiting for dictionary");

    let index = loader
        .await
        .context("dictionary loader did not finish")?
        .with_context(|| format!("loading {}", config.dict_path.display()))?;
    info!("dictionary ready in {} ms", start.elapsed().as_millis());

    let state = AppState {
        index: Arc::new(index),
        max_fragments: config.max_fragments,
    };
    let app = router(state).layer(TraceLayer::new_for_http());

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    dict_path: PathBuf,
    kana_path: Option<PathBuf>,
    load_mode: LoadMode,
    max_fragments: usize,
}

fn load_config() -> Config {
    let mut cli_dict: Option<PathBuf> = None;
    let mut cli_kana: Option<PathBuf> = None;
    let mut cli_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dict" => cli_dict = args.next().map(PathBuf::from),
            "--kana" => cli_kana = args.next().map(PathBuf::from),
            _ => {
                if let Some(path) = arg.strip_prefix("--dict=") {
                    cli_dict = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--kana=") {
                    cli_kana = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_mode = LoadMode::parse(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let dict_path = cli_dict
        .or_else(|| env::var("JMDICT_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DICT_PATH));
    let kana_path = cli_kana.or_else(|| {
        env::var("KANA_TABLE_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });
    let load_mode = cli_mode
        .or_else(|| {
            env::var("JMDICT_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(LoadMode::parse)
        })
        .unwrap_or(LoadMode::Mmap);
    let max_fragments = env::var("MAX_FRAGMENTS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_FRAGMENTS);

    Config {
        host,
        port,
        dict_path,
        kana_path,
        load_mode,
        max_fragments,
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    subscriber(env_filter).init();
}

fn subscriber(env_filter: EnvFilter) -> SubscriberBuilder<DefaultFields, Format, EnvFilter> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
}
