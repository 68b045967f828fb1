//! CLI - コマンドライン引数と環境変数
//!
//! 優先順位: コマンドライン > 環境変数 > デフォルト値

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use neuro_core::domain::BackendName;

#[derive(Debug, Parser)]
#[command(
    name = "neuro-news",
    version,
    about = "Attach generated illustrations to news articles"
)]
pub struct Cli {
    /// Minutes each backend sleeps after taking its turn
    #[arg(long, env = "NEURO_DELTA_MINUTES", default_value_t = 1)]
    pub delta_minutes: u64,

    /// Enabled backends, one worker each (repeatable or comma separated)
    #[arg(
        long = "backend",
        env = "NEURO_BACKENDS",
        value_delimiter = ',',
        default_values = ["kandinsky", "fruity"]
    )]
    pub backends: Vec<BackendName>,

    /// Generation endpoint per backend, as NAME=URL
    #[arg(long = "endpoint", value_parser = parse_assignment)]
    pub endpoints: Vec<(BackendName, String)>,

    /// API key per backend, as NAME=KEY. Falls back to NEURO_<NAME>_API_KEY
    #[arg(long = "api-key", value_parser = parse_assignment)]
    pub api_keys: Vec<(BackendName, String)>,

    /// Request timeout for remote backends, in seconds
    #[arg(long, env = "NEURO_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Generate placeholder images locally instead of calling remote services
    #[arg(long, env = "NEURO_OFFLINE")]
    pub offline: bool,

    /// JSON file with articles to seed the in-memory source
    #[arg(long, env = "NEURO_ARTICLES")]
    pub articles: Option<PathBuf>,

    #[arg(long, env = "NEURO_LOG_MODE", value_enum, default_value_t = LogMode::Development)]
    pub log_mode: LogMode,

    #[arg(long, env = "NEURO_LOG_FILE", default_value = "logs/neuro-news.log")]
    pub log_file: PathBuf,
}

/// ログ出力モード
/// - development: コンソール + ファイル、debug 以上
/// - production: ファイルのみ、warn 以上
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    Development,
    Production,
}

impl Cli {
    pub fn endpoint_for(&self, backend: &BackendName) -> Option<&str> {
        lookup(&self.endpoints, backend)
    }

    /// `--api-key` wins over the environment.
    pub fn api_key_for(&self, backend: &BackendName) -> Option<String> {
        lookup(&self.api_keys, backend)
            .map(str::to_string)
            .or_else(|| std::env::var(api_key_env(backend)).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

fn lookup<'a>(pairs: &'a [(BackendName, String)], backend: &BackendName) -> Option<&'a str> {
    // 後から指定したものが優先
    pairs
        .iter()
        .rev()
        .find(|(name, _)| name == backend)
        .map(|(_, value)| value.as_str())
}

pub fn api_key_env(backend: &BackendName) -> String {
    let name: String = backend
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("NEURO_{name}_API_KEY")
}

fn parse_assignment(raw: &str) -> Result<(BackendName, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = BackendName::new(name).map_err(|e| e.to_string())?;
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("empty value for backend `{name}`"));
    }
    Ok((name, value.to_string()))
}
