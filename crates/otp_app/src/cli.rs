use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use otp_core::DEFAULT_LIMIT;
use otp_engine::{default_db_path, RetrievalConfig};

/// List recent one-time passcodes found in the Messages database as
/// launcher items.
#[derive(Debug, Parser)]
#[command(name = "otp-scan", version)]
pub struct Cli {
    /// Messages database to read [default: ~/Library/Messages/chat.db]
    #[arg(long = "db", env = "OTP_SCAN_DB", value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Maximum number of codes to list.
    #[arg(
        long,
        env = "OTP_SCAN_LIMIT",
        default_value_t = DEFAULT_LIMIT as u64,
        value_parser = clap::value_parser!(u64).range(1..=100)
    )]
    pub limit: u64,

    /// Directory for preview documents [default: system temp dir]
    #[arg(long, env = "OTP_SCAN_PREVIEW_DIR", value_name = "DIR")]
    pub preview_dir: Option<PathBuf>,

    /// Skip writing preview documents; items carry no quicklookurl.
    #[arg(long)]
    pub no_preview: bool,

    /// Also write log records to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log debug details to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print single-line JSON.
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    pub fn config(&self) -> RetrievalConfig {
        let mut config =
            RetrievalConfig::default_with_db(self.db_path.clone().unwrap_or_else(default_db_path));
        config.limit = usize::try_from(self.limit).unwrap_or(DEFAULT_LIMIT);
        if let Some(dir) = &self.preview_dir {
            config.preview_dir = dir.clone();
        }
        config
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use log::LevelFilter;

    use super::Cli;

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "otp-scan",
            "--db",
            "/data/chat.db",
            "--limit",
            "3",
            "--preview-dir",
            "/data/previews",
            "-v",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.db_path, PathBuf::from("/data/chat.db"));
        assert_eq!(config.limit, 3);
        assert_eq!(config.preview_dir, PathBuf::from("/data/previews"));
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn zero_limit_is_refused() {
        assert!(Cli::try_parse_from(["otp-scan", "--limit", "0"]).is_err());
    }
}
