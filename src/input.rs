use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::api::ScanConfig;
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "subdomain_finder")]
#[command(version)]
#[command(about = "Find subdomains by resolving wordlist labels, optionally probing them over HTTP", long_about = None)]
pub struct Opts {
    /// target domain, e.g. example.com
    #[arg(short = 't', long)]
    pub target: String,

    /// wordlist path, one label per line
    #[arg(short = 'w', long)]
    pub wordlist: PathBuf,

    /// number of concurrent workers
    #[arg(short = 'T', long, default_value_t = 20)]
    pub threads: usize,

    /// network timeout in seconds, applied to DNS and HTTP separately
    #[arg(long, default_value_t = 5.0)]
    pub timeout: f64,

    /// write found subdomains to this file (JSON lines, appended)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// skip HTTP probing
    #[arg(long = "no-http")]
    pub no_http: bool,

    /// overall deadline in seconds; no new candidates are started afterwards
    #[arg(long = "max-time")]
    pub max_time: Option<f64>,

    /// print results sorted by name after the scan instead of as they arrive
    #[arg(long)]
    pub sort: bool,

    /// increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Opts {
    /// 命令行参数转换为扫描配置，数值和目标域名在这里校验
    pub fn scan_config(&self) -> Result<ScanConfig, ConfigError> {
        let timeout = parse_seconds(self.timeout)?;
        let max_runtime = self.max_time.map(parse_seconds).transpose()?;

        Ok(ScanConfig::new(&self.target, self.threads, timeout, !self.no_http)?
            .with_max_runtime(max_runtime))
    }
}

/// 秒数转为 Duration，拒绝非正数和非有限值
pub fn parse_seconds(seconds: f64) -> Result<Duration, ConfigError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(ConfigError::InvalidTimeout(seconds.to_string()));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::InvalidTimeout(seconds.to_string()))
}

/// 从文件加载字典
///
/// 去掉每行首尾空白，跳过空行和 `#` 开头的注释行；保留顺序和重复项。
/// 非UTF-8内容按有损方式解码。
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, ConfigError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::WordlistNotFound(path.to_path_buf())
        } else {
            ConfigError::WordlistUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    Ok(parse_wordlist(&String::from_utf8_lossy(&bytes)))
}

pub fn parse_wordlist(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults() {
        let opts = Opts::try_parse_from(["subdomain_finder", "-t", "example.com", "-w", "words.txt"]).unwrap();

        assert_eq!(opts.target, "example.com");
        assert_eq!(opts.wordlist, PathBuf::from("words.txt"));
        assert_eq!(opts.threads, 20);
        assert_eq!(opts.timeout, 5.0);
        assert!(opts.output.is_none());
        assert!(!opts.no_http);
        assert!(opts.max_time.is_none());
        assert_eq!(opts.verbose, 0);

        let config = opts.scan_config().unwrap();
        assert!(config.http_enabled);
        assert_eq!(config.network_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_full_flags() {
        let opts = Opts::try_parse_from([
            "subdomain_finder",
            "--target",
            "example.com",
            "--wordlist",
            "words.txt",
            "-T",
            "50",
            "--timeout",
            "0.5",
            "-o",
            "out/found.jsonl",
            "--no-http",
            "--max-time",
            "30",
            "-vv",
        ])
        .unwrap();

        let config = opts.scan_config().unwrap();
        assert_eq!(config.worker_count, 50);
        assert_eq!(config.network_timeout, Duration::from_millis(500));
        assert!(!config.http_enabled);
        assert_eq!(config.max_runtime, Some(Duration::from_secs(30)));
        assert_eq!(opts.output, Some(PathBuf::from("out/found.jsonl")));
        assert_eq!(opts.verbose, 2);
    }

    #[test]
    fn test_missing_required_args() {
        assert!(Opts::try_parse_from(["subdomain_finder", "-t", "example.com"]).is_err());
        assert!(Opts::try_parse_from(["subdomain_finder", "-w", "words.txt"]).is_err());
        assert!(Opts::try_parse_from(["subdomain_finder", "-t", "a.com", "-w", "w", "-T", "x"]).is_err());
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        let opts = Opts::try_parse_from(["subdomain_finder", "-t", "example.com", "-w", "w", "-T", "0"]).unwrap();
        assert!(matches!(opts.scan_config(), Err(ConfigError::InvalidWorkerCount)));

        let opts = Opts::try_parse_from(["subdomain_finder", "-t", "example.com", "-w", "w", "--timeout=-1"]).unwrap();
        assert!(matches!(opts.scan_config(), Err(ConfigError::InvalidTimeout(_))));

        assert_err!(parse_seconds(0.0));
        assert_err!(parse_seconds(f64::NAN));
        assert_err!(parse_seconds(f64::INFINITY));
        assert_ok!(parse_seconds(0.25));
    }

    #[test]
    fn test_load_wordlist() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\n  b  \n#comment\n\n   \nc\na\n").unwrap();

        let labels = load_wordlist(file.path()).unwrap();
        assert_eq!(labels, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_load_wordlist_lossy_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"www\n\xff\xfebad\nmail\n").unwrap();

        let labels = load_wordlist(file.path()).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], "www");
        assert_eq!(labels[2], "mail");
    }

    #[test]
    fn test_load_wordlist_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_wordlist(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(ConfigError::WordlistNotFound(_))));
    }
}
