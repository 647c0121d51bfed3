//! 错误类型
//!
//! 只有配置错误和输出错误会暴露给用户；单个候选域名的解析或探测失败
//! 在工作线程边界被吞掉，最多表现为"没有结果"或"没有HTTP状态码"。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 扫描开始前的致命配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target domain: {0:?}")]
    InvalidTarget(String),

    #[error("Wordlist not found: {}", .0.display())]
    WordlistNotFound(PathBuf),

    #[error("failed to read wordlist {}: {source}", .path.display())]
    WordlistUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("wordlist contains no usable labels")]
    EmptyWordlist,

    #[error("thread count must be greater than zero")]
    InvalidWorkerCount,

    #[error("timeout must be a positive, finite number of seconds (got {0})")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// 单个候选域名的DNS解析失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// NXDOMAIN 或者没有 A/AAAA 记录
    #[error("name not found")]
    NotFound,

    #[error("lookup timed out")]
    Timeout,

    #[error("transient resolver failure: {0}")]
    Transient(String),
}

/// 单个候选域名的HTTP探测失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("probe timed out")]
    Timeout,
}

/// 写出结果文件失败，只在扫描结束时报告一次
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write results to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize result record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 对外暴露的顶层错误
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl ScanError {
    /// 进程退出码：配置错误为2，输出错误为1
    pub fn exit_code(&self) -> u8 {
        match self {
            ScanError::Config(_) => 2,
            ScanError::Output(_) => 1,
        }
    }
}
