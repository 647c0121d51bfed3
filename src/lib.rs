//! # subdomain_finder
//!
//! 基于字典的子域名发现工具库：把字典中的每个标签拼接到目标域名上做DNS解析，
//! 解析成功后可选地发起一次HTTP请求检查存活。
//!
//! ## 特性
//!
//! - 🚀 **并发扫描**: 固定数量的工作任务共享一个FIFO候选队列，隐藏网络延迟
//! - ⏱️ **时间有界**: 每次解析/探测都有超时，支持整体截止时间和外部取消
//! - 🧩 **可替换后端**: 解析器和探测器都是trait，测试时可以注入确定性实现
//! - 📄 **JSON lines输出**: 每行一个 `{"subdomain", "ip", "http_status"}` 记录
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use subdomain_finder::{ScanConfig, ScanEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::new("example.com", 20, Duration::from_secs(5), true)?;
//!     let labels = vec!["www".to_string(), "mail".to_string()];
//!
//!     let engine = ScanEngine::from_config(config, labels)?;
//!     let summary = engine.run().await;
//!
//!     println!("发现 {} 个子域名", summary.found());
//!     for result in &summary.results {
//!         println!("  {} -> {:?} (http={:?})", result.fqdn, result.addresses, result.http_status);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 自定义解析器
//!
//! ```rust,no_run
//! use std::net::IpAddr;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use subdomain_finder::{Resolver, ResolveError, ScanConfig, ScanEngine};
//!
//! struct Fixed;
//!
//! #[async_trait]
//! impl Resolver for Fixed {
//!     async fn resolve(&self, fqdn: &str, _timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
//!         if fqdn.starts_with("www.") {
//!             Ok(vec!["10.0.0.1".parse().unwrap()])
//!         } else {
//!             Err(ResolveError::NotFound)
//!         }
//!     }
//! }
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::new("example.com", 4, Duration::from_secs(1), false)?;
//! let engine = ScanEngine::new(config, vec!["www".into(), "ftp".into()], Arc::new(Fixed))?;
//! let summary = engine.run().await;
//! assert_eq!(summary.found(), 1);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod dns_resolver;
pub mod error;
pub mod handle;
pub mod input;
pub mod logger;
pub mod model;
pub mod output;
pub mod state;
pub mod verify;

// 重新导出主要的公共API
pub use api::{scan_subdomains, ScanCancel, ScanConfig, ScanEngine, ScanProgress};
pub use model::{Candidate, ScanResult, ScanSummary};
pub use state::ScanPhase;

pub use dns_resolver::{DnsResolver, Resolver};
pub use error::{ConfigError, OutputError, ProbeError, ResolveError, ScanError};
pub use verify::Prober;
#[cfg(feature = "http-probe")]
pub use verify::HttpProber;

pub use input::{load_wordlist, Opts};
pub use output::{write_json_lines, JsonLineRecord};
