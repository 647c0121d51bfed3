use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::time::timeout;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError as DnsError, ResolveErrorKind};
use trust_dns_resolver::TokioAsyncResolver;

use crate::error::ResolveError;

/// 正向解析接口
///
/// 引擎只依赖这个trait，测试里可以换成确定性的实现。
#[async_trait]
pub trait Resolver: Send + Sync {
    /// 解析 `fqdn` 的 A/AAAA 记录，超过 `timeout` 返回 [`ResolveError::Timeout`]
    async fn resolve(&self, fqdn: &str, timeout: Duration) -> Result<Vec<IpAddr>, ResolveError>;
}

/// 基于 trust-dns 的解析器，无缓存
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    /// 优先使用系统的 resolv.conf，读取失败时退回默认上游
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = match trust_dns_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!("读取系统DNS配置失败，使用默认上游: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        DnsResolver::with_config(config, opts)
    }

    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        debug!("DNS上游数量: {}", config.name_servers().len());
        DnsResolver {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn resolve(&self, fqdn: &str, deadline: Duration) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = timeout(deadline, self.resolver.lookup_ip(absolute_name(fqdn).as_str()))
            .await
            .map_err(|_| ResolveError::Timeout)?
            .map_err(classify)?;

        let addresses: Vec<IpAddr> = lookup.iter().collect();
        if addresses.is_empty() {
            return Err(ResolveError::NotFound);
        }
        Ok(addresses)
    }
}

/// 加上结尾的点，避免解析器追加 resolv.conf 里的 search 后缀
fn absolute_name(fqdn: &str) -> String {
    if fqdn.ends_with('.') {
        fqdn.to_string()
    } else {
        format!("{}.", fqdn)
    }
}

fn classify(err: DnsError) -> ResolveError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => ResolveError::NotFound,
        ResolveErrorKind::Timeout => ResolveError::Timeout,
        _ => ResolveError::Transient(err.to_string()),
    }
}
