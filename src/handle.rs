//! 单个候选域名的处理流程：解析，成功后按需探测HTTP

use std::net::IpAddr;
use std::time::Duration;

use tokio::time::timeout;

use crate::dns_resolver::Resolver;
use crate::error::{ProbeError, ResolveError};
use crate::model::{Candidate, ScanResult};
use crate::verify::Prober;

/// 解析并在外层再加一道截止时间，实现不守约时也不会拖住工作线程
pub async fn resolve_with_deadline(
    resolver: &dyn Resolver,
    fqdn: &str,
    deadline: Duration,
) -> Result<Vec<IpAddr>, ResolveError> {
    match timeout(deadline, resolver.resolve(fqdn, deadline)).await {
        Ok(result) => result,
        Err(_) => Err(ResolveError::Timeout),
    }
}

pub async fn probe_with_deadline(
    prober: &dyn Prober,
    fqdn: &str,
    deadline: Duration,
) -> Result<u16, ProbeError> {
    match timeout(deadline, prober.probe(fqdn, deadline)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout),
    }
}

/// 处理一个候选，解析失败返回 None
///
/// 失败分支一律丢弃，不逐条记录日志；探测失败只让 `http_status` 为空。
pub async fn check_candidate(
    candidate: &Candidate,
    resolver: &dyn Resolver,
    prober: Option<&dyn Prober>,
    deadline: Duration,
) -> Option<ScanResult> {
    let addresses = match resolve_with_deadline(resolver, &candidate.fqdn, deadline).await {
        Ok(addresses) if !addresses.is_empty() => addresses,
        _ => return None,
    };

    let http_status = match prober {
        Some(prober) => probe_with_deadline(prober, &candidate.fqdn, deadline).await.ok(),
        None => None,
    };

    Some(ScanResult {
        fqdn: candidate.fqdn.clone(),
        addresses,
        http_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticResolver(Result<Vec<IpAddr>, ResolveError>);

    #[async_trait]
    impl Resolver for StaticResolver {
        async fn resolve(&self, _fqdn: &str, _timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
            self.0.clone()
        }
    }

    struct SlowResolver;

    #[async_trait]
    impl Resolver for SlowResolver {
        async fn resolve(&self, _fqdn: &str, _timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
            // 故意忽略传入的超时
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec!["10.0.0.1".parse().unwrap()])
        }
    }

    struct StalledHttp;

    #[async_trait]
    impl Prober for StalledHttp {
        async fn probe(&self, _fqdn: &str, _timeout: Duration) -> Result<u16, ProbeError> {
            // 同样忽略传入的超时
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(200)
        }
    }

    struct StaticProber(Result<u16, ProbeError>);

    #[async_trait]
    impl Prober for StaticProber {
        async fn probe(&self, _fqdn: &str, _timeout: Duration) -> Result<u16, ProbeError> {
            self.0.clone()
        }
    }

    fn www() -> Candidate {
        Candidate::new("www", "example.com")
    }

    #[tokio::test]
    async fn test_resolved_without_probe() {
        let resolver = StaticResolver(Ok(vec!["93.184.216.34".parse().unwrap()]));
        let result = check_candidate(&www(), &resolver, None, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(result.fqdn, "www.example.com");
        assert_eq!(result.first_address(), Some("93.184.216.34".parse().unwrap()));
        assert_eq!(result.http_status, None);
    }

    #[tokio::test]
    async fn test_resolve_failures_yield_nothing() {
        for err in [
            ResolveError::NotFound,
            ResolveError::Timeout,
            ResolveError::Transient("refused".to_string()),
        ] {
            let resolver = StaticResolver(Err(err));
            assert!(check_candidate(&www(), &resolver, None, Duration::from_secs(1))
                .await
                .is_none());
        }
    }

    #[tokio::test]
    async fn test_empty_address_list_is_not_a_result() {
        let resolver = StaticResolver(Ok(Vec::new()));
        assert!(check_candidate(&www(), &resolver, None, Duration::from_secs(1))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_probe_status_and_failure() {
        let resolver = StaticResolver(Ok(vec!["93.184.216.34".parse().unwrap()]));

        let not_found = StaticProber(Ok(404));
        let result = check_candidate(&www(), &resolver, Some(&not_found), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(result.http_status, Some(404));

        let down = StaticProber(Err(ProbeError::Unreachable("connection refused".to_string())));
        let result = check_candidate(&www(), &resolver, Some(&down), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(result.http_status, None);
    }

    #[tokio::test]
    async fn test_deadline_wraps_slow_resolver() {
        let started = std::time::Instant::now();
        let result = resolve_with_deadline(&SlowResolver, "www.example.com", Duration::from_millis(50)).await;

        assert_eq!(result, Err(ResolveError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_deadline_wraps_stalled_http_check() {
        let started = std::time::Instant::now();
        let result = probe_with_deadline(&StalledHttp, "www.example.com", Duration::from_millis(50)).await;

        assert_eq!(result, Err(ProbeError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stalled_http_check_keeps_dns_result() {
        let resolver = StaticResolver(Ok(vec!["93.184.216.34".parse().unwrap()]));
        let result = check_candidate(&www(), &resolver, Some(&StalledHttp), Duration::from_millis(50))
            .await
            .unwrap();

        assert_eq!(result.fqdn, "www.example.com");
        assert_eq!(result.http_status, None);
    }
}
