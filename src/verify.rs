use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;

/// HTTP存活探测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 对 `http://<fqdn>/` 发起一次GET，返回状态码（包括4xx/5xx）
    async fn probe(&self, fqdn: &str, timeout: Duration) -> Result<u16, ProbeError>;
}

#[cfg(feature = "http-probe")]
pub use self::http::HttpProber;

#[cfg(feature = "http-probe")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use tokio::time::timeout;

    use super::Prober;
    use crate::error::{ConfigError, ProbeError};

    /// 基于 reqwest 的探测器，每个候选只请求一次，不重试
    #[derive(Clone)]
    pub struct HttpProber {
        client: Client,
    }

    impl HttpProber {
        pub fn new(timeout_duration: Duration) -> Result<Self, ConfigError> {
            let client = Client::builder()
                .timeout(timeout_duration)
                .danger_accept_invalid_certs(true) // 重定向到https时接受无效证书
                .build()
                .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

            Ok(HttpProber { client })
        }

        fn url_for(fqdn: &str) -> String {
            format!("http://{}/", fqdn)
        }
    }

    #[async_trait]
    impl Prober for HttpProber {
        async fn probe(&self, fqdn: &str, deadline: Duration) -> Result<u16, ProbeError> {
            let response = timeout(deadline, self.client.get(Self::url_for(fqdn)).send())
                .await
                .map_err(|_| ProbeError::Timeout)?
                .map_err(|e| {
                    if e.is_timeout() {
                        ProbeError::Timeout
                    } else {
                        ProbeError::Unreachable(e.to_string())
                    }
                })?;

            Ok(response.status().as_u16())
        }
    }

}
