use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::dns_resolver::{DnsResolver, Resolver};
use crate::error::ConfigError;
use crate::handle;
use crate::model::{Candidate, ScanResult, ScanSummary};
use crate::state::{ScanPhase, ScanState};
use crate::verify::Prober;

/// 单个标签和整个域名的长度上限
const MAX_LABEL_LEN: usize = 63;
const MAX_DOMAIN_LEN: usize = 253;

/// 扫描配置
///
/// 构造一次后整个扫描期间不再修改，按值传给引擎。
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 目标域名，已规范化（小写、无结尾的点）
    pub target_domain: String,
    /// 工作线程数量
    pub worker_count: usize,
    /// 解析和探测各自的超时
    pub network_timeout: Duration,
    /// 是否在解析成功后做HTTP探测
    pub http_enabled: bool,
    /// 整体截止时间，到期后不再领取新的候选
    pub max_runtime: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            target_domain: String::new(),
            worker_count: 20,
            network_timeout: Duration::from_secs(5),
            http_enabled: true,
            max_runtime: None,
        }
    }
}

impl ScanConfig {
    pub fn new(
        target: &str,
        worker_count: usize,
        network_timeout: Duration,
        http_enabled: bool,
    ) -> Result<Self, ConfigError> {
        let config = ScanConfig {
            target_domain: normalize_target(target),
            worker_count,
            network_timeout,
            http_enabled,
            max_runtime: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_runtime(mut self, max_runtime: Option<Duration>) -> Self {
        self.max_runtime = max_runtime;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_target(&self.target_domain)?;
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.network_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!("{:?}", self.network_timeout)));
        }
        if let Some(limit) = self.max_runtime {
            if limit.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!("{:?}", limit)));
            }
        }
        Ok(())
    }
}

/// 去掉首尾空白和结尾的点，转为小写
pub fn normalize_target(target: &str) -> String {
    target.trim().to_lowercase().trim_end_matches('.').to_string()
}

fn validate_target(domain: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidTarget(domain.to_string());

    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return Err(invalid());
    }
    for label in domain.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(invalid());
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid());
        }
    }
    Ok(())
}

/// 外部取消句柄，可以在其他任务里触发
#[derive(Debug, Clone)]
pub struct ScanCancel {
    token: CancellationToken,
}

impl ScanCancel {
    /// 停止领取新的候选，在途的请求继续跑完或超时
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// 扫描进度的只读视图
#[derive(Debug, Clone)]
pub struct ScanProgress {
    state: Arc<ScanState>,
}

impl ScanProgress {
    pub fn phase(&self) -> ScanPhase {
        self.state.phase()
    }

    pub fn total(&self) -> usize {
        self.state.total()
    }

    pub fn claimed(&self) -> usize {
        self.state.claimed()
    }

    pub fn found(&self) -> usize {
        self.state.found()
    }
}

/// 子域名扫描引擎
///
/// 固定数量的工作任务从同一个FIFO队列领取候选，解析成功（以及可选的探测）
/// 后把结果发到收集端。结果按完成顺序排列。
pub struct ScanEngine {
    config: ScanConfig,
    state: Arc<ScanState>,
    resolver: Arc<dyn Resolver>,
    prober: Option<Arc<dyn Prober>>,
    cancel: CancellationToken,
}

/// 每个工作任务持有的上下文
struct WorkerContext {
    state: Arc<ScanState>,
    resolver: Arc<dyn Resolver>,
    prober: Option<Arc<dyn Prober>>,
    timeout: Duration,
    cancel: CancellationToken,
    results: mpsc::UnboundedSender<ScanResult>,
}

impl ScanEngine {
    /// 创建引擎，配置错误或空字典时直接失败，不会开始扫描
    pub fn new(
        config: ScanConfig,
        labels: Vec<String>,
        resolver: Arc<dyn Resolver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if labels.is_empty() {
            return Err(ConfigError::EmptyWordlist);
        }

        let candidates: Vec<Candidate> = labels
            .iter()
            .map(|label| Candidate::new(label, &config.target_domain))
            .collect();

        Ok(ScanEngine {
            config,
            state: Arc::new(ScanState::new(candidates)),
            resolver,
            prober: None,
            cancel: CancellationToken::new(),
        })
    }

    /// 使用真实的DNS解析器，以及（启用时）HTTP探测器
    pub fn from_config(config: ScanConfig, labels: Vec<String>) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = Arc::new(DnsResolver::new(config.network_timeout));
        let http_enabled = config.http_enabled;
        let timeout = config.network_timeout;
        let mut engine = ScanEngine::new(config, labels, resolver)?;

        if http_enabled {
            if let Some(prober) = default_prober(timeout)? {
                engine = engine.with_prober(prober);
            }
        }
        Ok(engine)
    }

    /// 设置探测器；只有 `http_enabled` 为真时才会调用
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn cancel_handle(&self) -> ScanCancel {
        ScanCancel {
            token: self.cancel.clone(),
        }
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            state: self.state.clone(),
        }
    }

    /// 执行扫描并收集所有结果
    pub async fn run(self) -> ScanSummary {
        self.run_with(|_| {}).await
    }

    /// 执行扫描，每收到一个结果就回调一次
    pub async fn run_with<F>(self, mut on_result: F) -> ScanSummary
    where
        F: FnMut(&ScanResult),
    {
        let started = Instant::now();
        self.state.set_phase(ScanPhase::Running);
        info!(
            "开始扫描 {}: {} 个候选, {} 个工作任务, 超时 {:?}, HTTP探测: {}",
            self.config.target_domain,
            self.state.total(),
            self.config.worker_count,
            self.config.network_timeout,
            self.config.http_enabled && self.prober.is_some()
        );

        let prober = if self.config.http_enabled {
            if self.prober.is_none() {
                warn!("已启用HTTP探测但没有设置探测器，结果不会带状态码");
            }
            self.prober.clone()
        } else {
            None
        };

        let (results_send, mut results_recv) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        for id in 0..self.config.worker_count {
            let ctx = WorkerContext {
                state: self.state.clone(),
                resolver: self.resolver.clone(),
                prober: prober.clone(),
                timeout: self.config.network_timeout,
                cancel: self.cancel.clone(),
                results: results_send.clone(),
            };
            workers.spawn(run_worker(id, ctx));
        }
        // 只保留工作任务手里的发送端，全部退出后接收循环自然结束
        drop(results_send);

        let deadline = self.config.max_runtime.map(|limit| {
            let token = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        warn!("达到整体截止时间 {:?}，停止领取新的候选", limit);
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        });

        let mut results = Vec::new();
        while let Some(result) = results_recv.recv().await {
            self.state.record_found();
            on_result(&result);
            results.push(result);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("工作任务异常退出: {}", e);
            }
        }
        if let Some(handle) = deadline {
            handle.abort();
        }

        self.state.set_phase(ScanPhase::Completed);
        let elapsed = started.elapsed();
        let cancelled = self.state.claimed() < self.state.total();
        if cancelled {
            warn!(
                "扫描被中断: 已处理 {}/{} 个候选",
                self.state.claimed(),
                self.state.total()
            );
        }
        info!("扫描完成: 发现 {} 个子域名, 用时 {:?}", results.len(), elapsed);

        ScanSummary {
            results,
            total_candidates: self.state.total(),
            elapsed,
            cancelled,
        }
    }
}

/// 便捷的扫描函数：真实DNS解析器加（启用时）HTTP探测器，收集全部结果
pub async fn scan_subdomains(
    config: ScanConfig,
    labels: Vec<String>,
) -> Result<ScanSummary, ConfigError> {
    let engine = ScanEngine::from_config(config, labels)?;
    Ok(engine.run().await)
}

#[cfg(feature = "http-probe")]
fn default_prober(timeout: Duration) -> Result<Option<Arc<dyn Prober>>, ConfigError> {
    let prober = crate::verify::HttpProber::new(timeout)?;
    Ok(Some(Arc::new(prober)))
}

#[cfg(not(feature = "http-probe"))]
fn default_prober(_timeout: Duration) -> Result<Option<Arc<dyn Prober>>, ConfigError> {
    warn!("未编译 http-probe 功能，跳过HTTP探测");
    Ok(None)
}

async fn run_worker(id: usize, ctx: WorkerContext) {
    trace!("工作任务 {} 启动", id);
    loop {
        if ctx.cancel.is_cancelled() {
            let dropped = ctx.state.close();
            if dropped > 0 {
                debug!("工作任务 {} 放弃了 {} 个未领取的候选", id, dropped);
            }
            break;
        }

        let Some(candidate) = ctx.state.claim() else {
            break;
        };

        let checked = handle::check_candidate(
            &candidate,
            ctx.resolver.as_ref(),
            ctx.prober.as_deref(),
            ctx.timeout,
        )
        .await;

        if let Some(result) = checked {
            if ctx.results.send(result).is_err() {
                break;
            }
        }
    }
    trace!("工作任务 {} 退出", id);
}
