use std::net::IpAddr;
use std::time::Duration;

/// 待测试的候选子域名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    pub fqdn: String,
}

impl Candidate {
    /// `fqdn = label + "." + domain`，构造后不再改变
    pub fn new(label: &str, domain: &str) -> Self {
        Candidate {
            label: label.to_string(),
            fqdn: format!("{}.{}", label, domain),
        }
    }
}

/// 成功解析的子域名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub fqdn: String,
    /// 解析器返回的地址，按原顺序，永不为空
    pub addresses: Vec<IpAddr>,
    /// 未启用探测或探测失败时为 None
    pub http_status: Option<u16>,
}

impl ScanResult {
    pub fn first_address(&self) -> Option<IpAddr> {
        self.addresses.first().copied()
    }
}

/// 一次扫描的汇总
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// 按完成顺序排列，不是字典顺序
    pub results: Vec<ScanResult>,
    pub total_candidates: usize,
    pub elapsed: Duration,
    /// 截止时间或外部取消使扫描提前停止领取候选
    pub cancelled: bool,
}

impl ScanSummary {
    pub fn found(&self) -> usize {
        self.results.len()
    }

    /// 按域名排序后的结果副本，用于需要稳定输出的场景
    pub fn sorted_by_fqdn(&self) -> Vec<ScanResult> {
        let mut sorted = self.results.clone();
        sorted.sort_by(|a, b| a.fqdn.cmp(&b.fqdn));
        sorted
    }
}
