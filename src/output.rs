use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OutputError;
use crate::model::ScanResult;

/// 结果文件中的一行，多个地址时只保留第一个
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLineRecord {
    pub subdomain: String,
    pub ip: Option<String>,
    pub http_status: Option<u16>,
}

impl From<&ScanResult> for JsonLineRecord {
    fn from(result: &ScanResult) -> Self {
        JsonLineRecord {
            subdomain: result.fqdn.clone(),
            ip: result.first_address().map(|ip| ip.to_string()),
            http_status: result.http_status,
        }
    }
}

/// 控制台输出的一行
pub fn format_found(result: &ScanResult) -> String {
    format!(
        "FOUND: {} -> {} (http={})",
        result.fqdn,
        display_ip(result.first_address()),
        result
            .http_status
            .map_or("None".to_string(), |status| status.to_string())
    )
}

fn display_ip(ip: Option<IpAddr>) -> String {
    ip.map_or("None".to_string(), |ip| ip.to_string())
}

pub fn format_done(found: usize, elapsed: Duration) -> String {
    format!(
        "Done. {} subdomains found in {:.2}s",
        found,
        elapsed.as_secs_f64()
    )
}

/// 以JSON lines格式追加写入结果文件
///
/// 需要时创建父目录，所有记录写完后统一flush，任何失败只报告一次。
pub fn write_json_lines(path: &Path, results: &[ScanResult]) -> Result<usize, OutputError> {
    let io_error = |source: std::io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    for result in results {
        let line = serde_json::to_string(&JsonLineRecord::from(result))?;
        writeln!(writer, "{}", line).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)?;

    Ok(results.len())
}
