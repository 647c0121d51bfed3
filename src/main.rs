use std::process::ExitCode;

use clap::Parser;
use colored::*;
use log::{info, warn};

use subdomain_finder::error::ScanError;
use subdomain_finder::input::{load_wordlist, Opts};
use subdomain_finder::logger;
use subdomain_finder::output::{format_done, format_found, write_json_lines};
use subdomain_finder::ScanEngine;

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();

    if let Err(e) = logger::init_logger(opts.verbose) {
        eprintln!("日志初始化失败: {}", e);
    }

    // 执行扫描
    match run_scan(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// 加载字典、执行扫描、输出结果
async fn run_scan(opts: Opts) -> Result<(), ScanError> {
    let config = opts.scan_config()?;
    let labels = load_wordlist(&opts.wordlist)?;
    info!("从 {} 加载了 {} 个字典条目", opts.wordlist.display(), labels.len());

    let engine = ScanEngine::from_config(config, labels)?;

    // Ctrl-C 只停止领取新的候选，已有结果照常输出
    let cancel = engine.cancel_handle();
    let progress = engine.progress();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(
                "收到中断信号，等待在途请求结束 (已领取 {}/{})",
                progress.claimed(),
                progress.total()
            );
            cancel.cancel();
        }
    });

    let sort = opts.sort;
    let summary = engine
        .run_with(|result| {
            if !sort {
                println!("{}", format_found(result));
            }
        })
        .await;
    interrupt.abort();

    if sort {
        for result in summary.sorted_by_fqdn() {
            println!("{}", format_found(&result));
        }
    }
    println!("{}", format_done(summary.found(), summary.elapsed));

    if let Some(path) = &opts.output {
        let written = write_json_lines(path, &summary.results)?;
        info!("结果已写入: {} ({} 条)", path.display(), written);
    }

    Ok(())
}
