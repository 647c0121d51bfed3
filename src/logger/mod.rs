use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::HashMap;
use std::io::{IsTerminal, Write};

/// 带颜色标签的日志输出，写到stderr，stdout只留给扫描结果
pub struct Logger {
    use_colors: bool,
    max_level: LevelFilter,
    labels: HashMap<Level, &'static str>,
}

impl Logger {
    pub fn new(max_level: LevelFilter) -> Self {
        let mut labels = HashMap::new();
        labels.insert(Level::Error, "Error");
        labels.insert(Level::Warn, "Warning");
        labels.insert(Level::Info, "INFO");
        labels.insert(Level::Debug, "DEBUG");
        labels.insert(Level::Trace, "TRACE");

        Logger {
            use_colors: true,
            max_level,
            labels,
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn wrap(&self, label: &str, level: Level) -> String {
        if !self.use_colors {
            return label.to_string();
        }

        match level {
            Level::Error => label.red().to_string(),
            Level::Warn => label.yellow().to_string(),
            Level::Info => label.blue().to_string(),
            Level::Debug => label.magenta().to_string(),
            Level::Trace => label.normal().to_string(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let label = self.labels.get(&record.level()).copied().unwrap_or("LOG");
        format!("[{}] {}", self.wrap(label, record.level()), record.args())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let _ = writeln!(std::io::stderr(), "{}", self.format(record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `-v` 次数对应的日志级别，默认只显示警告和错误
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_logger(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = level_for_verbosity(verbose);
    let mut logger = Logger::new(level);
    if !std::io::stderr().is_terminal() {
        logger = logger.without_colors();
    }
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}
