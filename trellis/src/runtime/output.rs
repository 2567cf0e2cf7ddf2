// Where `print` output goes. The default routes through the logging facade;
// tests capture lines in memory.

use std::sync::Mutex;

pub trait OutputWriter: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Forwards each line to `log::info!`.
#[derive(Debug, Default)]
pub struct LogOutputWriter;

impl OutputWriter for LogOutputWriter {
    fn write_line(&self, line: &str) {
        log::info!("{line}");
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct LineOutputWriter {
    lines: Mutex<Vec<String>>,
}

impl LineOutputWriter {
    pub fn new() -> LineOutputWriter {
        LineOutputWriter::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("output lock poisoned").clone()
    }
}

impl OutputWriter for LineOutputWriter {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .expect("output lock poisoned")
            .push(line.to_string());
    }
}
