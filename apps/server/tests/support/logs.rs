use std::io;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink for capturing the service's JSON records.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(self.0.clone())
    }
}

impl CapturedLogs {
    /// Every captured line, parsed as one JSON record.
    pub fn records(&self) -> Vec<Value> {
        let bytes = self.0.lock().expect("log sink").clone();
        String::from_utf8(bytes)
            .expect("utf-8 log output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("each log line is one JSON record"))
            .collect()
    }

    pub fn with_message(&self, message: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r["message"] == message)
            .collect()
    }
}

/// Correlation id of a record.
pub fn record_request_id(record: &Value) -> Option<&str> {
    record.get("requestId").and_then(|v| v.as_str())
}
