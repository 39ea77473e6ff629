use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use supervise::errors::Result;
use supervise::reload::{ReloadBackend, ReloadOutput};

/// A fake reload backend that:
/// - counts how often it was asked to reload
/// - answers every call with a canned `ReloadOutput`.
pub struct FakeReloader {
    output: ReloadOutput,
    calls: Arc<Mutex<usize>>,
}

impl FakeReloader {
    pub fn succeeding(stdout: &str) -> Self {
        Self::with_output(ReloadOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            code: Some(0),
        })
    }

    pub fn failing(code: i32, stderr: &str) -> Self {
        Self::with_output(ReloadOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            code: Some(code),
        })
    }

    pub fn with_output(output: ReloadOutput) -> Self {
        Self {
            output,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ReloadBackend for FakeReloader {
    fn reload(&mut self) -> Pin<Box<dyn Future<Output = Result<ReloadOutput>> + Send + '_>> {
        let output = self.output.clone();
        let calls = Arc::clone(&self.calls);

        Box::pin(async move {
            *calls.lock().unwrap() += 1;
            Ok(output)
        })
    }
}
