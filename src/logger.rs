//! Severity-leveled logging façade, injected into every other
//! component so no component writes to the process's log sink directly.
//!
//! This is a thin naming convenience over `tracing`, not a competing
//! logging path: `Logger::info`/`err`/`debug` each emit a `tracing`
//! event tagged with the component name supplied at construction,
//! mirroring the reference's `logger.New("UDP HANDLER")` call sites.

#[derive(Clone, Debug)]
pub struct Logger {
    component: &'static str,
}

impl Logger {
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn info(&self, msg: &str) {
        tracing::info!(component = self.component, "{msg}");
    }

    pub fn err(&self, msg: &str) {
        tracing::error!(component = self.component, "{msg}");
    }

    pub fn debug(&self, msg: &str) {
        tracing::debug!(component = self.component, "{msg}");
    }
}
