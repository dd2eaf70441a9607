/// Receives the pipeline's progress notes. `level` grows with verbosity: 0 is
/// worth showing to a user, 3 and above is tracing detail.
pub trait DiagnosticSink {
    fn emit(&self, message: &str, level: u8);
}

/// Forwards diagnostics to `tracing`: level 0 as info, 1 and 2 as debug,
/// anything higher as trace.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, message: &str, level: u8) {
        match level {
            0 => tracing::info!(target: "unfurl", "{message}"),
            1 | 2 => tracing::debug!(target: "unfurl", level, "{message}"),
            _ => tracing::trace!(target: "unfurl", level, "{message}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _message: &str, _level: u8) {}
}

impl<F: Fn(&str, u8)> DiagnosticSink for F {
    fn emit(&self, message: &str, level: u8) {
        self(message, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn closures_are_sinks() {
        let seen = RefCell::new(Vec::new());
        let sink = |message: &str, level: u8| seen.borrow_mut().push((message.to_string(), level));
        sink.emit("Tmpdir: /tmp/unfurl-x", 1);
        NullSink.emit("dropped", 0);
        assert_eq!(*seen.borrow(), vec![("Tmpdir: /tmp/unfurl-x".to_string(), 1)]);
    }
}
