use std::time::Instant;
use tracing_subscriber::fmt::{
    format,
    time::FormatTime,
};

/// Time since the test started, e.g. ` 56ms`, ` 1.23s` or `2m03.40s`.
pub(super) struct CompactTimer {
    start: Instant,
}

impl CompactTimer {
    pub(super) fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl FormatTime for CompactTimer {
    fn format_time(
        &self,
        w: &mut format::Writer<'_>,
    ) -> std::fmt::Result {
        let millis = self.start.elapsed().as_millis();
        if millis < 1000 {
            write!(w, "{:3}ms", millis)
        } else if millis < 60_000 {
            write!(w, "{:5.2}s", millis as f64 / 1000.0)
        } else {
            let minutes = millis / 60_000;
            let remaining_ms = millis % 60_000;
            write!(w, "{}m{:05.2}s", minutes, remaining_ms as f64 / 1000.0)
        }
    }
}
