use std::{
    fs,
    io::{
        self,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};
use tracing::{
    Dispatch,
    Level,
};
use tracing_subscriber::{
    EnvFilter,
    Layer,
    layer::SubscriberExt,
};

use super::{
    config::TracingConfig,
    panic::install_panic_hook,
    timer::CompactTimer,
};
use crate::graph::TestGraph;

/// File writer flushing after every write, so logs survive a panicking test.
#[derive(Clone)]
struct FlushingWriter {
    file: Arc<Mutex<fs::File>>,
}

impl FlushingWriter {
    fn new(file: fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
    fn lock(&self) -> Option<std::sync::MutexGuard<'_, fs::File>> {
        self.file.lock().ok().or_else(|| {
            self.file.clear_poison();
            self.file.lock().ok()
        })
    }
}

impl Write for FlushingWriter {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        let Some(mut file) = self.lock() else {
            return Err(io::Error::other("failed to acquire log file lock"));
        };
        let written = file.write(buf)?;
        file.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn filter(
    directives: Option<&str>,
    level: Level,
) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

/// Guard owning the tracing dispatcher of one test.
///
/// Dropping it without a panic in flight deletes the log file, unless
/// success logs are kept.
pub struct TestTracing {
    log_file_path: Option<PathBuf>,
    keep_success_logs: bool,
    _dispatcher: Dispatch,
    _guard: tracing::dispatcher::DefaultGuard,
}

impl TestTracing {
    pub fn init(test_name: &str) -> Self {
        Self::init_with_config(test_name, TracingConfig::default())
    }

    pub fn init_with_config(
        test_name: &str,
        config: TracingConfig,
    ) -> Self {
        install_panic_hook(config.panic.clone());

        let log_file = if config.log_to_file {
            let path = config.log_dir.join(format!("{}.log", test_name));
            match fs::create_dir_all(&config.log_dir)
                .and_then(|_| fs::File::create(&path))
            {
                Ok(file) => Some((path, FlushingWriter::new(file))),
                Err(e) => {
                    eprintln!(
                        "Warning: cannot create log file {}: {}",
                        path.display(),
                        e
                    );
                    None
                },
            }
        } else {
            None
        };

        let stdout_layer = config.log_to_stdout.then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_span_events(config.span_events.clone())
                .with_target(false)
                .with_ansi(config.enable_ansi)
                .with_timer(CompactTimer::new())
                .compact()
                .with_filter(filter(
                    config.stdout_filter_directives.as_deref(),
                    config.stdout_level,
                ))
        });
        let file_layer = log_file.as_ref().map(|(_, writer)| {
            let writer = writer.clone();
            tracing_subscriber::fmt::layer()
                .with_writer(move || writer.clone())
                .with_span_events(config.span_events.clone())
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .json()
                .with_filter(filter(
                    config.file_filter_directives.as_deref(),
                    config.file_level,
                ))
        });

        let dispatcher = Dispatch::new(
            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer),
        );
        let guard = tracing::dispatcher::set_default(&dispatcher);
        let log_file_path = log_file.map(|(path, _)| path);

        tracing::info!(
            test_name = %test_name,
            log_file = ?log_file_path,
            "Test tracing initialized"
        );

        Self {
            log_file_path,
            keep_success_logs: config.keep_success_logs,
            _dispatcher: dispatcher,
            _guard: guard,
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }

    /// Keep the log file even if the test passes
    pub fn keep_log(mut self) -> Self {
        self.keep_success_logs = true;
        self
    }

    /// Logs the execution forest of `graph` in DOT format.
    pub fn log_graph(
        &self,
        graph: &TestGraph,
    ) {
        tracing::debug!(
            lnodes = graph.lnode_count(),
            xnodes = graph.xnode_count(),
            "execution plan:\n{}",
            graph.to_dot()
        );
    }
}

impl Drop for TestTracing {
    fn drop(&mut self) {
        let Some(path) = &self.log_file_path else {
            return;
        };
        if std::thread::panicking() {
            eprintln!("\nTest failed! Log file preserved at: {}", path.display());
        } else if self.keep_success_logs {
            eprintln!("\nTest passed! Log file kept at: {}", path.display());
        } else {
            tracing::info!(log_file = %path.display(), "Test passed, removing log file");
            fs::remove_file(path).ok();
        }
    }
}
