//! Tracing subscriber setup for the fleet binaries.
//!
//! Everything is driven by environment variables so the CLI, tests and any
//! embedding front end configure logging the same way:
//!
//! | Variable            | Values                         | Default          |
//! |---------------------|--------------------------------|------------------|
//! | `FLEET_LOG_LEVEL`   | any `EnvFilter` directive      | `info`           |
//! | `FLEET_LOG_OUTPUT`  | `console`, `file`, `both`, `off` | `console`      |
//! | `FLEET_LOG_FORMAT`  | `human`, `json`                | `human`          |
//! | `FLEET_LOG_TAGS`    | `key:value,...` (`*` wildcard) | none             |
//! | `FLEET_LOG_FILE`    | path of the rolling log file   | `$TMP/fleet.log` |
//!
//! Tags select events by the fields of their enclosing spans, e.g.
//! `FLEET_LOG_TAGS=action:delete` keeps only events emitted while a delete
//! batch is running.

use std::{
    collections::HashMap,
    env,
    io::{self, Write},
    path::PathBuf,
    sync::Once,
};
use tracing::{field::Visit, span, Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::MakeWriter,
    layer::{Context, Layer, Layered},
    prelude::*,
    registry::{LookupSpan, Registry},
    EnvFilter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: String,
    pub output: LogOutput,
    pub format: LogFormat,
    pub tags: Vec<Tag>,
    pub file_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Console,
            format: LogFormat::Human,
            tags: Vec::new(),
            file_path: env::temp_dir().join("fleet.log"),
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let output = match lookup("FLEET_LOG_OUTPUT").as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            Some("off") | Some("none") => LogOutput::Off,
            _ => LogOutput::Console,
        };
        let format = match lookup("FLEET_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Human,
        };

        Self {
            level: lookup("FLEET_LOG_LEVEL").unwrap_or(defaults.level),
            output,
            format,
            tags: lookup("FLEET_LOG_TAGS")
                .map(|raw| parse_tags(&raw))
                .unwrap_or_default(),
            file_path: lookup("FLEET_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
        }
    }
}

/// Parse `key:value,key:value`; malformed entries are dropped.
pub fn parse_tags(raw: &str) -> Vec<Tag> {
    raw.split(',')
        .filter_map(|s| {
            let mut parts = s.splitn(2, ':');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(Tag {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

// --- Tee writer for console + file ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a>,
    B: MakeWriter<'a>,
{
    type Writer = Tee<A::Writer, B::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

// --- Span-field tag filtering ---
pub struct TagFilterLayer {
    filters: Vec<Tag>,
}

impl TagFilterLayer {
    pub fn new(filters: Vec<Tag>) -> Self {
        Self { filters }
    }

    fn matches(&self, fields: &HashMap<String, String>) -> bool {
        self.filters.iter().all(|filter| {
            fields
                .get(&filter.key)
                .is_some_and(|value| filter.value == "*" || value.contains(&filter.value))
        })
    }
}

impl<S> Layer<S> for TagFilterLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(fields);
    }

    // Spans must always be created so their fields exist for the events
    // below them; only events are filtered.
    fn event_enabled(&self, event: &Event<'_>, ctx: Context<'_, S>) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        // With tags configured, events outside any span are dropped.
        let Some(scope) = ctx.event_scope(event) else {
            return false;
        };

        let mut all_fields = HashMap::new();
        for span_ref in scope {
            if let Some(fields) = span_ref.extensions().get::<HashMap<String, String>>() {
                for (k, v) in fields {
                    all_fields.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }

        self.matches(&all_fields)
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

type BaseSubscriber = Layered<TagFilterLayer, Layered<EnvFilter, Registry>>;

fn install<W>(subscriber: BaseSubscriber, writer: W, format: LogFormat)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let result = match format {
        LogFormat::Json => subscriber.with(fmt_layer.json()).try_init(),
        LogFormat::Human => subscriber.with(fmt_layer.pretty()).try_init(),
    };
    if let Err(err) = result {
        eprintln!("Warning: logging already initialized: {err}");
    }
}

/// Initialize the global subscriber from explicit settings.
///
/// The returned guard must be held for as long as file output should be
/// flushed.
pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level))
        .add_directive(
            "tokio=warn"
                .parse()
                .unwrap_or_else(|_| LevelFilter::WARN.into()),
        );

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(TagFilterLayer::new(settings.tags.clone()));

    let log_dir = settings
        .file_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir);
    let log_filename = settings
        .file_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "fleet.log".into());

    match settings.output {
        LogOutput::Console => {
            install(subscriber, io::stderr, settings.format);
            None
        }
        LogOutput::File => {
            let appender = tracing_appender::rolling::daily(log_dir, log_filename);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            install(subscriber, non_blocking, settings.format);
            Some(guard)
        }
        LogOutput::Both => {
            let appender = tracing_appender::rolling::daily(log_dir, log_filename);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let tee = MakeTee {
                make_a: io::stderr,
                make_b: non_blocking,
            };
            install(subscriber, tee, settings.format);
            Some(guard)
        }
        LogOutput::Off => None,
    }
}

/// Install a test-writer subscriber once per process.
pub fn init_for_tests() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
