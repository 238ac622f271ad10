//! Structured logging setup for the demo service
//!
//! One global subscriber is installed at startup and shared by every request.
//! Records go to stdout, one JSON object per line by default. Every record
//! carries the service metadata (`service`, `environment`, `instanceId`) at
//! the top level, followed by the fields of the enclosing spans and of the
//! event itself. Field names are written in camelCase (`request_id` becomes
//! `requestId`).
//!
//! Handler panics are routed through the same sink: [`install_panic_hook`]
//! records where a panic happened so the fault stage can log it with the
//! request's correlation id.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::sync::Once;

use serde_json::{Map, Value};
use tracing::{
    field::{Field, Visit},
    Event, Level, Span, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        self,
        format::{self, FormatEvent, FormatFields, JsonFields},
        FmtContext, FormattedFields, MakeWriter,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{Config, LogFormat, SERVICE_NAME};
use crate::request_context::RequestContext;
use crate::runtime;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the filter is derived from
/// `LOG_LEVEL`.
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(build_env_filter(&config.log_level));

    match config.log_format {
        LogFormat::Json => registry
            .with(json_layer(config, std::io::stdout))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stdout),
            )
            .try_init()?,
    }

    Ok(())
}

/// JSON formatting layer writing to any sink.
pub fn json_layer<S, W>(config: &Config, writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .fmt_fields(JsonFields::new())
        .event_format(ServiceJson::new(config))
        .with_writer(writer)
}

/// Event format producing one flat JSON object per record.
#[derive(Debug, Clone)]
pub struct ServiceJson {
    metadata: Map<String, Value>,
}

impl ServiceJson {
    pub fn new(config: &Config) -> Self {
        let mut metadata = Map::new();
        metadata.insert("service".to_string(), SERVICE_NAME.into());
        metadata.insert("environment".to_string(), config.environment.clone().into());
        metadata.insert("instanceId".to_string(), config.instance_guid.clone().into());
        Self { metadata }
    }
}

impl<S, N> FormatEvent<S, N> for ServiceJson
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut record = Map::new();
        record.insert("timestamp".to_string(), runtime::timestamp().into());
        record.insert(
            "level".to_string(),
            event.metadata().level().as_str().into(),
        );
        record.extend(self.metadata.clone());

        // Outer spans first so inner fields win on collision.
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let extensions = span.extensions();
                let Some(fields) = extensions.get::<FormattedFields<N>>() else {
                    continue;
                };
                if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(&fields.fields) {
                    for (name, value) in fields {
                        record.insert(camel_case(&name), value);
                    }
                }
            }
        }

        event.record(&mut RecordVisitor(&mut record));

        let line = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

struct RecordVisitor<'a>(&'a mut Map<String, Value>);

impl RecordVisitor<'_> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.0.insert(camel_case(field.name()), value);
    }
}

impl Visit for RecordVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}").into());
    }
}

/// `user_agent` -> `userAgent`; names without underscores are unchanged.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Map a configured level name to a tracing level directive.
///
/// Winston-style names are accepted so existing deployment manifests keep
/// working: `http` and `verbose` map to debug, `silly` to trace.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "info" => "info",
        "http" | "verbose" | "debug" => "debug",
        "silly" | "trace" => "trace",
        _ => "info",
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_directive(level);
        EnvFilter::new(format!("{level},tower_http=warn,hyper=warn"))
    })
}

/// Span wrapping a single request's traversal of the pipeline.
///
/// Created at ERROR level so it stays enabled under any filter that still
/// lets events through.
pub fn request_span(ctx: &RequestContext) -> Span {
    tracing::span!(Level::ERROR, "request", request_id = %ctx.request_id)
}

/// Where and why a handler panicked.
#[derive(Debug, Clone)]
pub struct PanicReport {
    pub message: String,
    pub location: String,
    pub backtrace: String,
}

thread_local! {
    static CAPTURE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

/// Marks the current thread as running guarded handler code until dropped.
///
/// Panics raised while a guard is alive are stored for [`take_panic_report`]
/// instead of being printed by the default hook.
pub struct PanicCapture(());

impl PanicCapture {
    pub fn enter() -> Self {
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self(())
    }
}

impl Drop for PanicCapture {
    fn drop(&mut self) {
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Install the process panic hook. Safe to call more than once.
///
/// Outside a [`PanicCapture`] the previous hook runs unchanged.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if CAPTURE_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }

            let report = PanicReport {
                message: panic_message(info.payload()),
                location: info
                    .location()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "unknown location".to_string()),
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
        }));
    });
}

/// Take the report of the last captured panic on this thread.
pub fn take_panic_report() -> Option<PanicReport> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
