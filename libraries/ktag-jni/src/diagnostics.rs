//! Diagnostic sink for the native library
//!
//! Parser messages from lofty (which logs through `log`) and the bridge's own
//! `tracing` events are routed to the platform log. On Android that is logcat
//! under the configured tag; elsewhere events are formatted to stderr.
//!
//! A global subscriber can only be installed once per process, so the sink is
//! installed on the first [`attach`] and afterwards only gated on and off.

use std::ffi::c_int;
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing::field::{Field, Visit};
use tracing::{Event, Level};
use tracing_log::NormalizeEvent;
use tracing_subscriber::filter::{dynamic_filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub const ANDROID_LOG_VERBOSE: c_int = 2;
pub const ANDROID_LOG_DEBUG: c_int = 3;
pub const ANDROID_LOG_INFO: c_int = 4;
pub const ANDROID_LOG_WARN: c_int = 5;
pub const ANDROID_LOG_ERROR: c_int = 6;

static ATTACHED: AtomicBool = AtomicBool::new(false);
static INSTALL: Once = Once::new();

/// Diagnostic sink settings
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Log tag used on Android
    pub tag: &'static str,

    /// Filter directives used when `RUST_LOG` is unset
    pub default_filter: &'static str,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            tag: "kTagLib",
            default_filter: "lofty=trace,ktaglib=debug,ktag_core=debug,ktag_metadata=debug,ktag_artwork=debug",
        }
    }
}

/// Route diagnostics to the platform log
pub fn attach(config: &DiagnosticsConfig) {
    INSTALL.call_once(|| {
        // Fails only when the host already installed a global subscriber;
        // events then go to that one instead.
        let _ = install(config);
    });
    ATTACHED.store(true, Ordering::Release);
}

/// Stop forwarding diagnostics
pub fn detach() {
    ATTACHED.store(false, Ordering::Release);
}

pub fn is_attached() -> bool {
    ATTACHED.load(Ordering::Acquire)
}

fn install(config: &DiagnosticsConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    // Dynamic so the gate is evaluated per event, not cached per callsite
    let gate = dynamic_filter_fn(|_, _| is_attached());

    #[cfg(target_os = "android")]
    let sink = android::AndroidLogLayer::new(config.tag);

    #[cfg(not(target_os = "android"))]
    let sink = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(sink.with_filter(gate))
        .try_init()
}

fn is_library_target(target: &str) -> bool {
    target == "lofty" || target.starts_with("lofty::")
}

/// Android log priority for an event
///
/// Parser messages are informational noise for the host, so everything lofty
/// emits goes out at VERBOSE regardless of its own level.
pub fn priority(level: &Level, target: &str) -> c_int {
    if is_library_target(target) {
        return ANDROID_LOG_VERBOSE;
    }

    match *level {
        Level::TRACE => ANDROID_LOG_VERBOSE,
        Level::DEBUG => ANDROID_LOG_DEBUG,
        Level::INFO => ANDROID_LOG_INFO,
        Level::WARN => ANDROID_LOG_WARN,
        Level::ERROR => ANDROID_LOG_ERROR,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(mut self) -> String {
        self.message.push_str(&self.fields);
        self.message
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message.push_str(value),
            name if name.starts_with("log.") => {}
            name => {
                let _ = write!(self.fields, " {}={}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => {
                let _ = write!(self.message, "{:?}", value);
            }
            name if name.starts_with("log.") => {}
            name => {
                let _ = write!(self.fields, " {}={:?}", name, value);
            }
        }
    }
}

/// Priority and rendered text of an event
///
/// Events bridged from `log` carry their real target in `log.target`; it is
/// recovered so lofty messages are recognised.
pub(crate) fn format_event(event: &Event<'_>) -> (c_int, String) {
    let normalized = event.normalized_metadata();
    let metadata = normalized.as_ref().unwrap_or_else(|| event.metadata());

    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);

    let text = if is_library_target(metadata.target()) {
        visitor.finish()
    } else {
        format!("{}: {}", metadata.target(), visitor.finish())
    };

    (priority(metadata.level(), metadata.target()), text)
}

#[cfg(target_os = "android")]
mod android {
    use super::format_event;
    use std::ffi::CString;
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::Layer;

    /// Writes events to logcat
    pub struct AndroidLogLayer {
        tag: CString,
    }

    impl AndroidLogLayer {
        pub fn new(tag: &str) -> Self {
            Self {
                tag: CString::new(tag.replace('\0', "")).unwrap_or_default(),
            }
        }
    }

    impl<S: Subscriber> Layer<S> for AndroidLogLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let (priority, text) = format_event(event);
            let Ok(text) = CString::new(text.replace('\0', "")) else {
                return;
            };

            #[allow(unsafe_code)]
            // SAFETY: both pointers are NUL-terminated and live across the call
            unsafe {
                android_log_sys::__android_log_write(priority, self.tag.as_ptr(), text.as_ptr());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::layer::Context;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<(c_int, String)>>>);

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(format_event(event));
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<(c_int, String)> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, f);
        let events = capture.0.lock().unwrap().clone();
        events
    }

    #[test]
    fn lofty_messages_are_verbose() {
        assert_eq!(priority(&Level::ERROR, "lofty"), ANDROID_LOG_VERBOSE);
        assert_eq!(priority(&Level::WARN, "lofty::flac::read"), ANDROID_LOG_VERBOSE);
        assert_eq!(priority(&Level::WARN, "loftyish"), ANDROID_LOG_WARN);
    }

    #[test]
    fn bridge_levels_map_to_priorities() {
        assert_eq!(priority(&Level::TRACE, "ktaglib"), ANDROID_LOG_VERBOSE);
        assert_eq!(priority(&Level::DEBUG, "ktaglib"), ANDROID_LOG_DEBUG);
        assert_eq!(priority(&Level::INFO, "ktaglib"), ANDROID_LOG_INFO);
        assert_eq!(priority(&Level::WARN, "ktaglib"), ANDROID_LOG_WARN);
        assert_eq!(priority(&Level::ERROR, "ktaglib"), ANDROID_LOG_ERROR);
    }

    #[test]
    fn event_text_includes_fields() {
        let events = capture(|| {
            tracing::warn!(target: "ktaglib", fd = 7, "Read failed");
        });

        assert_eq!(events, vec![(ANDROID_LOG_WARN, "ktaglib: Read failed fd=7".to_string())]);
    }

    #[test]
    fn library_events_keep_their_text() {
        let events = capture(|| {
            tracing::warn!(target: "lofty::flac", "Skipping invalid block");
        });

        assert_eq!(events, vec![(ANDROID_LOG_VERBOSE, "Skipping invalid block".to_string())]);
    }

    #[test]
    fn attach_and_detach_toggle_the_gate() {
        attach(&DiagnosticsConfig::default());
        assert!(is_attached());

        detach();
        assert!(!is_attached());

        attach(&DiagnosticsConfig::default());
        assert!(is_attached());
    }

    #[test]
    fn default_tag() {
        assert_eq!(DiagnosticsConfig::default().tag, "kTagLib");
    }
}
