use time::macros::format_description;
use tracing_subscriber::{fmt, EnvFilter, FmtSubscriber};

// Sets up tracing. Goes to stderr, filtered by TRACE env var.
// Levels are: trace, debug, info, warn, error
//
// Tracing is off (error only) unless TRACE is set, which keeps stderr down to
// the error document alone in normal use.
//
// EnvFilter syntax, for example:
//
// All targets, info level:                 info
// Statement parsing, debug level:          casparse::cas=debug
// Global at info, parse state machine:     info,casparse::cas::parse=trace
//
// More generally: target[span{field=value}]=level
// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn setup_tracing() {
    // 5 digits of sub-second precision
    let time_format = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

    let time_offset = crate::util::date::local_utc_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = fmt::time::OffsetTime::new(time_offset, time_format);

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_env("TRACE"))
        .with_timer(timer)
        .finish();

    // Tests may set this up more than once.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Appends directives to the TRACE env var.
pub fn enable_trace_env(trace_env: &str) {
    const VAR_NAME: &str = "TRACE";
    if let Ok(existing_env) = std::env::var(VAR_NAME) {
        std::env::set_var(VAR_NAME, existing_env + "," + trace_env);
    } else {
        std::env::set_var(VAR_NAME, trace_env);
    }
}
