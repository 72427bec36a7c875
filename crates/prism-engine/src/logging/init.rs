use std::io::Write;
use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one.
///
/// wgpu and naga report every pipeline and module at `info`.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter syntax, e.g. `"prism_engine=debug,wgpu_core=warn"`.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix lines with the emitting module path.
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            show_target: true,
        }
    }
}

/// Explicit filter first, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub(crate) fn resolve_filter(explicit: Option<&str>, env: Option<&str>) -> String {
    explicit
        .or(env)
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_owned()
}

static INIT: Once = Once::new();

/// Installs the global logger; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.env_filter.as_deref(), env.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        builder.format_timestamp_millis();
        if !config.show_target {
            builder.format_target(false);
        }
        // Another logger may already be installed (a test harness, an embedder).
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized with filter {filter:?}");
    });
}

/// Writes a block of lines under one header as a single record.
///
/// `target` is the caller's `module_path!()`, so `RUST_LOG` module filters
/// apply to the block as they would to a plain `log::error!` at the call site.
pub fn log_block(target: &str, level: log::Level, header: &str, lines: &str) {
    if !log::log_enabled!(target: target, level) {
        return;
    }
    log::log!(target: target, level, "{}", format_block(header, lines));
}

fn format_block(header: &str, lines: &str) -> String {
    let mut out = Vec::with_capacity(header.len() + lines.len() + 2);
    let _ = writeln!(out, "{header}");
    for line in lines.lines() {
        let _ = writeln!(out, "  {line}");
    }
    String::from_utf8_lossy(&out).trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(resolve_filter(Some("debug"), Some("warn")), "debug");
    }

    #[test]
    fn env_filter_used_without_explicit() {
        assert_eq!(resolve_filter(None, Some("prism_engine=trace")), "prism_engine=trace");
    }

    #[test]
    fn blank_filters_fall_back_to_default() {
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
        assert_eq!(resolve_filter(Some("  "), None), DEFAULT_FILTER);
    }

    #[test]
    fn block_indents_each_line_under_header() {
        assert_eq!(
            format_block(" ======= Compute log ======= ", "error: a\nerror: b\n"),
            " ======= Compute log ======= \n  error: a\n  error: b"
        );
        assert_eq!(format_block("header", ""), "header");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig {
            env_filter: Some("trace".into()),
            ..LoggingConfig::default()
        });
        log_block(module_path!(), log::Level::Info, "header", "one\ntwo");
    }
}
