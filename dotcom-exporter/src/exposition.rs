//! Prometheus text exposition format.

use std::fmt::Write;

use crate::metrics::Sample;

/// Content type of the rendered output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples in Prometheus exposition format.
///
/// Samples of one family must be contiguous; `# HELP` and `# TYPE` are
/// written when a new family starts. Families without samples are omitted.
pub fn render(samples: &[Sample]) -> String {
    let mut output = String::with_capacity(samples.len() * 100);
    let mut current: Option<&str> = None;

    for sample in samples {
        let descriptor = sample.descriptor;

        if current != Some(descriptor.name) {
            writeln!(output, "# HELP {} {}", descriptor.name, escape_help(descriptor.help)).ok();
            writeln!(
                output,
                "# TYPE {} {}",
                descriptor.name,
                descriptor.metric_type.as_str()
            )
            .ok();
            current = Some(descriptor.name);
        }

        write!(
            output,
            "{}{} {}",
            descriptor.name,
            format_labels(sample),
            format_value(sample.value)
        )
        .ok();
        if let Some(ts) = sample.timestamp_ms {
            write!(output, " {}", ts).ok();
        }
        output.push('\n');
    }

    output
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters in HELP text.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Format a sample's labels as `{k="v",...}`.
fn format_labels(sample: &Sample) -> String {
    let parts: Vec<String> = sample
        .labels()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    format!("{{{}}}", parts.join(","))
}
