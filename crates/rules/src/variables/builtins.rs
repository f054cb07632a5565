//! `#`-prefixed builtin references.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::debug;
use vigil_core::Value;

use super::VariableResolver;

/// Compact ISO date, e.g. `20260805`.
const DATE_FORMAT: &str = "%Y%m%d";
/// Compact ISO date-time, e.g. `20260805T143000Z`.
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Resolve a builtin reference.
///
/// `full` is the reference content including the leading `#`, used for
/// the verbatim fallback; `name` is the content after it.
pub(super) fn resolve(resolver: &VariableResolver, full: &str, name: &str) -> Value {
    match name {
        "node" => return Value::String(resolver.node.clone()),
        "cluster" => return Value::String(resolver.cluster.clone()),
        "chain" => return Value::String(resolver.chain.clone()),
        "host" => return Value::String(resolver.host.clone()),
        "vigil.home" => return Value::String(resolver.home.clone()),
        "vigil.conf" => return Value::String(resolver.conf.clone()),
        "vigil.data" => return Value::String(resolver.data.clone()),
        "vigil.tmp" => return Value::String(resolver.tmp.clone()),
        "date" => return Value::String(Utc::now().format(DATE_FORMAT).to_string()),
        "timestamp" => return Value::String(Utc::now().format(TIMESTAMP_FORMAT).to_string()),
        "now" => return Value::Number(Utc::now().timestamp_millis() as f64),
        _ => {}
    }

    if let Some(args) = name.strip_prefix("now(").and_then(|a| a.strip_suffix(')')) {
        return now_with_offsets(args, Utc::now());
    }
    if let Some(pattern) = name.strip_prefix('+') {
        return format_now(full, pattern);
    }
    if let Some(var) = name.strip_prefix("env.") {
        // Absent variables resolve to the empty string, never Null.
        return Value::String(resolver.env.get(var).cloned().unwrap_or_default());
    }
    if let Some(key) = name.strip_prefix("prop.") {
        return Value::String(resolver.props.get(key).cloned().unwrap_or_default());
    }
    if let Some(key) = name.strip_prefix("metric.") {
        return resolver
            .runtime
            .as_ref()
            .and_then(|r| r.metric(key))
            .unwrap_or(Value::Null);
    }
    if let Some(key) = name.strip_prefix("sensor.") {
        return resolver
            .runtime
            .as_ref()
            .and_then(|r| r.sensor(key))
            .unwrap_or(Value::Null);
    }

    // Unrecognized builtins resolve to their own content verbatim.
    Value::String(full.to_string())
}

/// `#now(TZ?,±Nh?,±Nm?,±Ns?)` — epoch milliseconds of "now" in the given
/// timezone after applying hour, minute, and second offsets in that order.
fn now_with_offsets(args: &str, now: DateTime<Utc>) -> Value {
    let mut timezone: Option<Tz> = None;
    let mut hours: i64 = 0;
    let mut minutes: i64 = 0;
    let mut seconds: i64 = 0;

    for arg in args.split(',') {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        let mut chars = arg.chars();
        let unit = chars.next_back();
        let amount = chars.as_str().parse::<i64>();
        match (unit, amount) {
            (Some('h'), Ok(n)) => hours += n,
            (Some('m'), Ok(n)) => minutes += n,
            (Some('s'), Ok(n)) => seconds += n,
            _ => match arg.parse::<Tz>() {
                Ok(tz) => timezone = Some(tz),
                Err(_) => {
                    debug!(arg, "unrecognized #now argument");
                    return Value::Null;
                }
            },
        }
    }

    let base = match timezone {
        Some(tz) => now.with_timezone(&tz).with_timezone(&Utc),
        None => now,
    };
    let shifted = base
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds);
    Value::Number(shifted.timestamp_millis() as f64)
}

/// `#+<pattern>` — the current UTC instant through a strftime pattern.
///
/// An unparseable pattern falls back to the verbatim reference content.
fn format_now(full: &str, pattern: &str) -> Value {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        debug!(pattern, "unparseable date pattern");
        return Value::String(full.to_string());
    }
    Value::String(Utc::now().format_with_items(items.into_iter()).to_string())
}
