// src/utils/mod.rs
use chrono::DateTime;
use log::info;

pub fn setup_logging(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("rustls", log::LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()?;
    info!("Logging initialized.");
    Ok(())
}

/// Formats large monetary values with a magnitude suffix (`1.23B`, `45.60M`).
pub fn format_number(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    for (scale, suffix) in UNITS {
        if magnitude >= scale {
            return format!("{:.2}{}", value / scale, suffix);
        }
    }
    format!("{:.2}", value)
}

/// `format_number` for fields the API may leave out.
pub fn format_optional_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "N/A".to_string())
}

/// Renders an epoch-milliseconds timestamp as a UTC ISO-8601 string.
pub fn format_epoch_millis(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}
