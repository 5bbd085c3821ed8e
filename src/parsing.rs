pub fn parse_cpu_to_cores(q: &str) -> Option<f64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    if let Some(stripped) = q.strip_suffix('n') {
        if let Ok(nanos) = stripped.parse::<f64>() {
            return Some(nanos / 1e9);
        }
    } else if let Some(stripped) = q.strip_suffix('u') {
        if let Ok(micros) = stripped.parse::<f64>() {
            return Some(micros / 1e6);
        }
    } else if let Some(stripped) = q.strip_suffix('m') {
        if let Ok(mc) = stripped.parse::<f64>() {
            return Some(mc / 1e3);
        }
    } else if let Ok(cores) = q.parse::<f64>() {
        return Some(cores);
    }
    None
}

// Binary suffixes are checked before decimal ones (Ki before K).
const BINARY_UNITS: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1024.0 * 1024.0),
    ("Gi", 1024.0 * 1024.0 * 1024.0),
    ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
];
const DECIMAL_UNITS: &[(&str, f64)] = &[
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("k", 1e3),
];

pub fn parse_memory_to_bytes(q: &str) -> Option<f64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    for (suf, mul) in BINARY_UNITS.iter().chain(DECIMAL_UNITS) {
        if let Some(stripped) = q.strip_suffix(suf) {
            if let Ok(v) = stripped.parse::<f64>() {
                return Some((v * mul).round());
            }
        }
    }
    q.parse::<u64>().ok().map(|v| v as f64)
}

/// Parse a Prometheus sample value ("0.25", "NaN", "+Inf", "-Inf").
pub fn parse_sample_value(raw: &str) -> Option<f64> {
    match raw.trim() {
        "NaN" => Some(f64::NAN),
        "+Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}

pub fn format_cores(cores: f64) -> String {
    format!("{:.2} cores", cores)
}

pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
