//! ISO-8601 duration text (`PnDTnHnMnS`) used on the wire for `maxDuration`.
//!
//! Only day and time components are accepted; years, months and weeks have
//! no fixed length and are rejected.

use std::time::Duration;

/// Parse an ISO-8601 duration such as `PT30S`, `PT1M30.5S` or `P1DT2H`.
pub fn parse(text: &str) -> Result<Duration, String> {
    let s = text.trim();
    let rest = s
        .strip_prefix('P')
        .or_else(|| s.strip_prefix('p'))
        .ok_or_else(|| format!("Duration '{s}' must start with 'P'"))?;
    if rest.is_empty() {
        return Err(format!("Duration '{s}' has no components"));
    }

    let (date_part, time_part) = match rest.split_once(['T', 't']) {
        Some((date, time)) => {
            if time.is_empty() {
                return Err(format!("Duration '{s}' has an empty time section"));
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut total_ms: u128 = 0;
    for (value, unit) in components(date_part, s)? {
        match unit {
            'D' => total_ms += scale(value, 86_400_000.0, s)?,
            other => return Err(format!("Unsupported date unit '{other}' in duration '{s}'")),
        }
    }
    if let Some(time) = time_part {
        for (value, unit) in components(time, s)? {
            let factor = match unit {
                'H' => 3_600_000.0,
                'M' => 60_000.0,
                'S' => 1_000.0,
                other => return Err(format!("Unsupported time unit '{other}' in duration '{s}'")),
            };
            total_ms += scale(value, factor, s)?;
        }
    }

    let millis = u64::try_from(total_ms).map_err(|_| format!("Duration '{s}' is too large"))?;
    Ok(Duration::from_millis(millis))
}

/// Format a duration as ISO-8601, e.g. `PT1H5M` or `PT0.25S`.
pub fn format(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms == 0 {
        return "PT0S".to_string();
    }

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let millis = total_ms % 60_000;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if millis > 0 {
        let secs = millis / 1000;
        let frac = millis % 1000;
        if frac == 0 {
            out.push_str(&format!("{secs}S"));
        } else {
            let frac = format!("{frac:03}");
            out.push_str(&format!("{secs}.{}S", frac.trim_end_matches('0')));
        }
    }
    out
}

fn components(section: &str, whole: &str) -> Result<Vec<(f64, char)>, String> {
    let mut parsed = Vec::new();
    let mut number = String::new();
    for ch in section.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            number.push(if ch == ',' { '.' } else { ch });
        } else {
            if number.is_empty() {
                return Err(format!("Missing number before '{ch}' in duration '{whole}'"));
            }
            let value: f64 = number
                .parse()
                .map_err(|_| format!("Invalid number '{number}' in duration '{whole}'"))?;
            parsed.push((value, ch.to_ascii_uppercase()));
            number.clear();
        }
    }
    if !number.is_empty() {
        return Err(format!("Trailing number without unit in duration '{whole}'"));
    }
    Ok(parsed)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(value: f64, factor: f64, whole: &str) -> Result<u128, String> {
    let ms = (value * factor).round();
    if !ms.is_finite() || ms < 0.0 {
        return Err(format!("Invalid duration '{whole}'"));
    }
    Ok(ms as u128)
}
