// Vendor string grammars
//
// The device reports uptimes, lease durations, and traffic counters as
// display strings. Parsing is lenient by policy: an unrecognized value
// costs one warning and a sentinel, never a failed scrape.

use tracing::warn;

/// Sentinel emitted when a vendor string doesn't parse.
pub const PARSE_FAILED: f64 = -1.0;

/// Parse `"<D> Days,<H> Hours,<M> Minutes,<S> Seconds"` into total seconds.
///
/// Fields are 1-2 digit zero-padded integers. Anything else yields
/// [`PARSE_FAILED`] and a warning.
pub fn parse_duration(raw: &str) -> f64 {
    match try_parse_duration(raw) {
        Some(seconds) => seconds,
        None => {
            warn!(raw, "unrecognized duration format");
            PARSE_FAILED
        }
    }
}

fn try_parse_duration(raw: &str) -> Option<f64> {
    const UNITS: [(&str, u64); 4] = [
        ("Days", 86_400),
        ("Hours", 3_600),
        ("Minutes", 60),
        ("Seconds", 1),
    ];

    let mut fields = raw.split(',');
    let mut total = 0u64;
    for (unit, factor) in UNITS {
        let field = fields.next()?.trim();
        let (digits, label) = field.split_once(' ')?;
        if label != unit || digits.is_empty() || digits.len() > 2 {
            return None;
        }
        total += digits.parse::<u64>().ok()? * factor;
    }
    if fields.next().is_some() {
        return None;
    }
    // Bounded well below f64's integer range by the 2-digit fields.
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    Some(total)
}

/// Parse `"<float><unit> Bytes"` into bytes.
///
/// The unit is one of K/M/G/T/E scaling by powers of 1024, or absent for
/// a plain byte count. Unknown units yield [`PARSE_FAILED`] and a warning.
pub fn parse_byte_count(raw: &str) -> f64 {
    match try_parse_byte_count(raw) {
        Some(bytes) => bytes,
        None => {
            warn!(raw, "unrecognized byte count format");
            PARSE_FAILED
        }
    }
}

fn try_parse_byte_count(raw: &str) -> Option<f64> {
    let number = raw.strip_suffix(" Bytes")?;
    let (mantissa, scale) = match number.chars().next_back()? {
        digit if digit.is_ascii_digit() => (number, 1.0),
        unit => {
            let scale = match unit {
                'K' => 1024f64,
                'M' => 1024f64.powi(2),
                'G' => 1024f64.powi(3),
                'T' => 1024f64.powi(4),
                'E' => 1024f64.powi(5),
                _ => return None,
            };
            (&number[..number.len() - unit.len_utf8()], scale)
        }
    };
    mantissa.trim().parse::<f64>().ok().map(|value| value * scale)
}

/// Parse a bare numeric string (channel frequencies, signal levels).
///
/// Same sentinel policy as the structured grammars.
pub fn parse_float(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(raw, "unrecognized numeric value");
        PARSE_FAILED
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn duration_full_grammar() {
        assert_close(
            parse_duration("05 Days,21 Hours,33 Minutes,44 Seconds"),
            509_624.0,
        );
        assert_close(parse_duration("00 Days,00 Hours,00 Minutes,01 Seconds"), 1.0);
        assert_close(parse_duration("1 Days,0 Hours,0 Minutes,0 Seconds"), 86_400.0);
    }

    #[test]
    fn duration_malformed_yields_sentinel() {
        assert_close(parse_duration(""), PARSE_FAILED);
        assert_close(parse_duration("05 Days,21 Hours"), PARSE_FAILED);
        assert_close(parse_duration("05 Days,21 Hours,33 Minutes,44 Parsecs"), PARSE_FAILED);
        assert_close(parse_duration("123 Days,0 Hours,0 Minutes,0 Seconds"), PARSE_FAILED);
        assert_close(
            parse_duration("05 Days,21 Hours,33 Minutes,44 Seconds,9 Extra"),
            PARSE_FAILED,
        );
    }

    #[test]
    fn byte_count_scaled_units() {
        assert_close(parse_byte_count("1.61G Bytes"), 1_728_724_336.64);
        assert_close(parse_byte_count("957.24M Bytes"), 1_003_738_890.24);
        assert_close(parse_byte_count("2K Bytes"), 2048.0);
        assert_close(parse_byte_count("1T Bytes"), 1024f64.powi(4));
        assert_close(parse_byte_count("1E Bytes"), 1024f64.powi(5));
    }

    #[test]
    fn byte_count_without_unit_is_plain_bytes() {
        assert_close(parse_byte_count("1024 Bytes"), 1024.0);
        assert_close(parse_byte_count("957.24 Bytes"), 957.24);
    }

    #[test]
    fn byte_count_malformed_yields_sentinel() {
        assert_close(parse_byte_count("1.61X Bytes"), PARSE_FAILED);
        assert_close(parse_byte_count("1.61G"), PARSE_FAILED);
        assert_close(parse_byte_count("G Bytes"), PARSE_FAILED);
        assert_close(parse_byte_count(""), PARSE_FAILED);
    }

    #[test]
    fn floats_fall_back_to_sentinel() {
        assert_close(parse_float("36.750"), 36.75);
        assert_close(parse_float(" -8.200 "), -8.2);
        assert_close(parse_float("n/a"), PARSE_FAILED);
    }
}
