use jiff::SpanRelativeTo;

pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    if let Ok(seconds) = input.parse::<i64>() {
        if seconds < 0 {
            return Err(String::from("Duration must not be negative"));
        }
        return Ok(jiff::SignedDuration::from_secs(seconds));
    }

    Err(String::from("Invalid duration"))
}

/// Converts a parsed duration into a request timeout of at least one millisecond.
pub fn parse_timeout(input: &str) -> Result<std::time::Duration, String> {
    let duration = parse_duration(input)?;

    if duration.is_negative() || duration.is_zero() {
        return Err(String::from("Timeout must be positive"));
    }

    // timeouts are configured in whole milliseconds
    if duration < jiff::SignedDuration::from_millis(1) {
        return Err(String::from("Timeout must be at least 1ms"));
    }

    std::time::Duration::try_from(duration).map_err(|err| err.to_string())
}
