use chrono::Duration;

use super::errors::TtlError;

/// Longest accepted token lifetime, in days.
pub const MAX_TTL_DAYS: i64 = 3650;

/// Parse a token lifetime such as `30s`, `15m`, `12h`, `7d` or `2w`.
///
/// A bare integer is read as seconds.
///
/// # Errors
/// * `Empty` - Input is blank
/// * `InvalidFormat` - Unknown unit or non-numeric amount
/// * `NotPositive` - Amount is zero
/// * `TooLong` - Longer than [`MAX_TTL_DAYS`]
pub fn parse_ttl(input: &str) -> Result<Duration, TtlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TtlError::Empty);
    }

    let split_at = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (amount, unit) = input.split_at(split_at);

    let amount: i64 = amount
        .parse()
        .map_err(|_| TtlError::InvalidFormat(input.to_string()))?;
    if amount == 0 {
        return Err(TtlError::NotPositive(input.to_string()));
    }

    let duration = match unit.trim() {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => return Err(TtlError::InvalidFormat(input.to_string())),
    };

    let too_long = || TtlError::TooLong {
        input: input.to_string(),
        max_days: MAX_TTL_DAYS,
    };
    let duration = duration.ok_or_else(too_long)?;
    if duration > Duration::days(MAX_TTL_DAYS) {
        return Err(too_long());
    }

    Ok(duration)
}
