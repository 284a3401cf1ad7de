use chrono::{DateTime as ChronoDateTime, Duration, Utc};
use mongodb::bson::DateTime;
use rand::Rng;

/// Minimum gap between two reset-code requests for the same account.
pub const OTP_COOLDOWN_SECS: i64 = 60;
/// How long an issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

pub fn within_cooldown(last_requested: Option<DateTime>, now: ChronoDateTime<Utc>) -> bool {
    match last_requested {
        Some(requested) => {
            now.signed_duration_since(requested.to_chrono())
                < Duration::seconds(OTP_COOLDOWN_SECS)
        }
        None => false,
    }
}

pub fn code_matches(
    stored_code: Option<&str>,
    expires_at: Option<DateTime>,
    submitted: &str,
    now: ChronoDateTime<Utc>,
) -> bool {
    match (stored_code, expires_at) {
        (Some(code), Some(expiry)) => code == submitted && expiry.to_chrono() > now,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn cooldown_blocks_rapid_requests() {
        let now = Utc::now();
        let just_now = DateTime::from_chrono(now - Duration::seconds(10));
        let long_ago = DateTime::from_chrono(now - Duration::seconds(OTP_COOLDOWN_SECS + 1));

        assert!(within_cooldown(Some(just_now), now));
        assert!(!within_cooldown(Some(long_ago), now));
        assert!(!within_cooldown(None, now));
    }

    #[test]
    fn expired_or_mismatched_codes_fail() {
        let now = Utc::now();
        let valid_until = DateTime::from_chrono(now + Duration::minutes(5));
        let expired = DateTime::from_chrono(now - Duration::minutes(1));

        assert!(code_matches(Some("123456"), Some(valid_until), "123456", now));
        assert!(!code_matches(Some("123456"), Some(valid_until), "654321", now));
        assert!(!code_matches(Some("123456"), Some(expired), "123456", now));
        assert!(!code_matches(None, None, "123456", now));
    }
}
