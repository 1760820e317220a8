use std::time::{Duration, Instant};

/// Lifetime of a one-time verification code.
pub const OTP_TTL: Duration = Duration::from_secs(600);

/// Countdown shown while the user types a verification code.
#[derive(Debug, Clone, Copy)]
pub struct OtpCountdown {
    expires_at: Instant,
}

impl OtpCountdown {
    pub fn start(ttl: Duration) -> Self {
        Self::until(Instant::now() + ttl)
    }

    pub fn until(expires_at: Instant) -> Self {
        Self { expires_at }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Remaining time as `m:ss`.
    pub fn display(&self) -> String {
        let secs = self.remaining().as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

impl Default for OtpCountdown {
    fn default() -> Self {
        Self::start(OTP_TTL)
    }
}
