use std::time::Duration;

/// Exponential retry delays, optionally capped by attempt count and jittered
/// into `[delay / 2, delay]`.
pub struct BackoffStrategy {
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    current_delay: Duration,
    attempt: u32,
    max_attempts: Option<u32>,
    jitter: bool,
}

impl BackoffStrategy {
    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self {
            base_delay: base,
            max_delay: max,
            multiplier: 2.0,
            current_delay: base,
            attempt: 0,
            max_attempts: None,
            jitter: true,
        }
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        self.attempt += 1;

        let delay = if self.attempt == 1 {
            self.base_delay
        } else {
            let multiplied = self.current_delay.as_secs_f64() * self.multiplier;
            Duration::from_secs_f64(multiplied.min(self.max_delay.as_secs_f64()))
        };
        self.current_delay = delay;

        if self.jitter {
            let factor = 0.5 + rand::random::<f64>() * 0.5;
            Some(Duration::from_secs_f64(delay.as_secs_f64() * factor))
        } else {
            Some(delay)
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_attempts.is_some_and(|max| self.attempt >= max)
    }
}
