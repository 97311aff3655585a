use inv_config::ReconnectConfig;

use std::time::Duration;

/// Exponential reconnect delays for one outage.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
    /// 0 = unlimited
    max_attempts: u32,
    attempts: u32,
    delay: Duration,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        let initial_delay = Duration::from_millis(config.initial_delay_ms);
        Self {
            initial_delay,
            max_delay: Duration::from_secs(config.max_delay_secs),
            multiplier: config.backoff_multiplier,
            jitter: config.jitter,
            max_attempts: config.max_attempts,
            attempts: 0,
            delay: initial_delay,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are used up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.max_attempts > 0 && self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;

        let base = self.delay.min(self.max_delay);
        let actual = if self.jitter {
            let jitter_factor = 0.5 + rand::random::<f64>(); // 0.5 to 1.5
            Duration::from_secs_f64(base.as_secs_f64() * jitter_factor)
        } else {
            base
        };

        self.delay = Duration::from_secs_f64(
            (self.delay.as_secs_f64() * self.multiplier).min(self.max_delay.as_secs_f64()),
        );

        Some(actual)
    }

    /// Start over after a successful reconnect.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.delay = self.initial_delay;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
