use crate::Backoff;

use inv_config::ReconnectConfig;

use std::time::Duration;

fn config(max_attempts: u32, jitter: bool) -> ReconnectConfig {
    ReconnectConfig {
        enabled: true,
        max_attempts,
        initial_delay_ms: 100,
        max_delay_secs: 1,
        backoff_multiplier: 2.0,
        jitter,
    }
}

#[test]
fn given_no_jitter_when_retrying_then_delays_double_up_to_max() {
    let mut backoff = Backoff::new(&config(0, false));

    let delays: Vec<Duration> = (0..6).filter_map(|_| backoff.next_delay()).collect();

    assert_eq!(
        delays,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
            Duration::from_millis(800),
            Duration::from_secs(1),
            Duration::from_secs(1),
        ]
    );
    assert_eq!(backoff.attempts(), 6);
}

#[test]
fn given_attempt_limit_when_exhausted_then_returns_none() {
    let mut backoff = Backoff::new(&config(2, false));

    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_some());
    assert_eq!(backoff.next_delay(), None);
    assert_eq!(backoff.attempts(), 2);
}

#[test]
fn given_used_backoff_when_reset_then_starts_over() {
    let mut backoff = Backoff::new(&config(2, false));
    backoff.next_delay();
    backoff.next_delay();

    backoff.reset();

    assert_eq!(backoff.attempts(), 0);
    assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
}

#[test]
fn given_jitter_when_retrying_then_delay_stays_within_half_to_one_and_a_half() {
    let mut backoff = Backoff::new(&config(0, true));

    for _ in 0..50 {
        backoff.reset();
        let delay = backoff.next_delay().unwrap();
        assert!(delay >= Duration::from_millis(50), "{delay:?} too short");
        assert!(delay <= Duration::from_millis(150), "{delay:?} too long");
    }
}
