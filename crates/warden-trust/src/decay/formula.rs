use chrono::{DateTime, Duration, Utc};

/// Half-life retention factor: `2^(-elapsed / half_life)`.
///
/// Range: 0.0 – 1.0. Non-positive `elapsed` returns 1.0. A non-positive
/// `half_life` means the distance to baseline is gone immediately.
pub fn retention(elapsed: Duration, half_life: Duration) -> f64 {
    let elapsed_ms = elapsed.num_milliseconds();
    if elapsed_ms <= 0 {
        return 1.0;
    }
    let half_life_ms = half_life.num_milliseconds();
    if half_life_ms <= 0 {
        return 0.0;
    }
    (-(elapsed_ms as f64) / half_life_ms as f64).exp2()
}

/// Pull `score` toward `baseline` for the time between `last_event_at` and `now`.
///
/// ```text
/// next = baseline + (score - baseline) × 2^(-elapsed / half_life)
/// ```
///
/// Result is clamped to [0.0, 1.0].
pub fn decay_toward(
    score: f64,
    baseline: f64,
    last_event_at: DateTime<Utc>,
    now: DateTime<Utc>,
    half_life: Duration,
) -> f64 {
    let factor = retention(now - last_event_at, half_life);
    (baseline + (score - baseline) * factor).clamp(0.0, 1.0)
}
