//! Whole-day arithmetic shared by every derived view.

use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Days between two instants, rounding any partial day up.
///
/// Order-insensitive: `day_ceil(a, b) == day_ceil(b, a)`. Exactly 24h is one
/// day; 24h plus one millisecond is two.
pub fn day_ceil(a: DateTime<Utc>, b: DateTime<Utc>) -> u64 {
  let millis = (a - b).num_milliseconds().unsigned_abs();
  millis.div_ceil(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::*;

  #[test]
  fn zero_difference_is_zero_days() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(day_ceil(t, t), 0);
  }

  #[test]
  fn exact_day_boundary_is_not_rounded_up() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(day_ceil(t + Duration::hours(24), t), 1);
    assert_eq!(day_ceil(t + Duration::hours(48), t), 2);
  }

  #[test]
  fn partial_day_rounds_up() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(day_ceil(t + Duration::milliseconds(1), t), 1);
    assert_eq!(day_ceil(t + Duration::hours(24) + Duration::milliseconds(1), t), 2);
  }

  #[test]
  fn argument_order_does_not_matter() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
    let b = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    assert_eq!(day_ceil(a, b), day_ceil(b, a));
    assert_eq!(day_ceil(b, a), 9);
  }
}
