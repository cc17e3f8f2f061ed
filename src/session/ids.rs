use chrono::{DateTime, Utc};

/// A single issued tick: the id-bearing millisecond value and the wall-clock
/// time it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub millis: i64,
    pub at: DateTime<Utc>,
}

impl Tick {
    pub fn id(&self) -> String {
        self.millis.to_string()
    }

    pub fn indexed_id(&self, index: usize) -> String {
        format!("{}-{index}", self.millis)
    }
}

/// Time-based id source. Ticks are strictly increasing, so two ids issued in
/// the same millisecond never collide.
#[derive(Debug, Clone)]
pub struct IdClock {
    last_millis: i64,
    now: fn() -> DateTime<Utc>,
}

impl Default for IdClock {
    fn default() -> Self {
        Self::with_source(Utc::now)
    }
}

impl IdClock {
    pub fn with_source(now: fn() -> DateTime<Utc>) -> Self {
        Self {
            last_millis: i64::MIN,
            now,
        }
    }

    pub fn tick(&mut self) -> Tick {
        let at = (self.now)();
        let millis = at
            .timestamp_millis()
            .max(self.last_millis.saturating_add(1));
        self.last_millis = millis;
        Tick { millis, at }
    }
}

#[cfg(test)]
mod tests {
    use super::IdClock;
    use chrono::{DateTime, TimeZone, Utc};

    fn frozen() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("fixed timestamp should be valid")
    }

    #[test]
    fn frozen_source_still_yields_strictly_increasing_ticks() {
        let mut clock = IdClock::with_source(frozen);
        let first = clock.tick();
        let second = clock.tick();
        let third = clock.tick();

        assert_eq!(first.millis, frozen().timestamp_millis());
        assert_eq!(second.millis, first.millis + 1);
        assert_eq!(third.millis, first.millis + 2);
        assert_eq!(second.at, frozen());
    }

    #[test]
    fn indexed_ids_share_the_tick_prefix() {
        let mut clock = IdClock::with_source(frozen);
        let tick = clock.tick();
        assert_eq!(tick.indexed_id(2), format!("{}-2", tick.id()));
    }
}
