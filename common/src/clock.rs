use std::ops::Add;
use std::{
    sync::RwLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    /// Milliseconds since the UNIX epoch, the timestamp unit used throughout
    /// the data model.
    fn now_millis(&self) -> i64 {
        match self.now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as i64,
            Err(before_epoch) => -(before_epoch.duration().as_millis() as i64),
        }
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug)]
pub struct MockClock {
    now: RwLock<SystemTime>,
}

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        *self.now.read().unwrap()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    pub fn with_time(time: SystemTime) -> Self {
        Self {
            now: RwLock::new(time),
        }
    }

    pub fn new() -> Self {
        Self::with_time(SystemTime::now())
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.write().unwrap();
        *now = now.add(duration);
    }

    pub fn set_time(&self, time: SystemTime) {
        *self.now.write().unwrap() = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_millis_since_epoch() {
        // given
        let clock = MockClock::with_time(UNIX_EPOCH + Duration::from_millis(1_434_545_416_154));

        // when/then
        assert_eq!(clock.now_millis(), 1_434_545_416_154);
    }

    #[test]
    fn should_advance_mock_time() {
        // given
        let clock = MockClock::with_time(UNIX_EPOCH);

        // when
        clock.advance(Duration::from_secs(60));

        // then
        assert_eq!(clock.now_millis(), 60_000);
    }
}
