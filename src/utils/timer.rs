use std::time::Instant;

/// Accumulates the time spent between `start` and `stop` calls.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Timer {
    pub total_time: u128,
    pub laps: usize,
    curr: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self { total_time: 0, laps: 0, curr: Instant::now() }
    }
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn start(&mut self) {
        self.curr = Instant::now();
    }

    /// Ends the current lap and returns its length in nanoseconds.
    #[inline(always)]
    pub fn stop(&mut self) -> u128 {
        let diff = self.curr.elapsed().as_nanos();
        self.total_time += diff;
        self.laps += 1;
        diff
    }

    pub fn average(&self) -> f64 {
        if self.laps == 0 {
            return 0.0;
        }
        self.total_time as f64 / self.laps as f64
    }
}

#[test]
fn test_timer() {
    use std::{thread, time};

    let mut timer = Timer::new();

    thread::sleep(time::Duration::from_millis(20));
    timer.stop();

    timer.start();
    thread::sleep(time::Duration::from_millis(20));
    timer.stop();

    assert_eq!(timer.laps, 2);
    assert!(timer.total_time >= 40_000_000);
    assert!(timer.average() >= 20_000_000.0);
}
