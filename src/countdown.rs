//! Countdown driver for `--timeout`

/// Indicator state after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorUpdate {
    /// Filled fraction, 1.0 at start and 0.0 when the budget is used up
    pub fraction: f32,
    /// Caption like "3 sec", when remaining seconds are shown
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    Remaining(IndicatorUpdate),
    Expired,
}

/// Once-per-second countdown; the tick counter starts at 1
#[derive(Debug)]
pub struct Countdown {
    budget: u32,
    count: u32,
    show_remaining: bool,
    expired: bool,
    indicator: IndicatorUpdate,
}

impl Countdown {
    pub fn new(budget: u32, show_remaining: bool) -> Self {
        Self {
            budget,
            count: 1,
            show_remaining,
            expired: false,
            indicator: IndicatorUpdate {
                fraction: 1.0,
                caption: show_remaining.then(|| format!("{budget} sec")),
            },
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Current indicator state, for rendering between ticks
    pub fn indicator(&self) -> &IndicatorUpdate {
        &self.indicator
    }

    pub fn tick(&mut self) -> Tick {
        if self.expired || self.count > self.budget {
            self.expired = true;
            return Tick::Expired;
        }

        let remaining = self.budget - self.count;
        self.indicator = IndicatorUpdate {
            fraction: remaining as f32 / self.budget as f32,
            caption: self.show_remaining.then(|| format!("{remaining} sec")),
        };
        self.count += 1;
        Tick::Remaining(self.indicator.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_decreases_each_tick() {
        let mut countdown = Countdown::new(4, false);
        for k in 1..=4u32 {
            match countdown.tick() {
                Tick::Remaining(update) => {
                    let expected = (4 - k) as f32 / 4.0;
                    assert!((update.fraction - expected).abs() < f32::EPSILON);
                    assert!(update.caption.is_none());
                }
                Tick::Expired => panic!("expired early at tick {k}"),
            }
        }
        assert_eq!(countdown.tick(), Tick::Expired);
        assert!(countdown.is_expired());
        assert_eq!(countdown.tick(), Tick::Expired);
    }

    #[test]
    fn test_remaining_caption() {
        let mut countdown = Countdown::new(3, true);
        assert_eq!(countdown.indicator().caption.as_deref(), Some("3 sec"));
        let Tick::Remaining(update) = countdown.tick() else {
            panic!("expected a remaining tick");
        };
        assert_eq!(update.caption.as_deref(), Some("2 sec"));
    }
}
