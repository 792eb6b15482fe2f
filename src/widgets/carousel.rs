//! Slide autoplay for the page banner.

use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default)]
pub struct Carousel {
    slides: usize,
    index: usize,
    interval: Duration,
    last: Option<Instant>,
}

impl Carousel {
    pub fn new(slides: usize, interval: Duration) -> Self {
        Self {
            slides,
            index: 0,
            interval,
            last: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides
    }

    pub fn advance(&mut self) {
        if self.slides == 0 {
            return;
        }
        self.index = (self.index + 1) % self.slides;
    }

    /// Called from the UI tick. Advances once per elapsed interval and
    /// returns true when the index moved. The first call only starts the clock.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.slides == 0 {
            return false;
        }
        let Some(last) = self.last else {
            self.last = Some(now);
            return false;
        };
        if now.saturating_duration_since(last) < self.interval {
            return false;
        }
        self.advance();
        self.last = Some(last + self.interval);
        // A stalled loop does not fast-forward through missed slides
        if now.saturating_duration_since(last + self.interval) >= self.interval {
            self.last = Some(now);
        }
        true
    }

    /// Horizontal translation of the slide strip, in percent.
    pub fn offset_percent(&self) -> i64 {
        -(self.index as i64 * 100)
    }
}
