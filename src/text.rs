//! Text effects: typewriter, counters, word reveal and glitch.

use std::time::Duration;

use rand::Rng;

use crate::timer::Timers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypeEvent {
    NextChar,
    HideCursor,
}

/// Reveals a line one character at a time behind a blinking cursor.
pub struct Typewriter {
    text: String,
    shown: usize,
    cursor: bool,
    timers: Timers<TypeEvent>,
}

impl Typewriter {
    pub const START_DELAY: Duration = Duration::from_millis(2000);
    pub const CHAR_DELAY: Duration = Duration::from_millis(100);
    pub const CURSOR_LINGER: Duration = Duration::from_millis(1000);

    pub fn new(text: impl Into<String>) -> Self {
        let mut timers = Timers::new();
        timers.schedule(Self::START_DELAY, TypeEvent::NextChar);

        Self {
            text: text.into(),
            shown: 0,
            cursor: true,
            timers,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        let target = self.timers.now() + dt;
        while let Some(event) = self.timers.pop_until(target) {
            match event {
                TypeEvent::NextChar if self.shown < self.text.chars().count() => {
                    self.shown += 1;
                    self.timers.schedule(Self::CHAR_DELAY, TypeEvent::NextChar);
                }
                TypeEvent::NextChar => {
                    self.timers.schedule(Self::CURSOR_LINGER, TypeEvent::HideCursor);
                }
                TypeEvent::HideCursor => self.cursor = false,
            }
        }
        self.timers.settle(target);
    }

    pub fn visible_text(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor
    }

    pub fn is_animating(&self) -> bool {
        !self.timers.is_idle()
    }
}

/// Counts up to a target in fixed ticks, like a stats counter scrolled into
/// view.
pub struct CounterAnimation {
    target: u64,
    increment: f64,
    current: f64,
    displayed: u64,
    started: bool,
    timers: Timers<()>,
}

impl CounterAnimation {
    pub const TICK: Duration = Duration::from_millis(16);
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(2000);

    pub fn new(target: u64, duration: Duration) -> Self {
        let ticks = duration.as_secs_f64() / Self::TICK.as_secs_f64();
        let increment = if ticks > 0.0 {
            target as f64 / ticks
        } else {
            target as f64
        };

        Self {
            target,
            increment,
            current: 0.0,
            displayed: 0,
            started: false,
            timers: Timers::new(),
        }
    }

    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.timers.schedule(Self::TICK, ());
    }

    pub fn advance(&mut self, dt: Duration) {
        let target = self.timers.now() + dt;
        while self.timers.pop_until(target).is_some() {
            self.current += self.increment;
            self.displayed = (self.current.floor() as u64).min(self.target);

            if self.current >= self.target as f64 {
                self.displayed = self.target;
            } else {
                self.timers.schedule(Self::TICK, ());
            }
        }
        self.timers.settle(target);
    }

    pub fn value(&self) -> u64 {
        self.displayed
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.timers.is_idle()
    }

    pub fn is_animating(&self) -> bool {
        !self.timers.is_idle()
    }
}

/// Words that fade and slide in one after another once revealed.
pub struct WordReveal {
    words: Vec<String>,
    revealed_at: Option<Duration>,
    now: Duration,
}

impl WordReveal {
    pub const STAGGER: Duration = Duration::from_millis(100);
    pub const FADE: Duration = Duration::from_millis(600);
    /// Pixels a hidden word sits below its resting place
    pub const RISE: f32 = 20.0;

    pub fn new(text: &str) -> Self {
        Self {
            words: text.split(' ').map(str::to_owned).collect(),
            revealed_at: None,
            now: Duration::ZERO,
        }
    }

    pub fn reveal(&mut self) {
        self.revealed_at.get_or_insert(self.now);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Progress of word `index` in `0.0..=1.0`.
    pub fn progress(&self, index: usize) -> f32 {
        let Some(revealed_at) = self.revealed_at else {
            return 0.0;
        };

        let start = revealed_at + Self::STAGGER * index as u32;
        let elapsed = self.now.saturating_sub(start).as_secs_f32();
        (elapsed / Self::FADE.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_animating(&self) -> bool {
        self.revealed_at.is_some() && self.progress(self.words.len().saturating_sub(1)) < 1.0
    }
}

const GLITCH_CHARS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Scrambles a label on hover, settling back left to right.
pub struct GlitchText {
    original: Vec<char>,
    shown: String,
    /// Settled characters, counted in thirds
    thirds: usize,
    timers: Timers<()>,
}

impl GlitchText {
    pub const TICK: Duration = Duration::from_millis(50);

    pub fn new(text: &str) -> Self {
        Self {
            original: text.chars().collect(),
            shown: text.to_owned(),
            thirds: 0,
            timers: Timers::new(),
        }
    }

    /// Restarts the scramble unless one is already running.
    pub fn hover(&mut self) {
        if !self.timers.is_idle() {
            return;
        }
        self.thirds = 0;
        self.timers.schedule(Self::TICK, ());
    }

    pub fn advance(&mut self, dt: Duration, rng: &mut impl Rng) {
        let target = self.timers.now() + dt;
        while self.timers.pop_until(target).is_some() {
            let settled = self.thirds;
            self.shown = self
                .original
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    if i * 3 < settled {
                        c
                    } else {
                        GLITCH_CHARS[rng.gen_range(0..GLITCH_CHARS.len())] as char
                    }
                })
                .collect();

            if self.thirds >= self.original.len() * 3 {
                self.shown = self.original.iter().collect();
            } else {
                self.thirds += 1;
                self.timers.schedule(Self::TICK, ());
            }
        }
        self.timers.settle(target);
    }

    pub fn text(&self) -> &str {
        &self.shown
    }

    pub fn is_animating(&self) -> bool {
        !self.timers.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::timer::ms;

    #[test]
    fn typewriter_timing() {
        let mut typer = Typewriter::new("Hi!");
        assert_eq!(typer.visible_text(), "");

        typer.advance(ms(1999));
        assert_eq!(typer.visible_text(), "");

        typer.advance(ms(1));
        assert_eq!(typer.visible_text(), "H");

        typer.advance(ms(100));
        assert_eq!(typer.visible_text(), "Hi");
        typer.advance(ms(100));
        assert_eq!(typer.visible_text(), "Hi!");
        assert!(typer.cursor_visible());

        // one more tick notices the end, then the cursor lingers
        typer.advance(ms(1099));
        assert!(typer.cursor_visible());
        typer.advance(ms(1));
        assert!(!typer.cursor_visible());
        assert!(!typer.is_animating());
    }

    #[test]
    fn typewriter_handles_multibyte_text() {
        let mut typer = Typewriter::new("héllo");
        typer.advance(ms(2100));
        assert_eq!(typer.visible_text(), "hé");
    }

    #[test]
    fn counter_reaches_target_monotonically() {
        let mut counter = CounterAnimation::new(100, ms(2000));
        counter.start();

        let mut last = 0;
        let mut ticks = 0;
        while !counter.is_finished() {
            counter.advance(CounterAnimation::TICK);
            let value = counter.value();
            assert!(value >= last);
            assert!(value <= 100);
            last = value;
            ticks += 1;
            assert!(ticks < 1000);
        }

        assert_eq!(counter.value(), 100);
        assert!((125..=126).contains(&ticks));
    }

    #[test]
    fn counter_waits_for_start() {
        let mut counter = CounterAnimation::new(42, ms(2000));
        counter.advance(ms(5000));
        assert_eq!(counter.value(), 0);
        assert!(!counter.is_finished());

        counter.start();
        counter.advance(ms(5000));
        assert_eq!(counter.value(), 42);
    }

    #[test]
    fn word_reveal_staggers() {
        let mut words = WordReveal::new("hello brave new world");
        assert_eq!(words.words().len(), 4);
        assert_eq!(words.progress(0), 0.0);

        words.reveal();
        words.advance(ms(300));
        assert!((words.progress(0) - 0.5).abs() < 1e-4);
        assert!((words.progress(3) - 0.0).abs() < 1e-4);
        assert!(words.is_animating());

        words.advance(ms(600));
        assert_eq!(words.progress(3), 1.0);
        assert!(!words.is_animating());
    }

    #[test]
    fn glitch_settles_on_original() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut glitch = GlitchText::new("Jane");
        glitch.hover();

        glitch.advance(GlitchText::TICK, &mut rng);
        assert_ne!(glitch.text(), "Jane");
        assert_eq!(glitch.text().chars().count(), 4);

        // 4 chars at a third per tick: 12 ticks to settle plus the final one
        glitch.advance(GlitchText::TICK * 12, &mut rng);
        assert_eq!(glitch.text(), "Jane");
        assert!(!glitch.is_animating());
    }
}
