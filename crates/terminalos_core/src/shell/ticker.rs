//! Repeating clock and animation tickers.
//!
//! At most one ticker runs at a time; the terminal owns it and the front end
//! calls `Terminal::tick` every `interval()`. Hack tickers are finite: after
//! `HACK_STEPS` frames they print a completion message and report finished.

use crate::model::account::Language;
use crate::shell::extras::{FACE_FRAMES, NEOFETCH_LOGO};
use crate::shell::output::{LineStyle, Screen};
use chrono::Local;
use std::time::Duration;

pub const HACK_STEPS: usize = 10;

pub(crate) const COLOR_RESET_LINE: &str = "Text color reset to default.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerKind {
    Clock,
    AsciiAnim,
    Neofetch,
    /// `hack`: fast green progress run.
    MatrixHack,
    /// `hackfbi`: slow red progress run.
    FbiHack,
}

#[derive(Debug)]
pub struct Ticker {
    kind: TickerKind,
    frame: usize,
    finished: bool,
}

impl Ticker {
    pub fn new(kind: TickerKind) -> Self {
        Self {
            kind,
            frame: 0,
            finished: false,
        }
    }

    pub fn kind(&self) -> TickerKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn interval(&self) -> Duration {
        match self.kind {
            TickerKind::Clock => Duration::from_millis(1000),
            TickerKind::AsciiAnim => Duration::from_millis(300),
            TickerKind::Neofetch => Duration::from_millis(150),
            TickerKind::MatrixHack => Duration::from_millis(100),
            TickerKind::FbiHack => Duration::from_millis(1000),
        }
    }

    /// Renders one frame and advances. A finished ticker renders nothing.
    pub fn advance(&mut self, language: Language, screen: &mut Screen) {
        if self.finished {
            return;
        }
        match self.kind {
            TickerKind::Clock => {
                screen.line(
                    LineStyle::Highlight,
                    Local::now().format("%H:%M:%S").to_string(),
                );
            }
            TickerKind::AsciiAnim => {
                screen.clear();
                screen.line(LineStyle::Highlight, FACE_FRAMES[self.frame]);
                self.frame = (self.frame + 1) % FACE_FRAMES.len();
            }
            TickerKind::Neofetch => {
                screen.clear();
                for (i, row) in NEOFETCH_LOGO.iter().enumerate() {
                    let style = if i == self.frame {
                        LineStyle::Highlight
                    } else {
                        LineStyle::Dim
                    };
                    screen.line(style, *row);
                }
                self.frame = (self.frame + 1) % NEOFETCH_LOGO.len();
            }
            TickerKind::MatrixHack => self.hack_step(
                LineStyle::Success,
                "Matrix hack...",
                language.pick("Matrix hack complete!", "Matrix hack završen!"),
                screen,
            ),
            TickerKind::FbiHack => self.hack_step(
                LineStyle::Alert,
                "Hacking FBI...",
                language.pick("FBI hacked successfully!", "FBI uspešno hakovan!"),
                screen,
            ),
        }
    }

    fn hack_step(&mut self, style: LineStyle, label: &str, done: &str, screen: &mut Screen) {
        self.frame += 1;
        screen.line(style, format!("{label} {}/{HACK_STEPS}", self.frame));
        if self.frame == HACK_STEPS {
            screen.plain(COLOR_RESET_LINE);
            screen.info(done);
            self.finished = true;
        }
    }
}
