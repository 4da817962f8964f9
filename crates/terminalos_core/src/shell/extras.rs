//! Password generation, fortunes and decorative text (banner, logo,
//! figlet lettering).

use crate::model::account::Language;
use crate::shell::error::{ArgumentIssue, CommandError};
use figlet_rs::FIGfont;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;

pub const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";
pub const PASSWORD_LENGTH: RangeInclusive<usize> = 1..=100;

static STANDARD_FONT: Lazy<Result<FIGfont, String>> = Lazy::new(FIGfont::standard);

const FORTUNES_EN: [&str; 4] = [
    "You will have a pleasant surprise.",
    "A thrilling time is in your immediate future.",
    "Your hard work will soon pay off.",
    "New opportunities are around the corner.",
];

const FORTUNES_SR: [&str; 4] = [
    "Čeka vas prijatno iznenađenje.",
    "Uskoro vas očekuje uzbudljivo vreme.",
    "Vaš trud će uskoro biti nagrađen.",
    "Nove prilike su iza ugla.",
];

pub const BANNER: [&str; 6] = [
    " ____        _        _   ____   ____   ",
    "| __ )  __ _| |_ __ _| | |___ \\ |___ \\  ",
    "|  _ \\ / _` | __/ _` | |   __) |  __) | ",
    "| |_) | (_| | || (_| | |  / __/  / __/  ",
    "|____/ \\__,_|\\__\\__,_|_| |_____| |_____|",
    "                                        ",
];

pub const NEOFETCH_LOGO: [&str; 8] = [
    "   ******   ",
    " *        * ",
    "*  ****   * ",
    "* *       * ",
    "* *       * ",
    "*  ****   * ",
    " *        * ",
    "   ******   ",
];

pub const FACE_FRAMES: [&str; 5] = ["(>^_^)>", "<(^_^<)", "^(^_^)^", "v(^_^)v", "(^_^)"];

/// Parses and range-checks a raw password length argument.
pub fn parse_password_length(raw: Option<&str>) -> Result<usize, ArgumentIssue> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|length| PASSWORD_LENGTH.contains(length))
        .ok_or(ArgumentIssue::PasswordLength)
}

/// Samples `length` characters uniformly from `PASSWORD_CHARSET`.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())]))
        .collect()
}

pub fn pick_fortune<R: Rng + ?Sized>(rng: &mut R, language: Language) -> &'static str {
    let pool: &[&'static str] = match language {
        Language::English => &FORTUNES_EN,
        Language::Serbian => &FORTUNES_SR,
    };
    pool.choose(rng).copied().unwrap_or(FORTUNES_EN[0])
}

/// Renders `text` in the standard figlet font.
///
/// Characters outside printable ASCII are dropped; when nothing printable
/// remains the text is framed in a box instead.
pub fn ascii_art(text: &str) -> Result<Vec<String>, CommandError> {
    let font = STANDARD_FONT
        .as_ref()
        .map_err(|err| CommandError::AsciiArt(err.clone()))?;
    let printable: String = text
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    if printable.trim().is_empty() {
        return Ok(framed_text(text));
    }
    let Some(figure) = font.convert(&printable) else {
        return Ok(framed_text(text));
    };
    let mut lines: Vec<String> = figure
        .to_string()
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

/// Frames `text` in an ASCII box.
pub fn framed_text(text: &str) -> Vec<String> {
    let width = text.chars().count() + 2;
    let border = format!("+{}+", "-".repeat(width));
    vec![border.clone(), format!("| {text} |"), border]
}
