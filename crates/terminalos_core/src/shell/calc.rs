//! Calculator sub-machine.
//!
//! # Invariants
//! - Only successful results are appended to history.
//! - Division by zero and overflow leave history untouched and return to
//!   `AwaitingOperator`.
//! - The machine consumes exactly one line per `step`.

use crate::model::account::Language;
use crate::shell::error::{ArgumentIssue, CommandError};
use crate::shell::output::{LineStyle, Screen};
use crate::shell::Step;
use log::debug;

const HISTORY_PREVIEW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    /// Floor division, rounding toward negative infinity.
    Divide,
}

impl Operator {
    pub fn apply(self, a: i64, b: i64) -> Result<i64, CommandError> {
        let result = match self {
            Self::Add => a.checked_add(b),
            Self::Subtract => a.checked_sub(b),
            Self::Multiply => a.checked_mul(b),
            Self::Divide => return floor_div(a, b),
        };
        result.ok_or(CommandError::InvalidArgument(ArgumentIssue::Overflow))
    }

    fn label(self, language: Language) -> &'static str {
        match self {
            Self::Add => language.pick("Sum", "Zbir"),
            Self::Subtract => language.pick("Result", "Rezultat"),
            Self::Multiply => language.pick("Product", "Proizvod"),
            Self::Divide => language.pick("Quotient", "Količnik"),
        }
    }
}

fn floor_div(a: i64, b: i64) -> Result<i64, CommandError> {
    if b == 0 {
        return Err(CommandError::DivisionByZero);
    }
    let quotient = a
        .checked_div(b)
        .ok_or(CommandError::InvalidArgument(ArgumentIssue::Overflow))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Operate(Operator),
    History,
    Quit,
}

fn parse_choice(input: &str) -> Option<Choice> {
    match input.trim().to_lowercase().as_str() {
        "add" | "+" | "n" => Some(Choice::Operate(Operator::Add)),
        "subtract" | "-" | "m" => Some(Choice::Operate(Operator::Subtract)),
        "multiply" | "*" | "e" => Some(Choice::Operate(Operator::Multiply)),
        "divide" | "/" | "d" => Some(Choice::Operate(Operator::Divide)),
        "history" | "h" => Some(Choice::History),
        "quit" | "q" => Some(Choice::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcState {
    AwaitingOperator,
    AwaitingFirst(Operator),
    AwaitingSecond(Operator, i64),
}

#[derive(Debug)]
pub struct CalcMachine {
    state: CalcState,
}

impl CalcMachine {
    /// Enters calculator mode and renders the operator prompt.
    pub fn enter(language: Language, screen: &mut Screen) -> Self {
        screen.info(language.pick(
            "Entering calculator mode.",
            "Ulazim u režim kalkulatora.",
        ));
        let machine = Self {
            state: CalcState::AwaitingOperator,
        };
        machine.render_prompt(language, screen);
        machine
    }

    pub fn state(&self) -> CalcState {
        self.state
    }

    /// Consumes one input line.
    pub fn step(
        &mut self,
        input: &str,
        history: &mut Vec<i64>,
        language: Language,
        screen: &mut Screen,
    ) -> Step {
        let input = input.trim();
        match self.state {
            CalcState::AwaitingOperator => match parse_choice(input) {
                Some(Choice::Quit) => {
                    screen.info(language.pick("Leaving calculator...", "Izlazim iz kalkulatora..."));
                    return Step::Exit;
                }
                Some(Choice::History) => show_history(history, language, screen),
                Some(Choice::Operate(op)) => self.state = CalcState::AwaitingFirst(op),
                None => screen.error(language.pick(
                    "Invalid option! Try again.",
                    "Nevažeća opcija! Pokušajte ponovo.",
                )),
            },
            CalcState::AwaitingFirst(op) => match parse_operand(input) {
                Operand::Cancel => self.state = CalcState::AwaitingOperator,
                Operand::Invalid(err) => screen.error(err.localized(language)),
                Operand::Value(a) => self.state = CalcState::AwaitingSecond(op, a),
            },
            CalcState::AwaitingSecond(op, a) => match parse_operand(input) {
                Operand::Cancel => self.state = CalcState::AwaitingOperator,
                Operand::Invalid(err) => screen.error(err.localized(language)),
                Operand::Value(b) => {
                    match op.apply(a, b) {
                        Ok(result) => {
                            history.push(result);
                            screen.info(format!("{}: {result}", op.label(language)));
                        }
                        Err(err) => {
                            debug!(
                                "event=calc_apply module=shell status=error error_code={}",
                                err.code()
                            );
                            screen.error(err.localized(language));
                        }
                    }
                    self.state = CalcState::AwaitingOperator;
                }
            },
        }
        self.render_prompt(language, screen);
        Step::Stay
    }

    fn render_prompt(&self, language: Language, screen: &mut Screen) {
        let prompt = match self.state {
            CalcState::AwaitingOperator => language.pick(
                "Options: n(+) m(-) e(*) d(/) h(history) q(quit)",
                "Opcije: n(+) m(-) e(*) d(/) h(istorija) q(izlaz)",
            ),
            CalcState::AwaitingFirst(_) => language.pick(
                "Enter first number (empty or q to cancel):",
                "Unesite prvi broj (prazno ili q za otkazivanje):",
            ),
            CalcState::AwaitingSecond(..) => language.pick(
                "Enter second number (empty or q to cancel):",
                "Unesite drugi broj (prazno ili q za otkazivanje):",
            ),
        };
        screen.info(prompt);
    }
}

enum Operand {
    Value(i64),
    Cancel,
    Invalid(CommandError),
}

fn parse_operand(input: &str) -> Operand {
    if input.is_empty() || matches!(parse_choice(input), Some(Choice::Quit)) {
        return Operand::Cancel;
    }
    match input.parse::<i64>() {
        Ok(value) => Operand::Value(value),
        Err(_) => Operand::Invalid(CommandError::InvalidArgument(ArgumentIssue::Operand)),
    }
}

fn show_history(history: &[i64], language: Language, screen: &mut Screen) {
    if history.is_empty() {
        screen.info(language.pick(
            "No history saved yet.",
            "Još uvek nema sačuvane istorije.",
        ));
        return;
    }
    screen.info(language.pick("Calculation History:", "Istorija kalkulacija:"));
    let start = history.len().saturating_sub(HISTORY_PREVIEW);
    for (i, value) in history[start..].iter().enumerate() {
        screen.line(LineStyle::Plain, format!("{}) {value}", i + 1));
    }
}
