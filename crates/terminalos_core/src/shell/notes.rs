//! Notes sub-machine.
//!
//! # Invariants
//! - Stored notes are trimmed and never empty.
//! - Deletion uses 1-based indices; an invalid index leaves notes untouched.

use crate::model::account::Language;
use crate::shell::error::{ArgumentIssue, CommandError};
use crate::shell::output::Screen;
use crate::shell::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    AwaitingAction,
    AwaitingText,
    AwaitingIndex,
}

/// Appends `text` when it is non-empty after trimming.
pub fn write_note(notes: &mut Vec<String>, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    notes.push(text.to_string());
    true
}

/// Removes the `index`-th note (1-based) and returns it.
pub fn delete_note(notes: &mut Vec<String>, index: &str) -> Result<String, CommandError> {
    let max = notes.len();
    match index.trim().parse::<usize>() {
        Ok(k) if (1..=max).contains(&k) => Ok(notes.remove(k - 1)),
        _ => Err(CommandError::InvalidArgument(ArgumentIssue::NoteIndex {
            max,
        })),
    }
}

#[derive(Debug)]
pub struct NoteMachine {
    state: NoteState,
}

impl NoteMachine {
    pub fn enter(language: Language, screen: &mut Screen) -> Self {
        let machine = Self {
            state: NoteState::AwaitingAction,
        };
        machine.render_prompt(0, language, screen);
        machine
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    /// Consumes one input line.
    pub fn step(
        &mut self,
        input: &str,
        notes: &mut Vec<String>,
        language: Language,
        screen: &mut Screen,
    ) -> Step {
        match self.state {
            NoteState::AwaitingAction => {
                let input = input.trim();
                let (action, rest) = match input.split_once(char::is_whitespace) {
                    Some((action, rest)) => (action, Some(rest)),
                    None => (input, None),
                };
                match (action.to_lowercase().as_str(), rest) {
                    ("write", Some(text)) => confirm_write(write_note(notes, text), language, screen),
                    ("write", None) => self.state = NoteState::AwaitingText,
                    ("read", _) => read_notes(notes, language, screen),
                    ("delete", _) if notes.is_empty() => screen.info(language.pick(
                        "No notes to delete.",
                        "Nema beleški za brisanje.",
                    )),
                    ("delete", Some(index)) => apply_delete(notes, index, language, screen),
                    ("delete", None) => self.state = NoteState::AwaitingIndex,
                    ("exit", _) => {
                        screen.info(language.pick(
                            "Exiting notes manager.",
                            "Izlazim iz menadžera beleški.",
                        ));
                        return Step::Exit;
                    }
                    _ => screen.error(language.pick("Unknown option.", "Nepoznata opcija.")),
                }
            }
            NoteState::AwaitingText => {
                confirm_write(write_note(notes, input), language, screen);
                self.state = NoteState::AwaitingAction;
            }
            NoteState::AwaitingIndex => {
                if input.trim().is_empty() {
                    screen.info(language.pick("Delete cancelled.", "Brisanje otkazano."));
                } else {
                    apply_delete(notes, input, language, screen);
                }
                self.state = NoteState::AwaitingAction;
            }
        }
        self.render_prompt(notes.len(), language, screen);
        Step::Stay
    }

    fn render_prompt(&self, note_count: usize, language: Language, screen: &mut Screen) {
        let prompt = match (self.state, language) {
            (NoteState::AwaitingAction, _) => language
                .pick(
                    "Note Manager: (write/read/delete/exit)",
                    "Menadžer beleški: (write/read/delete/exit)",
                )
                .to_string(),
            (NoteState::AwaitingText, _) => language
                .pick("Enter note text:", "Unesite tekst beleške:")
                .to_string(),
            (NoteState::AwaitingIndex, Language::English) => {
                format!("Enter note number to delete (1-{note_count}):")
            }
            (NoteState::AwaitingIndex, Language::Serbian) => {
                format!("Unesite broj beleške za brisanje (1-{note_count}):")
            }
        };
        screen.info(prompt);
    }
}

fn confirm_write(saved: bool, language: Language, screen: &mut Screen) {
    if saved {
        screen.info(language.pick("Note saved.", "Beleška sačuvana."));
    } else {
        screen.info(language.pick("No note saved.", "Beleška nije sačuvana."));
    }
}

fn read_notes(notes: &[String], language: Language, screen: &mut Screen) {
    if notes.is_empty() {
        screen.info(language.pick("No notes available.", "Nema dostupnih beleški."));
        return;
    }
    screen.info(language.pick("Your notes:", "Vaše beleške:"));
    for (i, note) in notes.iter().enumerate() {
        screen.plain(format!("{}) {note}", i + 1));
    }
}

fn apply_delete(notes: &mut Vec<String>, index: &str, language: Language, screen: &mut Screen) {
    match delete_note(notes, index) {
        Ok(deleted) => screen.info(match language {
            Language::English => format!("Deleted note: {deleted}"),
            Language::Serbian => format!("Obrisana beleška: {deleted}"),
        }),
        Err(err) => screen.error(err.localized(language)),
    }
}
