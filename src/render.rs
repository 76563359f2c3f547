use std::io::Write;

use log::error;
use serde::Serialize;

pub const LOADING: &str = "...loading";
pub const NO_RESULTS: &str = "(no results)";
pub const SAVE_LABEL: &str = "(Save)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    NoResults,
}

impl Placeholder {
    pub fn text(self) -> &'static str {
        match self {
            Self::Loading => LOADING,
            Self::NoResults => NO_RESULTS,
        }
    }
}

/// A rendered word carrying its save affordance: `number` is what a
/// save trigger refers to, unique across the current result view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub number: usize,
    pub word: String,
}

/// Where the lookup workflow draws its output.
pub trait RenderSurface: Send {
    fn set_description(&mut self, text: &str);
    /// Drops everything in the results area, placeholders included.
    fn clear_results(&mut self);
    fn show_placeholder(&mut self, placeholder: Placeholder);
    fn append_header(&mut self, text: &str);
    fn append_list(&mut self, entries: &[Entry]);
    fn set_saved_words(&mut self, text: &str);
}

/// Line-oriented surface. A terminal cannot take lines back, so
/// `clear_results` is a no-op and each update is appended.
pub struct TerminalSurface<W> {
    out: W,
    show_saved: bool,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, show_saved: true }
    }

    /// For one-shot queries, where there is no save-list to show.
    pub fn without_saved_words(out: W) -> Self {
        Self { out, show_saved: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: std::fmt::Arguments) {
        if let Err(err) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            error!("cannot write to terminal: {}", err);
        }
    }
}

impl<W: Write + Send> RenderSurface for TerminalSurface<W> {
    fn set_description(&mut self, text: &str) {
        self.emit(format_args!("\n{}", text));
    }

    fn clear_results(&mut self) {}

    fn show_placeholder(&mut self, placeholder: Placeholder) {
        self.emit(format_args!("  {}", placeholder.text()));
    }

    fn append_header(&mut self, text: &str) {
        self.emit(format_args!("  {}", text));
    }

    fn append_list(&mut self, entries: &[Entry]) {
        for entry in entries {
            self.emit(format_args!(
                "  {:>4}. {} {}",
                entry.number, entry.word, SAVE_LABEL
            ));
        }
    }

    fn set_saved_words(&mut self, text: &str) {
        if self.show_saved {
            self.emit(format_args!("Saved words: {}", text));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    Description(String),
    ClearResults,
    Placeholder(Placeholder),
    Header(String),
    List(Vec<Entry>),
    SavedWords(String),
}

/// Keeps every instruction it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<RenderOp>,
}

impl RecordingSurface {
    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// What the results area currently holds: everything after the last clear.
    pub fn results(&self) -> Vec<RenderOp> {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == RenderOp::ClearResults)
            .map_or(0, |i| i + 1);
        self.ops[start..]
            .iter()
            .filter(|op| !matches!(op, RenderOp::Description(_) | RenderOp::SavedWords(_)))
            .cloned()
            .collect()
    }

    pub fn description(&self) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            RenderOp::Description(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn saved_words(&self) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            RenderOp::SavedWords(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn set_description(&mut self, text: &str) {
        self.ops.push(RenderOp::Description(text.to_owned()));
    }

    fn clear_results(&mut self) {
        self.ops.push(RenderOp::ClearResults);
    }

    fn show_placeholder(&mut self, placeholder: Placeholder) {
        self.ops.push(RenderOp::Placeholder(placeholder));
    }

    fn append_header(&mut self, text: &str) {
        self.ops.push(RenderOp::Header(text.to_owned()));
    }

    fn append_list(&mut self, entries: &[Entry]) {
        self.ops.push(RenderOp::List(entries.to_vec()));
    }

    fn set_saved_words(&mut self, text: &str) {
        self.ops.push(RenderOp::SavedWords(text.to_owned()));
    }
}
