use std::{io::Write, sync::Arc};

use log::{debug, error};
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::{JoinError, JoinSet},
};

use crate::{
    datamuse::{Relation, WordSource},
    lookup::{Lookup, Outcome},
    render::RenderSurface,
};

pub const HELP: &str = "\
Type a word and press Enter to list its rhymes.
  :r [word]          rhymes for word (or the current word)
  :s [word]          words with a similar meaning
  :save <n|word>     save result number n, or a word
  :saved             show saved words
  :help              this text
  :q                 quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Entry(usize),
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// `word` replaces the current input when given.
    Lookup {
        relation: Relation,
        word: Option<String>,
    },
    Save(SaveTarget),
    ShowSaved,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("unknown command `:{0}`, try :help")]
    UnknownCommand(String),
    #[error("`:{0}` needs an argument")]
    MissingArgument(&'static str),
}

/// Reads one line of user input as a trigger. A line without a leading `:`
/// is a word typed into the input followed by Enter, which asks for rhymes.
pub fn parse_trigger(line: &str) -> Result<Trigger, TriggerError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Trigger::Nothing);
    }

    let command = match line.strip_prefix(':') {
        Some(command) => command,
        None => {
            return Ok(Trigger::Lookup {
                relation: Relation::Rhymes,
                word: Some(line.to_owned()),
            })
        }
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (command, None),
    };
    let word = arg.map(str::to_owned);

    let trigger = match name {
        "r" | "rhymes" => Trigger::Lookup { relation: Relation::Rhymes, word },
        "s" | "similar" => Trigger::Lookup { relation: Relation::Similar, word },
        "save" => {
            let arg = arg.ok_or(TriggerError::MissingArgument("save"))?;
            match arg.parse::<usize>() {
                Ok(n) => Trigger::Save(SaveTarget::Entry(n)),
                Err(_) => Trigger::Save(SaveTarget::Word(arg.to_owned())),
            }
        }
        "saved" => Trigger::ShowSaved,
        "h" | "help" | "?" => Trigger::Help,
        "q" | "quit" | "exit" => Trigger::Quit,
        x => return Err(TriggerError::UnknownCommand(x.to_owned())),
    };
    Ok(trigger)
}

/// Feeds triggers read from `input` into `lookup` until end of input or `:q`.
///
/// Lookups run as background tasks so further commands are read while a
/// request is in flight. At end of input the remaining lookups are awaited;
/// `:q` abandons them.
pub async fn run_session<S, R, I, W>(
    lookup: Arc<Lookup<S, R>>,
    input: I,
    mut out: W,
) -> std::io::Result<()>
where
    S: WordSource + 'static,
    R: RenderSurface + 'static,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut current_word = String::new();
    let mut in_flight: JoinSet<Outcome> = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        reap_finished(&mut in_flight);

        let trigger = match parse_trigger(&line) {
            Ok(trigger) => trigger,
            Err(err) => {
                writeln!(out, "{}", err)?;
                continue;
            }
        };
        debug!("trigger {:?}", trigger);

        match trigger {
            Trigger::Lookup { relation, word } => {
                if let Some(word) = word {
                    current_word = word;
                }
                if current_word.is_empty() {
                    writeln!(out, "type a word first")?;
                    continue;
                }
                let pending = lookup.start(relation, &current_word);
                let lookup = Arc::clone(&lookup);
                in_flight.spawn(async move { lookup.resolve(pending).await });
            }
            Trigger::Save(SaveTarget::Entry(n)) => {
                if lookup.save_entry(n).is_none() {
                    writeln!(out, "no result numbered {}", n)?;
                }
            }
            Trigger::Save(SaveTarget::Word(word)) => {
                lookup.save_word(&word);
            }
            Trigger::ShowSaved => writeln!(out, "Saved words: {}", lookup.saved_words())?,
            Trigger::Help => writeln!(out, "{}", HELP)?,
            Trigger::Quit => {
                in_flight.abort_all();
                return Ok(());
            }
            Trigger::Nothing => {}
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        log_finished(joined);
    }
    Ok(())
}

/// Collects lookups that have already completed, without waiting on the
/// rest. Returns how many were collected.
fn reap_finished(in_flight: &mut JoinSet<Outcome>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = in_flight.try_join_next() {
        log_finished(joined);
        reaped += 1;
    }
    reaped
}

fn log_finished(joined: Result<Outcome, JoinError>) {
    match joined {
        Ok(outcome) => debug!("lookup finished: {}", outcome),
        Err(err) => error!("lookup task failed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        datamuse::Item,
        error::LookupError,
        group_by::KeyOrder,
        render::{Entry, Placeholder, RecordingSurface, RenderOp},
    };

    #[test]
    fn test_parse_trigger() {
        struct ParseTestCase<'a> {
            line: &'a str,
            expected: Result<Trigger, TriggerError>,
        }

        let lookup = |relation, word: Option<&str>| -> Result<Trigger, TriggerError> {
            Ok(Trigger::Lookup { relation, word: word.map(str::to_owned) })
        };

        let test_cases = vec![
            ParseTestCase { line: "", expected: Ok(Trigger::Nothing) },
            ParseTestCase { line: "   ", expected: Ok(Trigger::Nothing) },
            ParseTestCase { line: "cat", expected: lookup(Relation::Rhymes, Some("cat")) },
            ParseTestCase { line: "  ice cream ", expected: lookup(Relation::Rhymes, Some("ice cream")) },
            ParseTestCase { line: ":r", expected: lookup(Relation::Rhymes, None) },
            ParseTestCase { line: ":rhymes dog", expected: lookup(Relation::Rhymes, Some("dog")) },
            ParseTestCase { line: ":s  happy ", expected: lookup(Relation::Similar, Some("happy")) },
            ParseTestCase { line: ":similar", expected: lookup(Relation::Similar, None) },
            ParseTestCase { line: ":save 3", expected: Ok(Trigger::Save(SaveTarget::Entry(3))) },
            ParseTestCase {
                line: ":save hat",
                expected: Ok(Trigger::Save(SaveTarget::Word("hat".to_owned()))),
            },
            ParseTestCase { line: ":save", expected: Err(TriggerError::MissingArgument("save")) },
            ParseTestCase { line: ":saved", expected: Ok(Trigger::ShowSaved) },
            ParseTestCase { line: ":help", expected: Ok(Trigger::Help) },
            ParseTestCase { line: ":q", expected: Ok(Trigger::Quit) },
            ParseTestCase {
                line: ":frobnicate",
                expected: Err(TriggerError::UnknownCommand("frobnicate".to_owned())),
            },
        ];

        for case in test_cases {
            assert_eq!(parse_trigger(case.line), case.expected, "case `{}`", case.line);
        }
    }

    struct FixedSource(HashMap<(Relation, String), Vec<Item>>);

    #[async_trait]
    impl WordSource for FixedSource {
        async fn fetch(&self, relation: Relation, word: &str) -> Result<Vec<Item>, LookupError> {
            Ok(self.0.get(&(relation, word.to_owned())).cloned().unwrap_or_default())
        }
    }

    fn session_lookup() -> Arc<Lookup<FixedSource, RecordingSurface>> {
        let mut responses = HashMap::new();
        responses.insert(
            (Relation::Rhymes, "cat".to_owned()),
            serde_json::from_value(json!([{"word": "hat", "numSyllables": 1}])).unwrap(),
        );
        responses.insert(
            (Relation::Similar, "cat".to_owned()),
            serde_json::from_value(json!([{"word": "feline"}, {"word": "kitty"}])).unwrap(),
        );
        Arc::new(Lookup::new(
            FixedSource(responses),
            RecordingSurface::default(),
            KeyOrder::Lexical,
        ))
    }

    async fn run(lookup: &Arc<Lookup<FixedSource, RecordingSurface>>, script: &str) -> String {
        let mut out = Vec::new();
        run_session(Arc::clone(lookup), script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_buttons_use_current_word() {
        let lookup = session_lookup();
        run(&lookup, "cat\n:s\n").await;

        lookup.inspect_surface(|s| {
            assert_eq!(s.description(), Some("Words with a similar meaning to cat:"));
        });
        assert_eq!(
            lookup.entries(),
            vec![
                Entry { number: 1, word: "feline".to_owned() },
                Entry { number: 2, word: "kitty".to_owned() },
            ]
        );
    }

    #[tokio::test]
    async fn test_lookup_without_word() {
        let lookup = session_lookup();
        let out = run(&lookup, ":r\n").await;

        assert_eq!(out, "type a word first\n");
        lookup.inspect_surface(|s| assert_eq!(s.description(), None));
    }

    #[tokio::test]
    async fn test_saving_words() {
        let lookup = session_lookup();
        let out = run(&lookup, ":save cat\n:save dog\n:save cat\n:saved\n:save 7\n").await;

        assert_eq!(out, "Saved words: cat, dog\nno result numbered 7\n");
        lookup.inspect_surface(|s| assert_eq!(s.saved_words(), Some("cat, dog")));
    }

    #[tokio::test]
    async fn test_unknown_word_shows_no_results() {
        let lookup = session_lookup();
        run(&lookup, "zzxq\n").await;

        lookup.inspect_surface(|s| {
            assert_eq!(s.description(), Some("Words that rhyme with zzxq:"));
            assert_eq!(s.results(), vec![RenderOp::Placeholder(Placeholder::NoResults)]);
        });
    }

    #[tokio::test]
    async fn test_reap_finished() {
        struct ReapTestCase {
            finished: usize,
            pending: usize,
        }

        let test_cases = vec![
            ReapTestCase { finished: 0, pending: 0 },
            ReapTestCase { finished: 3, pending: 0 },
            ReapTestCase { finished: 2, pending: 1 },
            ReapTestCase { finished: 0, pending: 1 },
        ];

        for case in test_cases {
            let mut in_flight = JoinSet::new();
            let (release, wait) = tokio::sync::oneshot::channel::<()>();
            for _ in 0..case.finished {
                in_flight.spawn(async { Outcome::NoResults });
            }
            if case.pending > 0 {
                in_flight.spawn(async move {
                    let _ = wait.await;
                    Outcome::Superseded
                });
            }

            let mut reaped = 0;
            for _ in 0..100 {
                reaped += reap_finished(&mut in_flight);
                if reaped == case.finished {
                    break;
                }
                tokio::task::yield_now().await;
            }

            assert_eq!(reaped, case.finished, "finished {}", case.finished);
            assert_eq!(in_flight.len(), case.pending, "pending {}", case.pending);
            drop(release);
            in_flight.abort_all();
        }
    }

    #[tokio::test]
    async fn test_errors_and_quit() {
        let lookup = session_lookup();
        let out = run(&lookup, ":nope\n:help\n:q\n:save never\n").await;

        assert!(out.starts_with("unknown command `:nope`, try :help\n"));
        assert!(out.contains(":save <n|word>"));
        assert!(lookup.saved_words().is_empty());
    }
}
