use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::{debug, error, info, warn};

use crate::{
    datamuse::{Item, Relation, WordSource},
    error::LookupError,
    group_by::{group_by_ordered, KeyOrder, KeySelector},
    render::{Entry, Placeholder, RenderSurface},
    save_list::SaveList,
};

pub const SYLLABLES_FIELD: &str = "numSyllables";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results were drawn; holds the number of savable entries.
    Rendered(usize),
    NoResults,
    Failed,
    /// A newer lookup was started before this one resolved.
    Superseded,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendered(n) => write!(f, "{} entries", n),
            Self::NoResults => write!(f, "no results"),
            Self::Failed => write!(f, "failed"),
            Self::Superseded => write!(f, "superseded"),
        }
    }
}

/// A lookup that has drawn its loading state and waits for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    generation: u64,
    relation: Relation,
    word: String,
}

struct SessionState<R> {
    surface: R,
    save_list: SaveList,
    entries: Vec<Entry>,
    generation: u64,
}

/// The word lookup workflow of one session.
///
/// Every lookup takes the next generation number when it starts, and only
/// the lookup holding the latest number may draw its results; older ones
/// resolve to `Outcome::Superseded`. All methods take `&self` so lookups can
/// overlap while sharing one surface and save-list.
pub struct Lookup<S, R> {
    source: S,
    key_order: KeyOrder,
    state: Mutex<SessionState<R>>,
}

impl<S: WordSource, R: RenderSurface> Lookup<S, R> {
    pub fn new(source: S, mut surface: R, key_order: KeyOrder) -> Self {
        let save_list = SaveList::new();
        surface.set_saved_words(&save_list.to_string());

        Self {
            source,
            key_order,
            state: Mutex::new(SessionState {
                surface,
                save_list,
                entries: vec![],
                generation: 0,
            }),
        }
    }

    pub async fn show_rhymes(&self, word: &str) -> Outcome {
        self.show(Relation::Rhymes, word).await
    }

    pub async fn show_similar(&self, word: &str) -> Outcome {
        self.show(Relation::Similar, word).await
    }

    pub async fn show(&self, relation: Relation, word: &str) -> Outcome {
        let pending = self.start(relation, word);
        self.resolve(pending).await
    }

    /// Draws the description and loading placeholder and claims a generation.
    /// Returns at once; the request itself is made by `resolve`.
    pub fn start(&self, relation: Relation, word: &str) -> Pending {
        let mut state = self.lock();
        state.generation += 1;
        state.entries.clear();
        state.surface.set_description(&relation.describe(word));
        state.surface.clear_results();
        state.surface.show_placeholder(Placeholder::Loading);

        info!("looking up {} for `{}`", relation, word);
        Pending {
            generation: state.generation,
            relation,
            word: word.to_owned(),
        }
    }

    pub async fn resolve(&self, pending: Pending) -> Outcome {
        let result = self.source.fetch(pending.relation, &pending.word).await;
        self.finish(pending, result)
    }

    fn finish(&self, pending: Pending, result: Result<Vec<Item>, LookupError>) -> Outcome {
        let mut state = self.lock();
        if pending.generation != state.generation {
            debug!(
                "dropping stale {} for `{}` (generation {}, latest {})",
                pending.relation, pending.word, pending.generation, state.generation
            );
            return Outcome::Superseded;
        }

        state.surface.clear_results();
        let items = match result {
            Ok(items) => items,
            Err(err) => {
                error!("{} lookup for `{}` failed: {}", pending.relation, pending.word, err);
                return Outcome::Failed;
            }
        };

        if items.is_empty() {
            state.surface.show_placeholder(Placeholder::NoResults);
            return Outcome::NoResults;
        }

        let entries = match pending.relation {
            Relation::Rhymes => render_by_syllables(&mut state.surface, items, self.key_order),
            Relation::Similar => render_list(&mut state.surface, items),
        };
        let count = entries.len();
        state.entries = entries;
        Outcome::Rendered(count)
    }

    /// Saves the word shown as entry `number` of the current results.
    pub fn save_entry(&self, number: usize) -> Option<String> {
        let word = {
            let state = self.lock();
            state
                .entries
                .iter()
                .find(|e| e.number == number)
                .map(|e| e.word.clone())
        };
        match word {
            Some(word) => {
                self.save_word(&word);
                Some(word)
            }
            None => {
                debug!("no entry {} to save", number);
                None
            }
        }
    }

    /// Appends `word` to the save-list and redraws it. Returns false when
    /// the word was already saved.
    pub fn save_word(&self, word: &str) -> bool {
        let mut state = self.lock();
        if !state.save_list.add(word) {
            return false;
        }
        let text = state.save_list.to_string();
        state.surface.set_saved_words(&text);
        true
    }

    pub fn saved_words(&self) -> SaveList {
        self.lock().save_list.clone()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.lock().entries.clone()
    }

    pub fn inspect_surface<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.lock().surface)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn render_by_syllables(
    surface: &mut impl RenderSurface,
    items: Vec<Item>,
    key_order: KeyOrder,
) -> Vec<Entry> {
    let grouped = group_by_ordered(items, &KeySelector::field(SYLLABLES_FIELD), key_order);

    let mut entries = vec![];
    for group in grouped {
        surface.append_header(&format!("Syllables: {}", group.key));
        let section = to_entries(group.items, entries.len());
        surface.append_list(&section);
        entries.extend(section);
    }
    entries
}

fn render_list(surface: &mut impl RenderSurface, items: Vec<Item>) -> Vec<Entry> {
    let entries = to_entries(items, 0);
    surface.append_list(&entries);
    entries
}

fn to_entries(items: Vec<Item>, numbered_so_far: usize) -> Vec<Entry> {
    items
        .into_iter()
        .filter_map(|item| match item.word() {
            Some(word) => Some(word.to_owned()),
            None => {
                warn!("skipping result without a word: {:?}", item);
                None
            }
        })
        .enumerate()
        .map(|(i, word)| Entry {
            number: numbered_so_far + i + 1,
            word,
        })
        .collect()
}
