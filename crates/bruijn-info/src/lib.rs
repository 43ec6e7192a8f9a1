//! Annotations recorded against source positions for editor tooling.
//!
//! The elaborator, possibly from several threads, records the type it
//! inferred for an expression, the overloads it considered, or the coercion
//! it inserted. An editor later asks for everything recorded on a line.

use bruijn_core::syn::{print_syntax_to_string, Syntax};
use bruijn_support::LinePosition;
use derive_new::new;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// What was recorded at a position. Terms are rendered when the record is
/// created, so records can be shared between threads.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum InfoKind {
    /// The type of the expression at this position.
    Type(String),
    /// A type that was synthesized rather than written.
    Synth(String),
    /// The alternatives of an overloaded name.
    Overload(Vec<String>),
    /// A coercion inserted at this position.
    Coercion(String),
}

impl InfoKind {
    fn tag(&self) -> &'static str {
        match self {
            InfoKind::Type(_) => "TYPE",
            InfoKind::Synth(_) => "SYNTH",
            InfoKind::Overload(_) => "OVERLOAD",
            InfoKind::Coercion(_) => "COERCION",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, new)]
pub struct InfoData {
    pub position: LinePosition,
    pub kind: InfoKind,
}

impl InfoData {
    pub fn type_info(position: LinePosition, ty: &Syntax) -> InfoData {
        InfoData::new(position, InfoKind::Type(print_syntax_to_string(ty)))
    }

    pub fn synth_info(position: LinePosition, ty: &Syntax) -> InfoData {
        InfoData::new(position, InfoKind::Synth(print_syntax_to_string(ty)))
    }

    pub fn overload_info<'a, I>(position: LinePosition, choices: I) -> InfoData
    where
        I: IntoIterator<Item = &'a Syntax>,
    {
        let choices = choices.into_iter().map(print_syntax_to_string).collect();
        InfoData::new(position, InfoKind::Overload(choices))
    }

    pub fn coercion_info(position: LinePosition, coercion: &Syntax) -> InfoData {
        InfoData::new(position, InfoKind::Coercion(print_syntax_to_string(coercion)))
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    /// Write the record in the editor protocol: a header naming the kind and
    /// position, the content, and a closing `-- ACK`.
    pub fn display<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "-- {}|{}", self.kind.tag(), self.position)?;
        match &self.kind {
            InfoKind::Type(text) | InfoKind::Synth(text) | InfoKind::Coercion(text) => {
                writeln!(out, "{text}")?;
            }
            InfoKind::Overload(choices) => {
                for (i, choice) in choices.iter().enumerate() {
                    if i > 0 {
                        writeln!(out, "--")?;
                    }
                    writeln!(out, "{choice}")?;
                }
            }
        }
        writeln!(out, "-- ACK")
    }
}

#[derive(Default, Debug)]
struct Store {
    /// The prefix `data[..sorted_upto]` is known to be sorted by position.
    sorted_upto: usize,
    data: Vec<InfoData>,
}

impl Store {
    fn sort(&mut self) {
        if self.sorted_upto == self.data.len() {
            return;
        }
        // Stable, so records at one position keep their insertion order.
        self.data.sort_by_key(|info| info.position);
        self.sorted_upto = self.data.len();
    }

    fn on_line(&self, line: usize) -> &[InfoData] {
        let start = self.data.partition_point(|info| info.line() < line);
        let end = self.data.partition_point(|info| info.line() <= line);
        &self.data[start..end]
    }
}

/// A thread-safe collection of [`InfoData`], kept sorted by position on
/// demand.
#[derive(Default, Debug)]
pub struct InfoManager {
    store: Mutex<Store>,
}

impl InfoManager {
    pub fn new() -> InfoManager {
        InfoManager::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A panic while holding the lock cannot leave the store half
        // updated, so a poisoned lock is still usable.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, info: InfoData) {
        trace!(position = %info.position, kind = info.kind.tag(), "add info");
        self.lock().data.push(info);
    }

    /// Add every record in `items`. With `remove_duplicates`, a record is
    /// dropped when the record added just before it is at the same position.
    pub fn append<I>(&self, items: I, remove_duplicates: bool)
    where
        I: IntoIterator<Item = InfoData>,
    {
        let mut store = self.lock();
        for info in items {
            if remove_duplicates
                && store
                    .data
                    .last()
                    .is_some_and(|last| last.position == info.position)
            {
                continue;
            }
            store.data.push(info);
        }
    }

    pub fn sort(&self) {
        self.lock().sort();
    }

    /// Forget everything recorded at or after line `line`, e.g. because the
    /// text from that line on was edited.
    pub fn invalidate(&self, line: usize) {
        let mut store = self.lock();
        store.sort();
        let keep = store.data.partition_point(|info| info.line() < line);
        debug!(line, dropped = store.data.len() - keep, "invalidate info");
        store.data.truncate(keep);
        store.sorted_upto = keep;
    }

    /// The records on `line`, ordered by column.
    pub fn query(&self, line: usize) -> Vec<InfoData> {
        let mut store = self.lock();
        store.sort();
        store.on_line(line).to_vec()
    }

    /// Write every record on `line` to `out`, ordered by column.
    pub fn display<W: Write>(&self, line: usize, out: &mut W) -> io::Result<()> {
        let mut store = self.lock();
        store.sort();
        for info in store.on_line(line) {
            info.display(out)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bruijn_core::syn::parse_syntax;
    use insta::assert_snapshot;
    use std::thread;

    fn pos(line: usize, column: usize) -> LinePosition {
        LinePosition::new(line, column)
    }

    fn ty(line: usize, column: usize, text: &str) -> InfoData {
        InfoData::new(pos(line, column), InfoKind::Type(text.to_owned()))
    }

    fn display_to_string(manager: &InfoManager, line: usize) -> String {
        let mut out = Vec::new();
        manager.display(line, &mut out).unwrap();
        String::from_utf8(out).unwrap().trim_end().to_owned()
    }

    #[test]
    fn test_query_sorts_by_column() {
        let manager = InfoManager::new();
        manager.add(ty(2, 8, "b"));
        manager.add(ty(1, 0, "x"));
        manager.add(ty(2, 3, "a"));
        manager.add(ty(3, 0, "y"));
        let texts: Vec<_> = manager
            .query(2)
            .into_iter()
            .map(|info| info.kind)
            .collect();
        assert_eq!(
            texts,
            vec![InfoKind::Type("a".into()), InfoKind::Type("b".into())]
        );
        assert!(manager.query(4).is_empty());
    }

    #[test]
    fn test_sort_is_stable() {
        let manager = InfoManager::new();
        manager.add(ty(1, 0, "first"));
        manager.add(InfoData::new(pos(1, 0), InfoKind::Synth("second".into())));
        manager.sort();
        let kinds: Vec<_> = manager.query(1).into_iter().map(|info| info.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InfoKind::Type("first".into()),
                InfoKind::Synth("second".into())
            ]
        );
    }

    #[test]
    fn test_append_removes_adjacent_duplicates() {
        let manager = InfoManager::new();
        manager.append(vec![ty(1, 0, "a"), ty(1, 0, "b"), ty(1, 2, "c")], true);
        assert_eq!(manager.len(), 2);
        manager.append(vec![ty(1, 2, "d")], true);
        assert_eq!(manager.len(), 2);
        manager.append(vec![ty(1, 2, "d"), ty(1, 2, "e")], false);
        assert_eq!(manager.len(), 4);
    }

    #[test]
    fn test_invalidate_drops_later_lines() {
        let manager = InfoManager::new();
        for line in [5, 1, 3, 2, 4] {
            manager.add(ty(line, 0, "t"));
        }
        manager.invalidate(3);
        assert_eq!(manager.len(), 2);
        assert!(manager.query(3).is_empty());
        assert_eq!(manager.query(2).len(), 1);
        manager.invalidate(1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_records_render_terms() {
        let term = parse_syntax("λ(%x : Prop) → @f %x").unwrap();
        let info = InfoData::type_info(pos(1, 0), &term);
        assert_eq!(info.kind, InfoKind::Type("λ(%0 : Prop) → @f %0".into()));
        let info = InfoData::coercion_info(pos(1, 0), &parse_syntax("@coe").unwrap());
        assert_eq!(info.kind, InfoKind::Coercion("@coe".into()));
    }

    #[test]
    fn test_display_line() {
        let manager = InfoManager::new();
        let nat = parse_syntax("@Nat").unwrap();
        let int = parse_syntax("@Int").unwrap();
        manager.add(InfoData::overload_info(pos(7, 4), [&*nat, &*int]));
        manager.add(InfoData::type_info(pos(7, 0), &parse_syntax("@Nat → @Nat").unwrap()));
        manager.add(InfoData::synth_info(pos(8, 0), &nat));
        assert_snapshot!(display_to_string(&manager, 7), @r"
        -- TYPE|7|0
        @Nat → @Nat
        -- ACK
        -- OVERLOAD|7|4
        @Nat
        --
        @Int
        -- ACK
        ");
        assert_snapshot!(display_to_string(&manager, 8), @r"
        -- SYNTH|8|0
        @Nat
        -- ACK
        ");
    }

    #[test]
    fn test_concurrent_add() {
        let manager = InfoManager::new();
        thread::scope(|s| {
            for t in 0..8 {
                let manager = &manager;
                s.spawn(move || {
                    for line in 0..100 {
                        manager.add(ty(line, t, "t"));
                    }
                });
            }
        });
        assert_eq!(manager.len(), 800);
        let columns: Vec<_> = manager
            .query(42)
            .into_iter()
            .map(|info| info.position.column)
            .collect();
        assert_eq!(columns, (0..8).collect::<Vec<_>>());
    }
}
