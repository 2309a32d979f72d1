use serde_json::Value;

use crate::record::Record;

use super::View;

/// Read operations over an ordered sequence of records.
///
/// Implementors only provide [`records`](Query::records), a snapshot of their
/// current view. Predicates, iterators and sort keys run against that snapshot
/// with no lock held, so they may freely call back into the source.
pub trait Query {
    /// The current view, in order, as a fresh vector.
    fn records(&self) -> Vec<Record>;

    fn all(&self) -> Vec<Record> {
        self.records()
    }

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn first(&self) -> Option<Record> {
        self.records().into_iter().next()
    }

    fn last(&self) -> Option<Record> {
        self.records().pop()
    }

    /// The record whose identity equals `id`. A `null` id never matches.
    fn find(&self, id: impl Into<Value>) -> Option<Record> {
        let id = id.into();
        if id.is_null() {
            return None;
        }
        self.records()
            .into_iter()
            .find(|record| record.id().as_ref() == Some(&id))
    }

    /// First record for which `predicate(record, index)` holds.
    fn detect<P>(&self, mut predicate: P) -> Option<Record>
    where
        P: FnMut(&Record, usize) -> bool,
    {
        self.records()
            .into_iter()
            .enumerate()
            .find(|(index, record)| predicate(record, *index))
            .map(|(_, record)| record)
    }

    fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Record, usize),
        Self: Sized,
    {
        for (index, record) in self.records().iter().enumerate() {
            f(record, index);
        }
        self
    }

    /// A view of the records for which `predicate(record, index)` holds.
    fn select<P>(&self, mut predicate: P) -> View
    where
        P: FnMut(&Record, usize) -> bool,
    {
        self.records()
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| predicate(&record, index).then_some(record))
            .collect()
    }

    /// A view ordered by ascending `key`; ties keep their relative order.
    fn sort<K, F>(&self, key: F) -> View
    where
        K: Ord,
        F: FnMut(&Record) -> K,
    {
        let mut records = self.records();
        records.sort_by_cached_key(key);
        View::new(records)
    }
}
