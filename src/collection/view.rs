use crate::record::Record;

use super::Query;

/// A read-only snapshot produced by `select` or `sort`.
///
/// Views chain: `posts.select(p).sort(k)` filters then sorts, leaving `posts`
/// and every intermediate view as they were.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct View {
    records: Vec<Record>,
}

impl View {
    pub fn new(records: Vec<Record>) -> Self {
        View { records }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Query for View {
    fn records(&self) -> Vec<Record> {
        self.records.clone()
    }
}

impl FromIterator<Record> for View {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        View::new(iter.into_iter().collect())
    }
}

impl IntoIterator for View {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
