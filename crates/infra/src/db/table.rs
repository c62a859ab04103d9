//! Row storage for a single table.

use std::collections::BTreeMap;

use storefront_core::RecordId;

use super::{DbError, DbResult};

/// Key of a table row: a typed id convertible to and from [`RecordId`].
pub trait RowKey: Copy + Ord + core::fmt::Debug + From<RecordId> + Into<RecordId> {}

impl<T> RowKey for T where T: Copy + Ord + core::fmt::Debug + From<RecordId> + Into<RecordId> {}

/// Ordered rows plus the id sequence of one table.
///
/// Ids are handed out in increasing order starting at 1 and are never reused,
/// even after the row holding the highest id is removed. The sequence
/// remembers the highest id it ever issued or restored.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    rows: BTreeMap<K, V>,
    last_id: Option<RecordId>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: None,
        }
    }
}

impl<K, V> Table<K, V>
where
    K: RowKey,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next id and store the row built from it. Fails once the
    /// sequence has run past the largest representable id.
    pub fn insert_with(&mut self, build: impl FnOnce(K) -> V) -> DbResult<V> {
        let raw = match self.last_id {
            None => RecordId::FIRST,
            Some(last) => last
                .next()
                .ok_or_else(|| DbError::Storage(format!("id sequence exhausted after {last}")))?,
        };
        let id = K::from(raw);
        if self.rows.contains_key(&id) {
            return Err(DbError::Storage(format!("id {raw} is already taken")));
        }
        self.last_id = Some(raw);
        let row = build(id);
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    /// Store a row under a known id (snapshot restore). Returns `false` if the
    /// id is already taken. The sequence never falls behind a restored id.
    pub fn restore(&mut self, id: K, row: V) -> bool {
        if self.rows.contains_key(&id) {
            return false;
        }
        self.resume_after(id.into());
        self.rows.insert(id, row);
        true
    }

    /// Highest id issued or restored so far.
    pub fn last_id(&self) -> Option<RecordId> {
        self.last_id
    }

    /// Continue the sequence after `last` unless it is already further along.
    pub fn resume_after(&mut self, last: RecordId) {
        if self.last_id.is_none_or(|current| current < last) {
            self.last_id = Some(last);
        }
    }

    pub fn get(&self, id: &K) -> Option<&V> {
        self.rows.get(id)
    }

    pub fn get_mut(&mut self, id: &K) -> Option<&mut V> {
        self.rows.get_mut(id)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.rows.contains_key(id)
    }

    pub fn remove(&mut self, id: &K) -> Option<V> {
        self.rows.remove(id)
    }

    /// Rows in id order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.rows.values_mut()
    }

    pub fn count_where(&self, pred: impl Fn(&V) -> bool) -> usize {
        self.rows.values().filter(|row| pred(row)).count()
    }

    /// Rows matching `pred`, cloned, in id order.
    pub fn filter(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.rows.values().filter(|row| pred(row)).cloned().collect()
    }

    /// Remove every row matching `pred`; returns how many were removed.
    pub fn remove_where(&mut self, pred: impl Fn(&V) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| !pred(row));
        before - self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    storefront_core::record_id!(RowId, "RowId");

    #[test]
    fn ids_start_at_one_and_are_never_reused() {
        let mut table: Table<RowId, String> = Table::new();
        let a = table.insert_with(|id| format!("a{id}")).unwrap();
        let b = table.insert_with(|id| format!("b{id}")).unwrap();
        assert_eq!(a, "a1");
        assert_eq!(b, "b2");

        table.remove(&RowId::from_raw(2).unwrap());
        let c = table.insert_with(|id| format!("c{id}")).unwrap();
        assert_eq!(c, "c3");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn restore_advances_the_sequence() {
        let mut table: Table<RowId, &str> = Table::new();
        assert!(table.restore(RowId::from_raw(10).unwrap(), "ten"));
        assert!(!table.restore(RowId::from_raw(10).unwrap(), "again"));
        assert_eq!(table.last_id().map(RecordId::get), Some(10));

        table.restore(RowId::from_raw(4).unwrap(), "four");
        assert_eq!(table.last_id().map(RecordId::get), Some(10));
        let values: Vec<_> = table.values().copied().collect();
        assert_eq!(values, vec!["four", "ten"]);
    }

    #[test]
    fn resume_after_never_moves_backwards() {
        let mut table: Table<RowId, u64> = Table::new();
        table.restore(RowId::from_raw(3).unwrap(), 3);
        table.resume_after(RecordId::new(8).unwrap());
        table.resume_after(RecordId::new(5).unwrap());
        assert_eq!(table.last_id().map(RecordId::get), Some(8));
        assert_eq!(table.insert_with(|id| id.get()).unwrap(), 9);
    }

    #[test]
    fn exhausted_sequence_keeps_the_last_row() {
        let mut table: Table<RowId, &str> = Table::new();
        assert!(table.restore(RowId::from_raw(u64::MAX).unwrap(), "last"));

        let err = table.insert_with(|_| "newcomer").unwrap_err();
        assert!(matches!(err, DbError::Storage(_)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.values().copied().collect::<Vec<_>>(), vec!["last"]);
    }

    #[test]
    fn remove_where_reports_count() {
        let mut table: Table<RowId, u32> = Table::new();
        for n in 0..5 {
            table.insert_with(|_| n).unwrap();
        }
        assert_eq!(table.remove_where(|n| n % 2 == 0), 3);
        assert_eq!(table.count_where(|_| true), 2);
        assert_eq!(table.filter(|n| *n > 2), vec![3]);
    }
}
