//! Stage-and-settle helpers for optimistic list mutations.
//!
//! Every mutating flow follows the same shape: stage a provisional record
//! under a locally generated correlation id, issue the call, then either
//! commit (replace the provisional record in place with the server's) or
//! roll back (remove it). Position in the containing sequence is preserved
//! across a commit; a rollback leaves every other record untouched.

use chrono::Utc;

/// A locally generated correlation id: the current timestamp in
/// milliseconds, matching server-issued ids in type but not in range.
pub fn temp_id() -> i64 {
    Utc::now().timestamp_millis()
}

/// Stages a provisional record at the front of the sequence.
pub fn stage_front<T>(items: &mut Vec<T>, record: T) {
    items.insert(0, record);
}

/// Stages a provisional record at the back of the sequence.
pub fn stage_back<T>(items: &mut Vec<T>, record: T) {
    items.push(record);
}

/// Replaces the record carrying `temp_id` with `record`, in place.
///
/// Returns `false` when no record carries the id (the staged entry was
/// removed out from under the settle).
pub fn commit<T>(items: &mut [T], temp_id: i64, record: T, id_of: impl Fn(&T) -> i64) -> bool {
    match items.iter_mut().find(|item| id_of(item) == temp_id) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Removes the record carrying `temp_id`.
pub fn roll_back<T>(items: &mut Vec<T>, temp_id: i64, id_of: impl Fn(&T) -> i64) {
    items.retain(|item| id_of(item) != temp_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_preserves_position() {
        let mut items = vec![(1, "a"), (99, "staged"), (3, "c")];
        let replaced = commit(&mut items, 99, (7, "final"), |it| it.0);

        assert!(replaced);
        assert_eq!(items, vec![(1, "a"), (7, "final"), (3, "c")]);
    }

    #[test]
    fn commit_without_staged_record_is_a_no_op() {
        let mut items = vec![(1, "a"), (3, "c")];
        let replaced = commit(&mut items, 99, (7, "final"), |it| it.0);

        assert!(!replaced);
        assert_eq!(items, vec![(1, "a"), (3, "c")]);
    }

    #[test]
    fn roll_back_removes_only_the_staged_record() {
        let mut items = vec![(1, "a"), (99, "staged"), (3, "c")];
        roll_back(&mut items, 99, |it| it.0);

        assert_eq!(items, vec![(1, "a"), (3, "c")]);
    }

    #[test]
    fn stage_front_prepends() {
        let mut items = vec![(1, "a")];
        stage_front(&mut items, (99, "staged"));
        assert_eq!(items[0].0, 99);

        stage_back(&mut items, (100, "tail"));
        assert_eq!(items.last().unwrap().0, 100);
    }

    #[test]
    fn temp_ids_are_plausible_timestamps() {
        let id = temp_id();
        // Well past any server-issued GoRest id.
        assert!(id > 1_600_000_000_000);
    }
}
