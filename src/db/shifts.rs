/// Shift template queries.
use anyhow::Result;

use super::{Collection, Store, insert_record, remove_record, replace_record};
use crate::types::Shift;

pub fn create_shift(shift: Shift, store: &Store) -> Result<Shift> {
    insert_record(Collection::CustomShifts, shift, store)
}

/// All shifts in display order.
pub fn query_shifts(store: &Store) -> Vec<Shift> {
    store.get(Collection::CustomShifts)
}

pub fn query_shift_by_id(id: &str, store: &Store) -> Option<Shift> {
    query_shifts(store).into_iter().find(|s| s.id == id)
}

/// Replaces the template. Schedules created from it keep their snapshot.
pub fn update_shift(shift: Shift, store: &Store) -> Result<bool> {
    replace_record(Collection::CustomShifts, shift, store)
}

/// Removes the template only; schedules referencing it are left alone.
pub fn delete_shift(id: &str, store: &Store) -> Result<bool> {
    remove_record::<Shift>(Collection::CustomShifts, id, store)
}

/// Moves a shift to `index` in display order, clamped to the end.
pub fn move_shift(id: &str, index: usize, store: &Store) -> Result<bool> {
    let mut shifts = query_shifts(store);
    let Some(from) = shifts.iter().position(|s| s.id == id) else {
        return Ok(false);
    };
    let shift = shifts.remove(from);
    let to = index.min(shifts.len());
    shifts.insert(to, shift);
    store.set(Collection::CustomShifts, &shifts)?;
    Ok(true)
}
