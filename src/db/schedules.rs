/// Schedule queries.
use anyhow::Result;

use super::{Collection, Store, insert_record, remove_record, replace_record};
use crate::report::filter_by_date_range;
use crate::types::{Schedule, ScheduleQuery};

pub fn create_schedule(schedule: Schedule, store: &Store) -> Result<Schedule> {
    insert_record(Collection::Schedules, schedule, store)
}

pub fn query_schedules(query: ScheduleQuery, store: &Store) -> Vec<Schedule> {
    let schedules: Vec<Schedule> = store.get(Collection::Schedules);
    match query {
        ScheduleQuery::All => schedules,
        ScheduleQuery::ByDate(date) => schedules.into_iter().filter(|s| s.date == date).collect(),
        ScheduleQuery::ByRange(from, to) => filter_by_date_range(schedules, &from, &to),
        ScheduleQuery::ByShift(shift_id) => schedules
            .into_iter()
            .filter(|s| s.selected_shift == shift_id)
            .collect(),
    }
}

pub fn update_schedule(schedule: Schedule, store: &Store) -> Result<bool> {
    replace_record(Collection::Schedules, schedule, store)
}

pub fn delete_schedule(id: &str, store: &Store) -> Result<bool> {
    remove_record::<Schedule>(Collection::Schedules, id, store)
}
