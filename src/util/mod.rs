//! Collaborator seams: card-number handling, id generation, field
//! encryption, and calendar-day arithmetic for the daily limit.

pub mod card_numbers;
pub mod encryption;
pub mod ids;

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Bounds of the local calendar day containing `now`, as UTC instants:
/// `[today 00:00, tomorrow 00:00)`.
pub fn local_day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN);
    let next = start + Duration::days(1);
    (local_to_utc(start), local_to_utc(next))
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    // On a DST gap the earliest valid interpretation is used.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
