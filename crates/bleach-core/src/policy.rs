//! Staleness policy.
//!
//! A selection goes stale at the first UTC midnight strictly after it was
//! written. A group of selections is refreshed together, and only once every
//! member has crossed its own boundary: the group boundary is the *latest* of
//! the members' next midnights.

use chrono::{DateTime, Days, NaiveTime, Utc};

/// The first UTC midnight strictly after `ts`.
pub fn next_midnight(ts: DateTime<Utc>) -> DateTime<Utc> {
  let day = ts.date_naive();
  let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
  next.and_time(NaiveTime::MIN).and_utc()
}

/// The instant at which the group becomes stale, or `None` if any member was
/// never written (or the group is empty), in which case it is already stale.
pub fn next_refresh_at<I>(timestamps: I) -> Option<DateTime<Utc>>
where
  I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
  let mut latest: Option<DateTime<Utc>> = None;
  for ts in timestamps {
    let boundary = next_midnight(ts?);
    latest = Some(latest.map_or(boundary, |l| l.max(boundary)));
  }
  latest
}

/// `true` iff the group must be refreshed at `now`.
pub fn is_stale<I>(timestamps: I, now: DateTime<Utc>) -> bool
where
  I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
  match next_refresh_at(timestamps) {
    Some(boundary) => now >= boundary,
    None => true,
  }
}
