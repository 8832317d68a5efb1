//! Conversion between wire entries and stored subscribers.
//!
//! Both directions are total and perform no validation; the service layer
//! decides what is acceptable before anything reaches the store.

use crate::db::Subscriber;
use crate::model::EmailEntry;
use chrono::{DateTime, Utc};

/// Decode epoch seconds into a UTC timestamp. Values outside chrono's range
/// saturate to the nearest representable instant.
pub fn timestamp_from_epoch(secs: i64) -> DateTime<Utc> {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(ts) => ts,
        None if secs < 0 => DateTime::<Utc>::MIN_UTC,
        None => DateTime::<Utc>::MAX_UTC,
    }
}

pub fn epoch_from_timestamp(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp()
}

pub fn to_storage(entry: &EmailEntry) -> Subscriber {
    Subscriber {
        id: entry.id,
        address: entry.email.clone(),
        confirmed_at: timestamp_from_epoch(entry.confirmed_at),
        opt_out: entry.opt_out,
    }
}

pub fn to_wire(subscriber: &Subscriber) -> EmailEntry {
    EmailEntry {
        id: subscriber.id,
        email: subscriber.address.clone(),
        confirmed_at: epoch_from_timestamp(&subscriber.confirmed_at),
        opt_out: subscriber.opt_out,
    }
}
