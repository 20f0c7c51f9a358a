//! Envelope and stream fixtures.

use chrono::{TimeZone, Utc};
use eventlog_core::model::{
    Event, EventData, EventEnvelope, EventId, EventType, SequenceNumber, StreamName, Version,
};
use eventlog_core::stream::{EventStream, InMemoryEventStream};

/// Builds an event.
///
/// # Panics
///
/// Panics if `event_type` is not a valid event type.
#[must_use]
pub fn event(event_type: &str, data: &str) -> Event {
    Event::new(
        EventId::create(),
        EventType::from_string(event_type).unwrap(),
        EventData::from_string(data),
    )
}

/// Builds an envelope of stream `"stream"` at `sequence_number`, carrying
/// `data`. The version is `sequence_number - 1`.
///
/// # Panics
///
/// Panics if `sequence_number` is 0.
#[must_use]
pub fn envelope(sequence_number: u64, data: &str) -> EventEnvelope {
    EventEnvelope {
        event: event("SomeEventType", data),
        stream_name: StreamName::from_string("stream").unwrap(),
        version: Version::from_u64(sequence_number - 1),
        sequence_number: SequenceNumber::from_u64(sequence_number),
        recorded_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// Builds `count` envelopes with sequence numbers `1..=count` whose data are
/// the letters `"a"`, `"b"`, `"c"`...
///
/// # Panics
///
/// Panics if `count` exceeds 26.
#[must_use]
pub fn envelopes(count: u8) -> Vec<EventEnvelope> {
    assert!(count <= 26, "only 26 letters available");
    (0..count)
        .map(|offset| {
            let letter = char::from(b'a' + offset);
            envelope(u64::from(offset) + 1, &letter.to_string())
        })
        .collect()
}

/// An in-memory stream over [`envelopes(count)`](envelopes).
#[must_use]
pub fn mock_event_stream(count: u8) -> InMemoryEventStream {
    InMemoryEventStream::new(envelopes(count))
}

/// Concatenates the data of every envelope the stream yields.
///
/// # Panics
///
/// Panics if the stream yields an error.
pub fn data_of<S: EventStream>(stream: &S) -> String {
    stream
        .iter()
        .map(|item| item.unwrap().event.data.as_str().to_owned())
        .collect()
}

/// Collects the sequence numbers of every envelope the stream yields.
///
/// # Panics
///
/// Panics if the stream yields an error.
pub fn sequence_numbers_of<S: EventStream>(stream: &S) -> Vec<u64> {
    stream
        .iter()
        .map(|item| item.unwrap().sequence_number.value())
        .collect()
}
