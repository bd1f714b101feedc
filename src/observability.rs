use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("termchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("termchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("termchat.client.request_duration_seconds");

pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("termchat.stream.fragments");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("termchat.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("termchat.stream.bytes");

pub(crate) static CHAT_TURNS: Counter = Counter::new("termchat.chat.turns");
pub(crate) static CHAT_INTERRUPTS: Counter = Counter::new("termchat.chat.interrupts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_INTERRUPTS);
}
