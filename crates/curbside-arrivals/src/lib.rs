//! # Arrival Processor (curbside-arrivals)
//!
//! Turns one raw plate reading into a recorded arrival: normalize,
//! resolve against the registry, advance the record, publish the event.
//! Transports call [`ArrivalProcessor::process`] and translate its
//! structured outcome; no wire concern leaks in here.

pub mod processor;

pub use processor::ArrivalProcessor;
