//! Synthetic audio sources.
//!
//! Device enumeration lives outside this crate; anything that can produce
//! interleaved PCM bytes can feed a [`PeriodCapture`](crate::PeriodCapture).
//! [`MockSource`] covers tests and demos.

mod mock;

pub use mock::MockSource;
