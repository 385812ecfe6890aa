//! Text generation providers for the chainrun engine.
//!
//! Each provider implements
//! [`TextGenerator`](chainrun_engine::TextGenerator): [`GeminiGenerator`]
//! calls the Gemini API over HTTP, [`MockGenerator`] serves scripted
//! in-memory responses for tests and benchmarks.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiGenerator;
pub use mock::MockGenerator;
