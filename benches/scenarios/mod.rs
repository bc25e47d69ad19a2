//! Real-world scenario benchmarks.
//!
//! These benchmarks model what a host callback does: render a held note from
//! one voice into a stereo block.

mod voice;

pub use voice::bench_voice;
