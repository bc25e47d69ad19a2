//! saavy-voice - plays a short phrase through one voice on the default output
//!
//! Run with: cargo run -- [cutoff_hz] [waveform]
//! Verbose construction logs: RUST_LOG=debug cargo run

mod host;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_voice::Waveform;

use host::DemoOptions;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut options = DemoOptions::default();

    if let Some(cutoff) = args.next() {
        options.cutoff_hz = cutoff
            .parse()
            .wrap_err_with(|| format!("invalid cutoff `{cutoff}`"))?;
    }
    if let Some(waveform) = args.next() {
        options.waveform = waveform.parse::<Waveform>()?;
    }

    host::run(options)
}
