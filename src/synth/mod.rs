// Purpose: note lifecycle, parameter polling, event delivery
// This layer sits above the DSP primitives and drives one voice per note

pub mod config;
pub mod message;
pub mod params;
pub mod sound;
pub mod voice;
