// Purpose: control side of the instrument
// Voices and the router turn note events into parameter commands; nothing
// here renders audio.

pub mod pool;
pub mod router;
pub mod voice;
pub mod waveform;
