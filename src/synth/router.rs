use rand::{rngs::StdRng, SeedableRng};

use crate::{
    dsp::reverb::{impulse_response, ConvolutionReverb},
    engine::config::EngineConfig,
    graph::{
        bus::{VoiceBus, VoiceNode},
        param::{param, ParamHandle},
        reverb::ReverbSend,
        OutputGraph,
    },
};

/*
Signal Routing
==============

  voices ─→ Σ ─→ (× master) ─→ (× volume) ─┬─→ (× dry) ────────────┬─→ out
                                           └─→ (× wet) ─→ reverb ──┘

Master gain keeps the summed voices out of clipping: with N notes down it
sits at 1/N, and it moves there over a short ramp so chords don't pump.
Volume is the user's knob and changes instantly.
*/

/// Control side of the output chain.
pub struct SignalRouter {
    master: ParamHandle,
    volume: ParamHandle,
    volume_value: f32,
    master_ramp: f64,
}

impl SignalRouter {
    /// Build the router and the render graph it controls.
    pub fn build(
        config: &EngineConfig,
        sample_rate: f32,
        volume: f32,
        voices: Vec<VoiceNode>,
    ) -> (Self, OutputGraph) {
        let mut rng = match config.reverb_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ir = impulse_response(sample_rate, config.reverb_duration, &mut rng);
        let send = ReverbSend::new(ConvolutionReverb::new(&ir), config.dry_gain, config.wet_gain);

        let volume = volume.clamp(0.0, 1.0);
        let (master, master_lane) = param(1.0, config.queue_capacity);
        let (volume_handle, volume_lane) = param(volume, config.queue_capacity);

        let graph = OutputGraph::new(VoiceBus::new(voices), master_lane, volume_lane, send);
        let router = Self {
            master,
            volume: volume_handle,
            volume_value: volume,
            master_ramp: config.master_ramp.max(0.0),
        };
        (router, graph)
    }

    pub fn set_master_gain(&mut self, value: f32, now: f64) {
        self.master.jump_to(value, now);
    }

    pub fn set_user_volume(&mut self, value: f32) {
        self.volume_value = value;
        self.volume.set_immediate(value);
    }

    /// Ramp master gain towards `1 / playing` (or unity when nothing plays).
    pub fn recompute_master_gain(&mut self, playing: usize, now: f64) {
        let target = if playing > 0 { 1.0 / playing as f32 } else { 1.0 };
        self.master.ramp_from_current(target, now, self.master_ramp);
    }

    pub fn master_gain(&self, now: f64) -> f32 {
        self.master.value_at(now)
    }

    pub fn user_volume(&self) -> f32 {
        self.volume_value
    }
}
