use crate::{
    dsp::{envelope::EnvelopeTiming, spectrum::HarmonicSpectrum},
    graph::{
        bus::VoiceNode,
        extensions::NodeExt,
        oscillator::{OscHandle, OscNode},
        param::{param, ParamHandle},
    },
    NoteId,
};

/*
Voice Lifecycle
===============

A voice is the control-side half of one oscillator/envelope pair. It never
renders; it turns note events into commands on two timelines (gain and
frequency) whose render-side lanes live in the output graph.

            attach                 release
  Idle ─────────────→ Sounding ─────────────→ Releasing
   ▲                   │    ▲                    │
   │     silence       │    └──── attach ────────┤
   └───────────────────┴─────────────────────────┘
                        (tail reaches 0: Idle)

Attaching to a voice that is still Sounding is a steal. The old note fades
to zero over a short fixed window before the new one starts, and the pitch
change is scheduled for the end of that fade:

  gain
   S ━━━━━━━╲              ╱━━━━━━━━
             ╲           ╱
   0          ●━━━━━━━━●
             now   now+fade   +attack
  freq ──── old ──────┴──── new ───────
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Sounding,
    Releasing,
}

pub struct Voice {
    note: Option<NoteId>,
    sounding: bool,
    start_time: f64,
    steal_fade: f64,
    gain: ParamHandle,
    osc: OscHandle,
}

impl Voice {
    /// Create a voice and the render node it drives.
    pub fn new(spectrum: HarmonicSpectrum, queue_capacity: usize, steal_fade: f64) -> (Self, VoiceNode) {
        let (osc_node, osc) = OscNode::new(spectrum, 440.0, queue_capacity);
        let (gain, gain_lane) = param(0.0, queue_capacity);

        let voice = Self {
            note: None,
            sounding: false,
            start_time: 0.0,
            steal_fade: steal_fade.max(0.0),
            gain,
            osc,
        };
        (voice, osc_node.amplify(gain_lane))
    }

    /// Start `note` on this voice. Returns true when it was a steal.
    pub fn attach(
        &mut self,
        note: NoteId,
        frequency: f32,
        spectrum: &HarmonicSpectrum,
        timing: &EnvelopeTiming,
        now: f64,
    ) -> bool {
        let stealing = self.sounding;
        self.rehue(spectrum);

        if stealing {
            let fade_end = now + self.steal_fade;
            self.gain.ramp_from_current(0.0, now, self.steal_fade);
            self.gain.set_value_at(0.0, fade_end);
            self.gain
                .linear_ramp_to(timing.sustain, fade_end + timing.attack_time());

            self.osc.frequency.hold(now);
            self.osc.frequency.set_value_at(frequency, fade_end);
        } else {
            self.osc.frequency.jump_to(frequency, now);
            self.gain
                .ramp_from_current(timing.sustain, now, timing.attack_time());
        }

        self.note = Some(note);
        self.sounding = true;
        self.start_time = now;
        stealing
    }

    /// Begin the release tail. Only a sounding voice can be released.
    pub fn release(&mut self, timing: &EnvelopeTiming, now: f64) -> bool {
        if !self.sounding {
            return false;
        }
        self.gain.ramp_from_current(0.0, now, timing.release_time());
        self.sounding = false;
        true
    }

    /// Move a sounding voice to a new pitch without retriggering.
    pub fn glide(&mut self, frequency: f32, now: f64) -> bool {
        if !self.sounding {
            return false;
        }
        self.osc.frequency.jump_to(frequency, now);
        true
    }

    /// Cut the voice to silence at once and forget its note.
    pub fn silence(&mut self) {
        self.gain.set_immediate(0.0);
        self.osc.frequency.cancel_from(0.0);
        self.sounding = false;
        self.note = None;
    }

    /// Swap the wavetable; pitch, envelope and phase are untouched.
    pub fn rehue(&mut self, spectrum: &HarmonicSpectrum) {
        if !self.osc.spectrum().same_table(spectrum) {
            self.osc.set_spectrum(spectrum.clone());
        }
    }

    pub(crate) fn retag(&mut self, note: Option<NoteId>) {
        self.note = note;
    }

    pub fn state(&self, now: f64) -> VoiceState {
        if self.sounding {
            VoiceState::Sounding
        } else if !self.gain.timeline().is_settled(now) || self.level(now) > 0.0 {
            VoiceState::Releasing
        } else {
            VoiceState::Idle
        }
    }

    /// Envelope output at `now`.
    pub fn level(&self, now: f64) -> f32 {
        self.gain.value_at(now)
    }

    pub fn frequency(&self, now: f64) -> f32 {
        self.osc.frequency.value_at(now)
    }

    /// Assigned note. Stays set through the release tail.
    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn spectrum(&self) -> &HarmonicSpectrum {
        self.osc.spectrum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphNode, RenderCtx};
    use approx::assert_abs_diff_eq;

    const FADE: f64 = 0.010;

    fn sine() -> HarmonicSpectrum {
        HarmonicSpectrum::new(vec![0.0, 1.0])
    }

    fn timing() -> EnvelopeTiming {
        EnvelopeTiming::new(0.1, 0.2, 0.8)
    }

    #[test]
    fn attack_ramps_to_sustain() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        assert!(!voice.attach(60, 261.6, &sine(), &timing(), 1.0));

        assert_eq!(voice.state(1.0), VoiceState::Sounding);
        assert_abs_diff_eq!(voice.level(1.0), 0.0);
        assert_abs_diff_eq!(voice.level(1.05), 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(voice.level(1.5), 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(voice.frequency(1.0), 261.6);
        assert_eq!(voice.note(), Some(60));
        assert_eq!(voice.start_time(), 1.0);
    }

    #[test]
    fn release_ramps_from_current_level() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        voice.attach(60, 261.6, &sine(), &timing(), 0.0);

        // Mid-attack release: starts at 0.4, not at sustain
        assert!(voice.release(&timing(), 0.05));
        assert!(!voice.is_sounding());
        assert_abs_diff_eq!(voice.level(0.05), 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(voice.level(0.15), 0.2, epsilon = 1e-5);
        assert_eq!(voice.state(0.1), VoiceState::Releasing);
        assert_eq!(voice.state(0.3), VoiceState::Idle);
        assert_eq!(voice.note(), Some(60));
    }

    #[test]
    fn release_requires_sounding() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        assert!(!voice.release(&timing(), 0.0));
        assert_eq!(voice.state(0.0), VoiceState::Idle);
    }

    #[test]
    fn steal_fades_before_retrigger() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        voice.attach(60, 200.0, &sine(), &timing(), 0.0);

        assert!(voice.attach(72, 400.0, &sine(), &timing(), 1.0));
        assert_eq!(voice.note(), Some(72));
        assert_eq!(voice.start_time(), 1.0);

        assert_abs_diff_eq!(voice.level(1.0), 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(voice.level(1.005), 0.4, epsilon = 1e-4);
        assert_abs_diff_eq!(voice.level(1.0 + FADE), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(voice.level(1.0 + FADE + 0.05), 0.4, epsilon = 1e-4);

        // Pitch changes only once the fade has finished
        assert_abs_diff_eq!(voice.frequency(1.005), 200.0);
        assert_abs_diff_eq!(voice.frequency(1.0 + FADE), 400.0);
    }

    #[test]
    fn second_steal_mid_fade_starts_from_current_level() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        voice.attach(60, 200.0, &sine(), &timing(), 0.0);
        voice.attach(72, 400.0, &sine(), &timing(), 1.0);

        // Halfway down the first fade
        assert!(voice.attach(76, 600.0, &sine(), &timing(), 1.005));
        assert_eq!(voice.note(), Some(76));
        assert_eq!(voice.start_time(), 1.005);

        assert_abs_diff_eq!(voice.level(1.005), 0.4, epsilon = 1e-4);
        assert_abs_diff_eq!(voice.level(1.010), 0.2, epsilon = 1e-4);
        assert_abs_diff_eq!(voice.level(1.005 + FADE), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(voice.level(1.005 + FADE + 0.05), 0.4, epsilon = 1e-4);

        // 72's pitch never lands
        assert_abs_diff_eq!(voice.frequency(1.012), 200.0);
        assert_abs_diff_eq!(voice.frequency(1.005 + FADE), 600.0);
    }

    #[test]
    fn glide_keeps_envelope_and_start() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        voice.attach(60, 200.0, &sine(), &timing(), 0.0);

        assert!(voice.glide(300.0, 0.5));
        assert_abs_diff_eq!(voice.frequency(0.5), 300.0);
        assert_abs_diff_eq!(voice.level(0.5), 0.8, epsilon = 1e-6);
        assert_eq!(voice.start_time(), 0.0);

        voice.release(&timing(), 0.6);
        assert!(!voice.glide(100.0, 0.7));
    }

    #[test]
    fn silence_is_immediate() {
        let (mut voice, _node) = Voice::new(sine(), 64, FADE);
        voice.attach(60, 200.0, &sine(), &timing(), 0.0);
        voice.silence();

        assert_abs_diff_eq!(voice.level(0.5), 0.0);
        assert_eq!(voice.note(), None);
        assert_eq!(voice.state(0.5), VoiceState::Idle);
    }

    #[test]
    fn rendered_steal_has_no_jump() {
        let (mut voice, mut node) = Voice::new(sine(), 64, FADE);
        let sr = 48_000.0;
        let mut block = vec![0.0; 480];

        voice.attach(60, 220.0, &sine(), &EnvelopeTiming::new(0.001, 0.01, 1.0), 0.0);
        let mut time = 0.0;
        for _ in 0..10 {
            node.render_block(&mut block, &RenderCtx::new(sr, time));
            time += 0.01;
        }

        voice.attach(72, 880.0, &sine(), &EnvelopeTiming::new(0.001, 0.01, 1.0), time);
        let mut last = *block.last().unwrap();
        for _ in 0..4 {
            node.render_block(&mut block, &RenderCtx::new(sr, time));
            for &s in &block {
                // 880 Hz at full scale moves at most ~0.12 per sample
                assert!((s - last).abs() < 0.15, "discontinuity {last} -> {s}");
                last = s;
            }
            time += 0.01;
        }
    }

    #[test]
    fn rehue_swaps_only_when_table_differs() {
        let first = sine();
        let (mut voice, _node) = Voice::new(first.clone(), 64, FADE);
        voice.rehue(&first);
        assert!(voice.spectrum().same_table(&first));

        let organ = HarmonicSpectrum::new(vec![0.0, 1.0, 1.0, 1.0]);
        voice.rehue(&organ);
        assert!(voice.spectrum().same_table(&organ));
    }
}
