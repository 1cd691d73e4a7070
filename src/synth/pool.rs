use tracing::debug;

use crate::{
    dsp::{envelope::EnvelopeTiming, spectrum::HarmonicSpectrum},
    graph::bus::VoiceNode,
    io::converter::frequency,
    synth::{
        voice::{Voice, VoiceState},
        waveform::WaveformDef,
    },
    NoteId,
};

/// What `VoicePool::allocate` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// The note was already sounding; nothing changed.
    AlreadySounding(usize),
    /// A free or releasing voice took the note.
    Fresh(usize),
    /// The oldest sounding voice was taken over.
    Stolen { index: usize, evicted: Option<NoteId> },
}

/// What `VoicePool::glide` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glide {
    Unchanged,
    Moved(usize),
    /// The target was already held elsewhere, so the old voice was released.
    Merged(usize),
    /// No voice held the old note; the new one was allocated instead.
    Allocated(Allocation),
}

/// Fixed set of voices with oldest-first stealing.
pub struct VoicePool {
    voices: Vec<Voice>,
}

impl VoicePool {
    /// Build `capacity` voices (at least one) and their render nodes.
    pub fn new(
        capacity: usize,
        spectrum: &HarmonicSpectrum,
        queue_capacity: usize,
        steal_fade: f64,
    ) -> (Self, Vec<VoiceNode>) {
        let (voices, nodes): (Vec<Voice>, Vec<VoiceNode>) = (0..capacity.max(1))
            .map(|_| Voice::new(spectrum.clone(), queue_capacity, steal_fade))
            .unzip();
        (Self { voices }, nodes)
    }

    pub fn allocate(&mut self, note: NoteId, def: &WaveformDef, now: f64) -> Allocation {
        if let Some(index) = self.sounding_index(note) {
            return Allocation::AlreadySounding(index);
        }

        // A releasing tail of the same note gives up its identity.
        for voice in &mut self.voices {
            if !voice.is_sounding() && voice.note() == Some(note) {
                voice.retag(None);
            }
        }

        let freq = frequency(note);
        let allocation = match self.free_index(now) {
            Some(index) => {
                self.voices[index].attach(note, freq, &def.spectrum, &def.timing, now);
                Allocation::Fresh(index)
            }
            None => {
                let index = self.oldest_sounding();
                let evicted = self.voices[index].note();
                self.voices[index].attach(note, freq, &def.spectrum, &def.timing, now);
                Allocation::Stolen { index, evicted }
            }
        };

        debug!(note, ?allocation, "allocated voice");
        allocation
    }

    /// Release the sounding voice holding `note`, if any.
    pub fn release(&mut self, note: NoteId, timing: &EnvelopeTiming, now: f64) -> bool {
        match self.sounding_index(note) {
            Some(index) => self.voices[index].release(timing, now),
            None => false,
        }
    }

    /// Move the sounding `old` note to `new` without retriggering.
    pub fn glide(&mut self, old: NoteId, new: NoteId, def: &WaveformDef, now: f64) -> Glide {
        let Some(index) = self.sounding_index(old) else {
            return Glide::Allocated(self.allocate(new, def, now));
        };
        if old == new {
            return Glide::Unchanged;
        }

        let outcome = if self.sounding_index(new).is_some() {
            self.voices[index].release(&def.timing, now);
            Glide::Merged(index)
        } else {
            for voice in &mut self.voices {
                if !voice.is_sounding() && voice.note() == Some(new) {
                    voice.retag(None);
                }
            }
            let voice = &mut self.voices[index];
            voice.retag(Some(new));
            voice.glide(frequency(new), now);
            Glide::Moved(index)
        };

        debug!(old, new, ?outcome, "glide");
        outcome
    }

    pub fn silence_all(&mut self) {
        for voice in &mut self.voices {
            voice.silence();
        }
    }

    /// Swap every voice's wavetable, including sounding ones.
    pub fn retimbre(&mut self, spectrum: &HarmonicSpectrum) {
        for voice in &mut self.voices {
            voice.rehue(spectrum);
        }
    }

    pub fn sounding_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_sounding()).count()
    }

    /// The voice currently sounding `note`.
    pub fn voice_for(&self, note: NoteId) -> Option<&Voice> {
        self.sounding_index(note).map(|i| &self.voices[i])
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    fn sounding_index(&self, note: NoteId) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| v.is_sounding() && v.note() == Some(note))
    }

    // Prefer a voice whose tail has finished, then any releasing one.
    fn free_index(&self, now: f64) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| v.state(now) == VoiceState::Idle)
            .or_else(|| self.voices.iter().position(|v| !v.is_sounding()))
    }

    // Earliest start wins; `min_by` keeps the first of equal elements.
    fn oldest_sounding(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_sounding())
            .min_by(|(_, a), (_, b)| a.start_time().total_cmp(&b.start_time()))
            .map_or(0, |(i, _)| i)
    }
}
