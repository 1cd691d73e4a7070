//! The instrument's public face.
//!
//! `Engine` owns the device, the voice pool and the signal router and turns
//! the seven note/sound operations into scheduled parameter commands. None
//! of its operations fail: a missing device or pool turns them into no-ops,
//! and device trouble is logged.

pub mod clock;
pub mod config;

use tracing::{debug, error, info, warn};

use crate::{
    io::{
        converter::frequency,
        device::{DeviceProvider, DeviceState, OutputDevice},
    },
    synth::{
        pool::{Allocation, VoicePool},
        router::SignalRouter,
        voice::Voice,
        waveform::{Waveform, WaveformDef, WaveformLibrary},
    },
    NoteId,
};

pub use self::{clock::RenderClock, config::EngineConfig};

pub struct Engine<P: DeviceProvider> {
    config: EngineConfig,
    provider: P,
    device: Option<P::Device>,
    clock: Option<RenderClock>,
    pool: Option<VoicePool>,
    router: Option<SignalRouter>,
    sound: Waveform,
    volume: f32,
}

impl<P: DeviceProvider> Engine<P> {
    pub fn new(config: EngineConfig, provider: P) -> Self {
        let sound = config.initial_sound;
        let volume = sanitize_volume(config.initial_volume).unwrap_or(1.0);
        Self {
            config,
            provider,
            device: None,
            clock: None,
            pool: None,
            router: None,
            sound,
            volume,
        }
    }

    /// Build a fresh pool and router, discarding all note state.
    ///
    /// Pool size comes from `EngineConfig::polyphony`; `voice_count` is
    /// only logged.
    pub fn init_voices(&mut self, voice_count: usize) {
        if !self.ensure_device() {
            return;
        }
        let Some(device) = self.device.as_mut() else {
            return;
        };

        if let Some(pool) = self.pool.as_mut() {
            pool.silence_all();
        }
        self.pool = None;
        self.router = None;

        let def = WaveformLibrary::shared().get(self.sound);
        let (pool, nodes) = VoicePool::new(
            self.config.polyphony,
            &def.spectrum,
            self.config.queue_capacity,
            self.config.steal_fade,
        );
        let (router, graph) =
            SignalRouter::build(&self.config, device.sample_rate(), self.volume, nodes);
        device.install(graph);

        debug!(
            requested = voice_count,
            capacity = pool.capacity(),
            sound = %self.sound,
            "rebuilt voice pool"
        );
        self.pool = Some(pool);
        self.router = Some(router);
    }

    pub fn note_on(&mut self, note: NoteId) {
        if self.pool.is_none() {
            debug!(note, "note on before voices were initialised");
            return;
        }
        if !self.ensure_device() {
            return;
        }
        self.resume_if_suspended();

        let now = self.now();
        let def = self.current_def();
        let (Some(pool), Some(router)) = (self.pool.as_mut(), self.router.as_mut()) else {
            return;
        };

        let allocation = pool.allocate(note, def, now);
        if let Allocation::Stolen { index, evicted } = allocation {
            debug!(note, index, ?evicted, "stole voice");
        }
        router.recompute_master_gain(pool.sounding_count(), now);
    }

    pub fn note_off(&mut self, note: NoteId) {
        if self.device.is_none() {
            return;
        }
        let now = self.now();
        let def = self.current_def();
        let (Some(pool), Some(router)) = (self.pool.as_mut(), self.router.as_mut()) else {
            return;
        };

        if pool.release(note, &def.timing, now) {
            router.recompute_master_gain(pool.sounding_count(), now);
        }
    }

    /// Move a held note to a new pitch without retriggering its envelope.
    pub fn change_note(&mut self, old: NoteId, new: NoteId) {
        if self.device.is_none() {
            return;
        }
        let now = self.now();
        let def = self.current_def();
        let (Some(pool), Some(router)) = (self.pool.as_mut(), self.router.as_mut()) else {
            return;
        };

        let outcome = pool.glide(old, new, def, now);
        debug!(old, new, to = frequency(new), ?outcome, "change note");
        router.recompute_master_gain(pool.sounding_count(), now);
    }

    /// Silence everything at once.
    pub fn kill_all(&mut self) {
        let now = self.now();
        if let Some(pool) = self.pool.as_mut() {
            pool.silence_all();
        }
        if let Some(router) = self.router.as_mut() {
            router.set_master_gain(1.0, now);
        }
    }

    /// Select the timbre for new notes and switch sounding ones over too.
    pub fn set_sound_type(&mut self, kind: Waveform) {
        self.sound = kind;
        let def = self.current_def();
        if let Some(pool) = self.pool.as_mut() {
            pool.retimbre(&def.spectrum);
        }
        debug!(sound = %kind, "sound type changed");
    }

    /// Set the user volume, clamped to [0, 1]. NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        let Some(volume) = sanitize_volume(volume) else {
            debug!("ignoring NaN volume");
            return;
        };
        self.volume = volume;
        if let Some(router) = self.router.as_mut() {
            router.set_user_volume(volume);
        }
    }

    /// Render-clock time in seconds; zero before a device is open.
    pub fn now(&self) -> f64 {
        self.clock.as_ref().map_or(0.0, RenderClock::now)
    }

    pub fn voices(&self) -> &[Voice] {
        self.pool.as_ref().map(VoicePool::voices).unwrap_or(&[])
    }

    pub fn sounding_count(&self) -> usize {
        self.pool.as_ref().map_or(0, VoicePool::sounding_count)
    }

    pub fn master_gain(&self) -> f32 {
        let now = self.now();
        self.router.as_ref().map_or(1.0, |r| r.master_gain(now))
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn sound_type(&self) -> Waveform {
        self.sound
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> Option<&VoicePool> {
        self.pool.as_ref()
    }

    pub fn device(&self) -> Option<&P::Device> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut P::Device> {
        self.device.as_mut()
    }

    fn current_def(&self) -> &'static WaveformDef {
        WaveformLibrary::shared().get(self.sound)
    }

    fn ensure_device(&mut self) -> bool {
        if self.device.is_some() {
            return true;
        }
        match self.provider.open() {
            Ok(device) => {
                info!(sample_rate = device.sample_rate(), "output device ready");
                self.clock = Some(device.clock());
                self.device = Some(device);
                true
            }
            Err(err) => {
                error!(%err, "could not open output device");
                false
            }
        }
    }

    fn resume_if_suspended(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        if device.state() != DeviceState::Suspended {
            return;
        }
        match device.resume() {
            Ok(()) => info!("output device resumed"),
            Err(err) => warn!(%err, "resume failed, scheduling anyway"),
        }
    }
}

fn sanitize_volume(volume: f32) -> Option<f32> {
    (!volume.is_nan()).then(|| volume.clamp(0.0, 1.0))
}
