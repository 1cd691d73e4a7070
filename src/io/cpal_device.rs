use std::sync::{Arc, Mutex};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat,
};
use tracing::{debug, error, info};

use crate::{
    engine::clock::RenderClock,
    error::DeviceError,
    graph::{GraphNode, OutputGraph, RenderCtx},
    io::device::{DeviceProvider, DeviceState, OutputDevice},
    MAX_BLOCK_SIZE,
};

type GraphSlot = Arc<Mutex<Option<OutputGraph>>>;

/// Opens the host's default output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalProvider;

impl DeviceProvider for CpalProvider {
    type Device = CpalDevice;

    fn open(&mut self) -> Result<CpalDevice, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| DeviceError::Unavailable("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|err| DeviceError::Config(err.to_string()))?;

        if config.sample_format() != SampleFormat::F32 {
            return Err(DeviceError::Config(format!(
                "sample format {:?} is not supported, need f32",
                config.sample_format()
            )));
        }

        let sample_rate = config.sample_rate().0 as f32;
        let channels = (config.channels() as usize).max(1);
        let clock = RenderClock::new(sample_rate);
        let slot: GraphSlot = Arc::new(Mutex::new(None));

        let callback_clock = clock.clone();
        let callback_slot = slot.clone();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let mut guard = match callback_slot.lock() {
                        Ok(guard) => guard,
                        Err(_) => {
                            data.fill(0.0);
                            return;
                        }
                    };
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames];

                        match guard.as_mut() {
                            Some(graph) => {
                                let ctx = RenderCtx::new(sample_rate, callback_clock.now());
                                graph.render_block(block, &ctx);
                            }
                            None => block.fill(0.0),
                        }

                        // Mono to every channel
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }

                        callback_clock.advance(frames);
                        frames_written += frames;
                    }
                },
                |err| error!(%err, "output stream error"),
                None,
            )
            .map_err(|err| DeviceError::Stream(err.to_string()))?;

        // Some hosts start streams on build.
        if let Err(err) = stream.pause() {
            debug!(%err, "could not pause freshly built stream");
        }

        info!(sample_rate, channels, "opened output device");
        Ok(CpalDevice {
            stream,
            clock,
            slot,
            state: DeviceState::Suspended,
        })
    }
}

/// The system output, rendering mono and copying it to every channel.
pub struct CpalDevice {
    stream: cpal::Stream,
    clock: RenderClock,
    slot: GraphSlot,
    state: DeviceState,
}

impl OutputDevice for CpalDevice {
    fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    fn clock(&self) -> RenderClock {
        self.clock.clone()
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn resume(&mut self) -> Result<(), DeviceError> {
        if self.state == DeviceState::Running {
            return Ok(());
        }
        self.stream
            .play()
            .map_err(|err| DeviceError::Resume(err.to_string()))?;
        self.state = DeviceState::Running;
        Ok(())
    }

    fn install(&mut self, graph: OutputGraph) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(graph),
            Err(_) => error!("output graph slot poisoned, graph not installed"),
        }
    }
}
