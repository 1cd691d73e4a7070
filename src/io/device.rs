use tracing::debug;

use crate::{
    engine::clock::RenderClock,
    error::DeviceError,
    graph::{GraphNode, OutputGraph, RenderCtx},
};

/*
Output Devices
==============

The engine never renders audio itself. It schedules parameter commands
against a render clock and hands one `OutputGraph` per pool generation to
whatever consumes samples:

  Engine ──install(graph)──→ OutputDevice ──render──→ speakers / buffer
     ▲                            │
     └───── clock.now() ──────────┘  (advanced after every block)

`DeviceProvider` is the lazy half: the engine asks it for a device the
first time one is needed. Two implementations ship with the crate:

  OfflineDevice   renders on demand into caller buffers (tests, benches)
  CpalDevice      the default system output (see `cpal_device`)

A device starts suspended. While suspended it produces silence and the
clock stands still.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Suspended,
    Running,
    Closed,
}

/// A sink that pulls samples from an installed `OutputGraph`.
pub trait OutputDevice {
    fn sample_rate(&self) -> f32;

    /// The clock this device advances as it renders.
    fn clock(&self) -> RenderClock;

    fn state(&self) -> DeviceState;

    fn resume(&mut self) -> Result<(), DeviceError>;

    /// Replace the graph being rendered. The previous graph is dropped.
    fn install(&mut self, graph: OutputGraph);
}

/// Opens an output device on first demand.
pub trait DeviceProvider {
    type Device: OutputDevice;

    fn open(&mut self) -> Result<Self::Device, DeviceError>;
}

/// Provider of in-memory devices.
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    sample_rate: f32,
    start_suspended: bool,
    fail_resume: bool,
    unavailable: bool,
}

impl OfflineProvider {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            start_suspended: false,
            fail_resume: false,
            unavailable: false,
        }
    }

    /// Devices start suspended and need a `resume` before they render.
    pub fn suspended(mut self) -> Self {
        self.start_suspended = true;
        self
    }

    /// Devices start suspended and refuse to resume.
    pub fn failing_resume(mut self) -> Self {
        self.start_suspended = true;
        self.fail_resume = true;
        self
    }

    /// `open` always fails.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new(48_000.0)
    }
}

impl DeviceProvider for OfflineProvider {
    type Device = OfflineDevice;

    fn open(&mut self) -> Result<OfflineDevice, DeviceError> {
        if self.unavailable {
            return Err(DeviceError::Unavailable("offline provider disabled".into()));
        }
        let state = if self.start_suspended {
            DeviceState::Suspended
        } else {
            DeviceState::Running
        };
        Ok(OfflineDevice {
            clock: RenderClock::new(self.sample_rate),
            state,
            graph: None,
            fail_resume: self.fail_resume,
        })
    }
}

/// Renders into caller-supplied buffers.
pub struct OfflineDevice {
    clock: RenderClock,
    state: DeviceState,
    graph: Option<OutputGraph>,
    fail_resume: bool,
}

impl OfflineDevice {
    /// Fill `out` with the next `out.len()` samples.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state != DeviceState::Running {
            out.fill(0.0);
            return;
        }

        match self.graph.as_mut() {
            Some(graph) => {
                let ctx = RenderCtx::new(self.clock.sample_rate(), self.clock.now());
                graph.render_block(out, &ctx);
            }
            None => out.fill(0.0),
        }
        self.clock.advance(out.len());
    }

    /// Render `seconds` of audio into a fresh buffer.
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds * self.clock.sample_rate() as f64).round() as usize;
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    pub fn has_graph(&self) -> bool {
        self.graph.is_some()
    }

    pub fn close(&mut self) {
        self.graph = None;
        self.state = DeviceState::Closed;
    }
}

impl OutputDevice for OfflineDevice {
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
        match self.state {
            DeviceState::Running => Ok(()),
            DeviceState::Closed => Err(DeviceError::Resume("device is closed".into())),
            DeviceState::Suspended if self.fail_resume => {
                Err(DeviceError::Resume("resume refused".into()))
            }
            DeviceState::Suspended => {
                self.state = DeviceState::Running;
                Ok(())
            }
        }
    }

    fn install(&mut self, graph: OutputGraph) {
        debug!(replacing = self.graph.is_some(), "installing output graph");
        self.graph = Some(graph);
    }
}
