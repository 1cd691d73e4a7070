use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::{
    dsp::param::{ParamCommand, ParamTimeline},
    graph::node::{GraphNode, RenderCtx},
};

/*
Parameter Lanes
===============

A parameter is split into two halves that talk over a lock-free SPSC ring:

    control thread                         render thread
    ┌──────────────┐   ParamCommand   ┌─────────────┐
    │ ParamHandle  │ ───────────────→ │  ParamLane  │ ──→ per-sample values
    │  (mirror)    │    rtrb ring     │ (timeline)  │
    └──────────────┘                  └─────────────┘

The handle keeps its own copy of the timeline so the control side can ask
"what is the gain right now?" without reading anything the renderer owns.
Both copies receive the same commands in the same order, so they agree for
every time at or after the most recent prune.

The lane is a GraphNode: it renders its own values, which makes it a drop-in
modulator for `Amplify` (gain stages are just `signal.amplify(lane)`).
*/

/// Control-side writer for one parameter.
pub struct ParamHandle {
    timeline: ParamTimeline,
    tx: Producer<ParamCommand>,
}

/// Render-side reader for one parameter.
pub struct ParamLane {
    timeline: ParamTimeline,
    rx: Consumer<ParamCommand>,
}

/// Create a connected handle/lane pair starting at `initial`.
pub fn param(initial: f32, capacity: usize) -> (ParamHandle, ParamLane) {
    let (tx, rx) = RingBuffer::<ParamCommand>::new(capacity.max(1));
    let handle = ParamHandle {
        timeline: ParamTimeline::new(initial),
        tx,
    };
    let lane = ParamLane {
        timeline: ParamTimeline::new(initial),
        rx,
    };
    (handle, lane)
}

impl ParamHandle {
    fn send(&mut self, command: ParamCommand) {
        self.timeline.apply(command);
        if self.tx.push(command).is_err() {
            warn!(?command, "parameter queue full, command dropped by renderer");
        }
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) {
        self.send(ParamCommand::SetValueAtTime { value, time });
    }

    pub fn linear_ramp_to(&mut self, value: f32, time: f64) {
        self.send(ParamCommand::LinearRampToValueAtTime { value, time });
    }

    pub fn cancel_from(&mut self, time: f64) {
        self.send(ParamCommand::CancelScheduledValues { from: time });
    }

    pub fn set_immediate(&mut self, value: f32) {
        self.send(ParamCommand::SetImmediate { value });
    }

    /// Drop pending commands and hold the current value from `now`.
    ///
    /// Returns the value being held.
    pub fn hold(&mut self, now: f64) -> f32 {
        let current = self.timeline.value_at(now);
        self.cancel_from(now);
        self.timeline.prune(now);
        self.set_value_at(current, now);
        current
    }

    /// Drop pending commands and jump to `value` at `now`.
    pub fn jump_to(&mut self, value: f32, now: f64) {
        self.cancel_from(now);
        self.timeline.prune(now);
        self.set_value_at(value, now);
    }

    /// Ramp linearly from the current value to `target` over `duration`.
    pub fn ramp_from_current(&mut self, target: f32, now: f64, duration: f64) {
        self.hold(now);
        self.linear_ramp_to(target, now + duration.max(0.0));
    }

    pub fn value_at(&self, time: f64) -> f32 {
        self.timeline.value_at(time)
    }

    pub fn timeline(&self) -> &ParamTimeline {
        &self.timeline
    }
}

impl ParamLane {
    fn drain(&mut self) {
        while let Ok(command) = self.rx.pop() {
            self.timeline.apply(command);
        }
    }

    pub fn value_at(&self, time: f64) -> f32 {
        self.timeline.value_at(time)
    }
}

impl GraphNode for ParamLane {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.drain();

        if self.timeline.is_settled(ctx.time) {
            out.fill(self.timeline.value_at(ctx.time));
        } else {
            for (i, sample) in out.iter_mut().enumerate() {
                *sample = self.timeline.value_at(ctx.time_of(i));
            }
        }

        self.timeline.prune(ctx.time_of(out.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lane_follows_handle_commands() {
        let (mut handle, mut lane) = param(0.0, 16);
        handle.set_value_at(0.0, 0.0);
        handle.linear_ramp_to(1.0, 0.1);

        let ctx = RenderCtx::new(1_000.0, 0.0);
        let mut out = vec![0.0; 100];
        lane.render_block(&mut out, &ctx);

        assert_abs_diff_eq!(out[0], 0.0);
        assert_abs_diff_eq!(out[50], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(out[99], 0.99, epsilon = 1e-5);
        assert_abs_diff_eq!(lane.value_at(0.1), handle.value_at(0.1));
    }

    #[test]
    fn ramp_from_current_starts_where_the_curve_is() {
        let (mut handle, _lane) = param(0.0, 16);
        handle.set_value_at(0.0, 0.0);
        handle.linear_ramp_to(1.0, 1.0);

        handle.ramp_from_current(0.0, 0.5, 0.5);
        assert_abs_diff_eq!(handle.value_at(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(handle.value_at(0.75), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(handle.value_at(1.0), 0.0);
    }

    #[test]
    fn full_queue_keeps_control_mirror_authoritative() {
        let (mut handle, _lane) = param(0.0, 1);
        handle.set_immediate(0.2);
        handle.set_immediate(0.7);
        assert_abs_diff_eq!(handle.value_at(0.0), 0.7);
    }

    #[test]
    fn settled_lane_renders_constant_block() {
        let (mut handle, mut lane) = param(0.0, 4);
        handle.set_immediate(0.4);

        let mut out = vec![0.0; 32];
        lane.render_block(&mut out, &RenderCtx::new(48_000.0, 1.0));
        assert!(out.iter().all(|&v| (v - 0.4).abs() < 1e-6));
    }
}
