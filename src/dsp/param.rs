/*
Parameter Timelines
===================

Every continuously varying quantity in the engine (a voice's gain, a
voice's frequency, the master gain, the user volume) is a timeline of
scheduled commands rather than a plain number. The control side appends
commands stamped with render-clock time; the render side evaluates the
resulting curve once per sample.

Vocabulary
----------

  base        The value the timeline yields before its first event.

  event       A scheduled point: either "jump to v at t" (SetValue) or
              "arrive at v at t, linearly" (LinearRamp).

  cancel      Drop every event at or after a time. The curve before that
              time is untouched.

  prune       Fold everything at or before a time into the base value so
              the event list stays short. Evaluation at or after the prune
              time is unchanged.


The Curve
---------

  value
    S   │          ●━━━━━━━━━━━━━━━━━━━●
        │        ╱                        ╲
        │      ╱                            ╲
    0   ●━━━━●                                ●━━━━━━━
        └────┴─────┴───────────────────┴──────┴──────→ time
          set(0,t0) ramp(S,t1)     set(S,t2) ramp(0,t3)

Between an event and a following ramp the value is interpolated from the
earlier event's (time, value) to the ramp's (time, value). After the last
event the value holds. A ramp with nothing before it starts from the base
value at time zero.
*/

/// A scheduled command against one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamCommand {
    SetValueAtTime { value: f32, time: f64 },
    LinearRampToValueAtTime { value: f32, time: f64 },
    /// Remove every event with `time >= from`.
    CancelScheduledValues { from: f64 },
    /// Clear the whole schedule and jump to `value` now.
    SetImmediate { value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EventKind {
    Set,
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Event {
    kind: EventKind,
    value: f32,
    time: f64,
}

#[derive(Debug, Clone)]
pub struct ParamTimeline {
    base: f32,
    events: Vec<Event>,
}

impl ParamTimeline {
    pub fn new(value: f32) -> Self {
        Self {
            base: value,
            events: Vec::with_capacity(8),
        }
    }

    pub fn apply(&mut self, command: ParamCommand) {
        match command {
            ParamCommand::SetValueAtTime { value, time } => {
                self.insert(Event {
                    kind: EventKind::Set,
                    value,
                    time,
                });
            }
            ParamCommand::LinearRampToValueAtTime { value, time } => {
                self.insert(Event {
                    kind: EventKind::Ramp,
                    value,
                    time,
                });
            }
            ParamCommand::CancelScheduledValues { from } => {
                self.events.retain(|e| e.time < from);
            }
            ParamCommand::SetImmediate { value } => {
                self.events.clear();
                self.base = value;
            }
        }
    }

    // Events at the same time keep insertion order.
    fn insert(&mut self, event: Event) {
        let idx = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(idx, event);
    }

    /// Evaluate the curve at `time`.
    pub fn value_at(&self, time: f64) -> f32 {
        let next_idx = self.events.partition_point(|e| e.time <= time);

        let (from_value, from_time) = match next_idx.checked_sub(1) {
            Some(prev) => (self.events[prev].value, self.events[prev].time),
            None => (self.base, 0.0),
        };

        match self.events.get(next_idx) {
            Some(next) if next.kind == EventKind::Ramp => {
                let span = next.time - from_time;
                if span <= 0.0 {
                    return next.value;
                }
                let progress = ((time - from_time) / span).clamp(0.0, 1.0) as f32;
                from_value + (next.value - from_value) * progress
            }
            _ => from_value,
        }
    }

    /// Fold events at or before `time` into the base value.
    pub fn prune(&mut self, time: f64) {
        let consumed = self.events.partition_point(|e| e.time <= time);
        if consumed == 0 {
            return;
        }

        let value = self.value_at(time);
        self.events.drain(..consumed);
        self.base = value;

        // A ramp still in flight needs its starting point kept.
        if matches!(self.events.first(), Some(e) if e.kind == EventKind::Ramp) {
            self.events.insert(
                0,
                Event {
                    kind: EventKind::Set,
                    value,
                    time,
                },
            );
        }
    }

    /// Number of events still scheduled.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is scheduled after `time`.
    pub fn is_settled(&self, time: f64) -> bool {
        self.events.last().map_or(true, |e| e.time <= time)
    }
}
