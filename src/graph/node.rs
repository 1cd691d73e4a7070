/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Render-clock time of the first sample in the block, in seconds
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Time of sample `index` within the block.
    #[inline]
    pub fn time_of(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context for a sub-block starting `offset` samples into this one.
    pub fn offset(&self, offset: usize) -> Self {
        Self {
            sample_rate: self.sample_rate,
            time: self.time_of(offset),
        }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render audio block by block. Everything that changes over time
/// reaches a node through its parameter lanes, so there are no note events.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }
}
