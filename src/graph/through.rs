use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through renders a source into the output buffer, then hands that buffer to
a second node that processes it in place. The output graph uses it once, to
put the reverb send after the gain stages:

  voices ─→ (× master) ─→ (× volume) ─→ [Send] ─→ output

Signal Flow Diagram:
--------------------
  Through: [Source] ──→ [Effect] ──→ output

  Amplify: [Signal] ──┬──→ (×) ──→ output
           [Mod]    ──┘

  Send:    [Input] ──┬──→ (×dry) ─────────────┬──→ (+) ──→ output
                     └──→ (×wet) → [Reverb] ──┘
*/

pub struct Through<S, F> {
    source: S,
    filter: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.filter.render_block(out, ctx);
    }
}
