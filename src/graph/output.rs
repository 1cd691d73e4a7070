use crate::{
    graph::{
        amplify::Amplify,
        bus::VoiceBus,
        extensions::NodeExt,
        node::{GraphNode, RenderCtx},
        param::ParamLane,
        reverb::ReverbSend,
        through::Through,
    },
    MAX_BLOCK_SIZE,
};

type Chain = Through<Amplify<Amplify<VoiceBus, ParamLane>, ParamLane>, ReverbSend>;

/// The complete render side of one pool/router generation.
///
/// Built on the control thread by `SignalRouter` and then handed to the
/// output device, which owns it until the next rebuild.
pub struct OutputGraph {
    chain: Chain,
}

impl OutputGraph {
    pub fn new(voices: VoiceBus, master: ParamLane, volume: ParamLane, send: ReverbSend) -> Self {
        Self {
            chain: voices.amplify(master).amplify(volume).through(send),
        }
    }
}

impl GraphNode for OutputGraph {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Inner nodes keep MAX_BLOCK_SIZE scratch buffers.
        let mut offset = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let sub_ctx = ctx.offset(offset);
            self.chain.render_block(chunk, &sub_ctx);
            offset += chunk.len();
        }
    }
}
