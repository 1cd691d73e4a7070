use crate::{
    graph::{
        amplify::Amplify,
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
        param::ParamLane,
    },
    MAX_BLOCK_SIZE,
};

/// One voice as the renderer sees it: oscillator times envelope.
pub type VoiceNode = Amplify<OscNode, ParamLane>;

/// Sums every voice into one mono signal.
pub struct VoiceBus {
    voices: Vec<VoiceNode>,
    temp_buffer: Vec<f32>,
}

impl VoiceBus {
    pub fn new(voices: Vec<VoiceNode>) -> Self {
        Self {
            voices,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl GraphNode for VoiceBus {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let frames = &mut self.temp_buffer[..out.len()];
            frames.fill(0.0);
            voice.render_block(frames, ctx);

            for (o, v) in out.iter_mut().zip(frames.iter()) {
                *o += v;
            }
        }
    }
}
