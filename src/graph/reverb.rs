use crate::dsp::reverb::ConvolutionReverb;
use crate::graph::node::{GraphNode, RenderCtx};

/*
Reverb Send
===========

Splits the incoming signal into two fixed-gain branches and sums them back:

  input ──┬──→ (× dry) ───────────────────┬──→ (+) ──→ output
          └──→ (× wet) ──→ [Convolution] ─┘

With dry = wet = 0.5 the direct sound sits at half level and the room
fills in behind it. The wet branch lags by one FFT partition (512 samples,
about 11 ms at 48 kHz), which reads as a short pre-delay.

The reverb keeps ringing after the input goes silent and never resets on
note events.
*/

pub struct ReverbSend {
    reverb: ConvolutionReverb,
    dry: f32,
    wet: f32,
}

impl ReverbSend {
    pub fn new(reverb: ConvolutionReverb, dry: f32, wet: f32) -> Self {
        Self {
            reverb,
            dry: dry.clamp(0.0, 1.0),
            wet: wet.clamp(0.0, 1.0),
        }
    }
}

impl GraphNode for ReverbSend {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let input = *sample;
            let wet = self.reverb.process(input * self.wet);
            *sample = input * self.dry + wet;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ctx() -> RenderCtx {
        RenderCtx::new(48_000.0, 0.0)
    }

    #[test]
    fn dry_branch_passes_through_immediately() {
        let mut send = ReverbSend::new(ConvolutionReverb::new(&[1.0]), 0.5, 0.5);
        let mut buffer = vec![0.8, -0.4, 0.2];
        send.render_block(&mut buffer, &test_ctx());

        assert!((buffer[0] - 0.4).abs() < 1e-6);
        assert!((buffer[1] + 0.2).abs() < 1e-6);
        assert!((buffer[2] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn wet_branch_adds_a_tail() {
        let impulse: Vec<f32> = (0..2_000).map(|i| 0.02 * (1.0 - i as f32 / 2_000.0)).collect();
        let mut send = ReverbSend::new(ConvolutionReverb::new(&impulse), 0.5, 0.5);

        let mut buffer = vec![0.0; 1];
        buffer[0] = 1.0;
        send.render_block(&mut buffer, &test_ctx());

        let mut tail_energy = 0.0;
        for _ in 0..40 {
            let mut buf = vec![0.0; 64];
            send.render_block(&mut buf, &test_ctx());
            tail_energy += buf.iter().map(|x| x * x).sum::<f32>();
        }
        assert!(tail_energy > 1e-4, "send should ring after the input stops");
    }
}
