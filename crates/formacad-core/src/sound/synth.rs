//! Procedural noise synthesis.
//!
//! Every buffer is generated in one pass when playback starts and then
//! looped by the backend. No audio assets are loaded.

use rand::Rng;

use super::catalog::SoundType;

/// Length of a generated loop.
pub const BUFFER_SECONDS: u32 = 2;

pub const WHITE_GAIN: f32 = 0.15;
/// Leak coefficient of the brown-noise integrator.
pub const BROWN_LEAK: f32 = 0.015;
/// Make-up gain for the integrator's energy loss.
pub const BROWN_GAIN: f32 = 1.5;
pub const RAIN_GAIN: f32 = 0.08;
pub const RAIN_DEPTH: f32 = 0.3;
/// Radians per sample of the rain intensity swell.
pub const RAIN_RATE: f32 = 0.003;

/// Number of samples in one loop at `sample_rate`.
pub fn buffer_len(sample_rate: u32) -> usize {
    (sample_rate as usize).saturating_mul(BUFFER_SECONDS as usize)
}

/// Generate a loop buffer for `sound_type`.
pub fn synthesize<R: Rng + ?Sized>(sound_type: SoundType, sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let white = uniform_noise(rng, buffer_len(sample_rate));
    match sound_type {
        SoundType::WhiteNoise => white.into_iter().map(|u| u * WHITE_GAIN).collect(),
        SoundType::BrownNoise => brown_from_white(&white),
        SoundType::Rain => rain_from_white(&white),
    }
}

/// Uniform samples in `[-1, 1]`.
pub fn uniform_noise<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect()
}

/// Leaky integration of white noise: `b[i] = (b[i-1] + k*w[i]) / (1+k)`.
///
/// For inputs in `[-1, 1]` the output stays within `[-BROWN_GAIN, BROWN_GAIN]`.
pub fn brown_from_white(white: &[f32]) -> Vec<f32> {
    let mut last = 0.0f32;
    white
        .iter()
        .map(|&w| {
            // Rounding can push the state a hair past unity.
            last = ((last + BROWN_LEAK * w) / (1.0 + BROWN_LEAK)).clamp(-1.0, 1.0);
            last * BROWN_GAIN
        })
        .collect()
}

/// White noise under a slow sine swell.
pub fn rain_from_white(white: &[f32]) -> Vec<f32> {
    white
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let swell = 1.0 + RAIN_DEPTH * (i as f32 * RAIN_RATE).sin();
            w * RAIN_GAIN * swell
        })
        .collect()
}

/// Peak absolute amplitude of a buffer.
pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Root mean square amplitude of a buffer.
pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    let sum: f64 = buffer.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / buffer.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(7)
    }

    #[test]
    fn buffers_hold_two_seconds() {
        for t in [SoundType::WhiteNoise, SoundType::BrownNoise, SoundType::Rain] {
            assert_eq!(synthesize(t, 48_000, &mut rng()).len(), 96_000);
        }
    }

    #[test]
    fn white_noise_respects_gain() {
        let buf = synthesize(SoundType::WhiteNoise, 8_000, &mut rng());
        assert!(peak(&buf) <= WHITE_GAIN);
        assert!(peak(&buf) > WHITE_GAIN * 0.9);
    }

    #[test]
    fn rain_stays_under_swell_ceiling() {
        let buf = synthesize(SoundType::Rain, 8_000, &mut rng());
        assert!(peak(&buf) <= RAIN_GAIN * (1.0 + RAIN_DEPTH) + f32::EPSILON);
    }

    #[test]
    fn rain_envelope_follows_sine() {
        let ones = vec![1.0f32; 1000];
        let buf = rain_from_white(&ones);
        assert!((buf[0] - RAIN_GAIN).abs() < 1e-6);
        // Quarter period of sin(i * 0.003) is ~523 samples.
        assert!(buf[523] > RAIN_GAIN * 1.29);
    }

    #[test]
    fn brown_noise_is_darker_than_white() {
        let white = uniform_noise(&mut rng(), 16_000);
        let brown = brown_from_white(&white);
        let diff = |b: &[f32]| -> f32 {
            b.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f32>() / b.len() as f32
        };
        let scaled_white: Vec<f32> = white.iter().map(|w| w * WHITE_GAIN).collect();
        assert!(diff(&brown) < diff(&scaled_white));
    }

    #[test]
    fn same_seed_same_buffer() {
        let a = synthesize(SoundType::BrownNoise, 4_000, &mut rng());
        let b = synthesize(SoundType::BrownNoise, 4_000, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn rms_of_constant_buffer() {
        assert!((rms(&[0.5; 10]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    proptest! {
        #[test]
        fn brown_noise_is_bounded(white in prop::collection::vec(-1.0f32..=1.0, 0..4096)) {
            for s in brown_from_white(&white) {
                prop_assert!((-BROWN_GAIN..=BROWN_GAIN).contains(&s));
            }
        }

        #[test]
        fn brown_noise_of_extremes_is_bounded(signs in prop::collection::vec(any::<bool>(), 1..4096)) {
            let white: Vec<f32> = signs.iter().map(|&b| if b { 1.0 } else { -1.0 }).collect();
            prop_assert!(peak(&brown_from_white(&white)) <= BROWN_GAIN);
        }
    }
}
