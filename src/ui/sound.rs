/// Sound effects: short procedural blips via rodio.
///
/// Every effect is synthesized once into an in-memory WAV buffer when the
/// engine starts; playback is fire-and-forget on a detached Sink.
///
/// Build without the "sound" feature to get a silent stub with the same API.

use crate::sim::confetti::BurstKind;
use crate::sim::event::CardEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Reject,
    Evade,
    Swap,
    Error,
    Warning,
    Accept,
    Pop,
}

/// Which effect, if any, accompanies an event.
pub fn cue_for(event: &CardEvent) -> Option<Sfx> {
    match event {
        CardEvent::Rejected { .. } => Some(Sfx::Reject),
        CardEvent::Evaded => Some(Sfx::Evade),
        CardEvent::ButtonsSwapped | CardEvent::ButtonsRestored => Some(Sfx::Swap),
        CardEvent::ErrorShown { .. } => Some(Sfx::Error),
        CardEvent::AutoAcceptScheduled => Some(Sfx::Warning),
        CardEvent::Accepted { .. } => Some(Sfx::Accept),
        // Drizzle is ambient; popping every two seconds gets old fast.
        CardEvent::Confetti(kind) if *kind != BurstKind::Drizzle => Some(Sfx::Pop),
        _ => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        reject: Arc<Vec<u8>>,
        evade: Arc<Vec<u8>>,
        swap: Arc<Vec<u8>>,
        error: Arc<Vec<u8>>,
        warning: Arc<Vec<u8>>,
        accept: Arc<Vec<u8>>,
        pop: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                reject: Arc::new(make_wav(&gen_reject())),
                evade: Arc::new(make_wav(&gen_evade())),
                swap: Arc::new(make_wav(&gen_swap())),
                error: Arc::new(make_wav(&gen_error())),
                warning: Arc::new(make_wav(&gen_warning())),
                accept: Arc::new(make_wav(&gen_accept())),
                pop: Arc::new(make_wav(&gen_pop())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Reject => &self.reject,
                Sfx::Evade => &self.evade,
                Sfx::Swap => &self.swap,
                Sfx::Error => &self.error,
                Sfx::Warning => &self.warning,
                Sfx::Accept => &self.accept,
                Sfx::Pop => &self.pop,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ── Waveform generators: mono f32 samples ──

    fn samples_for(secs: f32) -> usize {
        (SAMPLE_RATE as f32 * secs) as usize
    }

    /// Sine sweep from `f0` to `f1` with a linear fade.
    fn sweep(f0: f32, f1: f32, secs: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(secs);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (f0 + (f1 - f0) * t) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Sequence of soft-square notes, each `secs` long.
    fn notes(freqs: &[f32], secs: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(secs);
        freqs.iter()
            .flat_map(|&f| {
                (0..n).map(move |i| {
                    let t = i as f32 / SAMPLE_RATE as f32;
                    let env = 1.0 - (i as f32 / n as f32).powf(2.0);
                    let wave = (t * f * TAU).sin() * 0.75 + (t * f * 3.0 * TAU).sin() * 0.25;
                    wave * env * volume
                })
            })
            .collect()
    }

    /// Sad trombone, abbreviated.
    fn gen_reject() -> Vec<f32> {
        notes(&[392.0, 370.0, 349.0], 0.07, 0.25)
    }

    fn gen_evade() -> Vec<f32> {
        sweep(500.0, 1400.0, 0.09, 0.2)
    }

    fn gen_swap() -> Vec<f32> {
        notes(&[660.0, 880.0, 660.0, 880.0], 0.04, 0.2)
    }

    /// Harsh buzz: clipped low square.
    fn gen_error() -> Vec<f32> {
        let n = samples_for(0.22);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let sq = if (t * 140.0 * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                sq * (1.0 - i as f32 / n as f32) * 0.18
            })
            .collect()
    }

    fn gen_warning() -> Vec<f32> {
        let beep = notes(&[988.0], 0.06, 0.25);
        let gap = vec![0.0; samples_for(0.05)];
        let mut out = Vec::new();
        for _ in 0..3 {
            out.extend_from_slice(&beep);
            out.extend_from_slice(&gap);
        }
        out
    }

    /// C major arpeggio with a held top note.
    fn gen_accept() -> Vec<f32> {
        let mut out = notes(&[523.0, 659.0, 784.0], 0.09, 0.3);
        out.extend(sweep(1047.0, 1047.0, 0.35, 0.3));
        out
    }

    /// Noise tick for confetti.
    fn gen_pop() -> Vec<f32> {
        let n = samples_for(0.05);
        let mut seed: u32 = 0x9e37_79b9;
        (0..n)
            .map(|i| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let noise = seed as f32 / u32::MAX as f32 * 2.0 - 1.0;
                noise * (1.0 - i as f32 / n as f32).powf(3.0) * 0.3
            })
            .collect()
    }

    /// Wrap mono f32 samples in a 16-bit PCM WAV container.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_pop());
            assert_eq!(&wav[..4], b"RIFF");
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize;
            assert_eq!(wav.len(), 44 + data_size);
            assert_eq!(data_size, samples_for(0.05) * 2);
        }

        #[test]
        fn generators_stay_in_range() {
            for s in [gen_reject(), gen_evade(), gen_swap(), gen_error(), gen_warning(), gen_accept(), gen_pop()] {
                assert!(!s.is_empty());
                assert!(s.iter().all(|v| v.abs() <= 1.0));
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_pick_their_sounds() {
        assert_eq!(cue_for(&CardEvent::Rejected { attempt: 1 }), Some(Sfx::Reject));
        assert_eq!(cue_for(&CardEvent::ButtonsRestored), Some(Sfx::Swap));
        assert_eq!(cue_for(&CardEvent::Accepted { auto: true }), Some(Sfx::Accept));
        assert_eq!(cue_for(&CardEvent::Confetti(BurstKind::Grand)), Some(Sfx::Pop));
        assert_eq!(cue_for(&CardEvent::Confetti(BurstKind::Drizzle)), None);
        assert_eq!(cue_for(&CardEvent::HeartSpawned { id: 3 }), None);
        assert_eq!(cue_for(&CardEvent::ErrorDismissed), None);
    }
}
