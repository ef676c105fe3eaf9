//! ADSR envelope shape for fixed-length notes.

/// ADSR envelope with linear attack/decay/release segments.
///
/// The note length is known up front, so the level is a pure function of
/// the time since the note started: the sustain segment fills whatever
/// the other three segments leave of the note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
}

impl Envelope {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let time = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Envelope {
            attack: time(attack),
            decay: time(decay),
            sustain: if sustain.is_finite() { sustain.clamp(0.0, 1.0) } else { 0.0 },
            release: time(release),
        }
    }

    /// Level at `time` seconds into a note lasting `note_length` seconds.
    pub fn level_at(&self, time: f64, note_length: f64) -> f64 {
        if time < 0.0 || time > note_length {
            return 0.0;
        }
        let sustain_time = (note_length - self.attack - self.decay - self.release).max(0.0);
        let decay_end = self.attack + self.decay;
        let release_start = decay_end + sustain_time;

        let level = if time < self.attack {
            time / self.attack
        } else if time < decay_end {
            1.0 - (1.0 - self.sustain) * (time - self.attack) / self.decay
        } else if time < release_start {
            self.sustain
        } else if self.release > 0.0 {
            self.sustain * (1.0 - (time - release_start) / self.release)
        } else {
            0.0
        };
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_ramps_to_one() {
        let env = Envelope::new(0.1, 0.1, 0.5, 0.2);
        assert!((env.level_at(0.05, 2.0) - 0.5).abs() < 1e-12);
        let peak = env.level_at(0.1, 2.0);
        assert!((peak - 1.0).abs() < 1e-9, "Attack should reach ~1.0, got {peak}");
    }

    #[test]
    fn sustain_holds() {
        let env = Envelope::new(0.01, 0.01, 0.6, 0.1);
        let s = env.level_at(1.0, 2.0);
        assert!((s - 0.6).abs() < 1e-12, "Should sustain at 0.6, got {s}");
    }

    #[test]
    fn release_to_zero() {
        let env = Envelope::new(0.01, 0.01, 0.7, 0.5);
        let end = env.level_at(2.0, 2.0);
        assert!(end.abs() < 1e-9, "Level should be ~0 at note end, got {end}");
        let mid = env.level_at(1.75, 2.0);
        assert!((mid - 0.35).abs() < 1e-9, "halfway through release, got {mid}");
    }

    #[test]
    fn outside_note_is_silent() {
        let env = Envelope::new(0.05, 0.1, 0.6, 0.2);
        assert_eq!(env.level_at(-0.1, 1.0), 0.0);
        assert_eq!(env.level_at(1.5, 1.0), 0.0);
    }

    #[test]
    fn full_cycle_range() {
        let env = Envelope::new(0.02, 0.1, 0.2, 0.1);
        for i in 0..=4000 {
            let s = env.level_at(i as f64 / 1000.0, 3.75);
            assert!((0.0..=1.0).contains(&s), "Envelope out of range: {s}");
        }
    }
}
