//! Piezo buzzer melody sequencer.
//!
//! Non-blocking: `play` starts a melody and `tick` is called once per poll
//! to advance it by deadline.  Both return the tone change (if any) the
//! hardware layer should apply to the LEDC channel, so the sequencer itself
//! stays pure and host-testable.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub freq_hz: u32,
    pub duration_ms: u32,
}

const fn note(freq_hz: u32, duration_ms: u32) -> Note {
    Note { freq_hz, duration_ms }
}

const STARTUP: &[Note] = &[note(1024, 2000)];
const CONNECTED: &[Note] = &[note(2048, 500)];
const READY: &[Note] = &[note(1024, 500)];
const NO_WATER: &[Note] = &[note(2048, 1000)];
const RESET: &[Note] = &[note(1024, 250), note(2048, 250), note(1024, 500)];

/// Audible cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Melody {
    Startup,
    Connected,
    Ready,
    NoWater,
    Reset,
}

impl Melody {
    pub const fn notes(self) -> &'static [Note] {
        match self {
            Self::Startup => STARTUP,
            Self::Connected => CONNECTED,
            Self::Ready => READY,
            Self::NoWater => NO_WATER,
            Self::Reset => RESET,
        }
    }
}

/// Output change requested by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Play(u32),
    Silence,
}

#[derive(Default)]
pub struct Buzzer {
    notes: &'static [Note],
    index: usize,
    note_started_ms: u32,
}

impl Buzzer {
    pub const fn new() -> Self {
        Self {
            notes: &[],
            index: 0,
            note_started_ms: 0,
        }
    }

    /// Start `melody`, interrupting whatever was playing.
    pub fn play(&mut self, melody: Melody, now_ms: u32) -> Tone {
        self.notes = melody.notes();
        self.index = 0;
        self.note_started_ms = now_ms;
        self.current_tone()
    }

    /// Advance by deadline.  `None` means leave the output as it is.
    pub fn tick(&mut self, now_ms: u32) -> Option<Tone> {
        let note = self.notes.get(self.index)?;
        if now_ms.wrapping_sub(self.note_started_ms) < note.duration_ms {
            return None;
        }
        self.note_started_ms = self.note_started_ms.wrapping_add(note.duration_ms);
        self.index += 1;
        if self.index >= self.notes.len() {
            self.stop();
            return Some(Tone::Silence);
        }
        Some(self.current_tone())
    }

    pub fn stop(&mut self) {
        self.notes = &[];
        self.index = 0;
    }

    pub fn is_playing(&self) -> bool {
        self.index < self.notes.len()
    }

    fn current_tone(&self) -> Tone {
        match self.notes.get(self.index) {
            Some(n) => Tone::Play(n.freq_hz),
            None => Tone::Silence,
        }
    }
}
