//! The speaker, as seen from the bus.
//!
//! The Apple II speaker is a single toggle: any access to `$C030` flips the
//! cone, and software makes tones by toggling it in a timed loop. The core
//! only reports the accesses; turning them into audio is the host's problem.
//! The observer callback runs on the CPU thread and must not block.

use std::cell::RefCell;
use std::rc::Rc;

pub trait Speaker {
    /// One access of the speaker toggle soft switch.
    fn click(&mut self);

    /// The monitor BELL routine. Hosts usually map this to a 1 kHz chirp.
    fn beep(&mut self);
}

/// Shared handle to a speaker observer, cloned between the memory bus and
/// the interpreter.
pub type SpeakerHandle = Rc<RefCell<dyn Speaker>>;

/// A speaker that swallows everything.
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn click(&mut self) {}
    fn beep(&mut self) {}
}

/// Counts accesses instead of making noise. Used by tests and by hosts that
/// drain the counts into an audio ring buffer.
#[derive(Default)]
pub struct ClickCounter {
    pub clicks: u32,
    pub beeps: u32,
}

impl Speaker for ClickCounter {
    fn click(&mut self) {
        self.clicks += 1;
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }
}
