//! One-shot capture state machine.
//!
//! A [`CaptureSession`] owns the state of a single capture attempt:
//!
//! ```text
//! Searching ⇄ Centered → BlinkLatched → CountingDown → Captured
//! ```
//!
//! Transitions are synchronous reactions to one [`FrameVerdict`] or one
//! timer tick; the clock itself lives in the scheduler. The blink latch is
//! deliberate: it decouples the (possibly noisy) single-frame blink verdict
//! from the countdown, and the monotonic countdown gives the subject
//! predictable feedback before the shutter fires.
//!
//! The machine is one-shot. Once `Captured` it ignores all further frames
//! and ticks; a new attempt requires an explicit [`CaptureSession::reset`].
//! Face loss after the latch does not revert the sequence — the driver stops
//! consuming frames once the latch is set, so a subject who blinked and then
//! drifted still gets their countdown and capture.

use crate::types::FrameVerdict;

/// State of a capture attempt. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No acceptable face seen in the last frame.
    Searching,
    /// Face centered and correctly sized; waiting for a blink.
    Centered,
    /// Blink observed while centered; waiting for the pre-countdown delay.
    BlinkLatched,
    /// Countdown running; `countdown_ticks` holds the remaining ticks.
    CountingDown,
    /// Shutter fired. Terminal.
    Captured,
}

/// Result of one countdown timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Countdown continues; `0` is never reported here.
    Counting(u32),
    /// Countdown elapsed — fire the shutter. The session is now `Captured`.
    Shutter,
}

/// Mutable state of one capture attempt.
///
/// Owned exclusively by whoever drives the gate (single writer); all other
/// gate components are pure functions.
#[derive(Debug)]
pub struct CaptureSession {
    state: CaptureState,
    countdown_ticks: Option<u32>,
    captured_image: Option<Vec<u8>>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Searching,
            countdown_ticks: None,
            captured_image: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Remaining countdown ticks. `Some` iff the state is `CountingDown`.
    pub fn countdown_ticks(&self) -> Option<u32> {
        self.countdown_ticks
    }

    /// The final mirror-corrected image, once captured and post-processed.
    ///
    /// `None` outside `Captured`, and also in `Captured` when
    /// post-processing failed and the caller chose not to reset.
    pub fn captured_image(&self) -> Option<&[u8]> {
        self.captured_image.as_deref()
    }

    /// React to one per-frame verdict. Returns the (possibly unchanged)
    /// state after the transition.
    ///
    /// Only `Searching` and `Centered` react to frames. Repeated
    /// eyes-closed frames while latched have no further effect, and frames
    /// arriving during the countdown or after capture are ignored.
    pub fn observe_frame(&mut self, verdict: FrameVerdict) -> CaptureState {
        match self.state {
            CaptureState::Searching if verdict.centered => {
                self.state = CaptureState::Centered;
            }
            CaptureState::Centered if !verdict.centered => {
                self.state = CaptureState::Searching;
            }
            CaptureState::Centered if verdict.eyes_closed => {
                self.state = CaptureState::BlinkLatched;
            }
            _ => {}
        }
        self.state
    }

    /// Arm the countdown after the post-blink delay has elapsed.
    ///
    /// Valid only in `BlinkLatched`; returns whether the countdown started.
    pub fn begin_countdown(&mut self, ticks: u32) -> bool {
        if self.state != CaptureState::BlinkLatched {
            return false;
        }
        self.state = CaptureState::CountingDown;
        self.countdown_ticks = Some(ticks);
        true
    }

    /// React to one countdown timer tick.
    ///
    /// Decrements the remaining ticks; reaching zero transitions to
    /// `Captured` and yields [`Tick::Shutter`]. Returns `None` outside
    /// `CountingDown`.
    pub fn tick(&mut self) -> Option<Tick> {
        if self.state != CaptureState::CountingDown {
            return None;
        }
        let remaining = self.countdown_ticks.unwrap_or(0);
        if remaining <= 1 {
            self.state = CaptureState::Captured;
            self.countdown_ticks = None;
            Some(Tick::Shutter)
        } else {
            self.countdown_ticks = Some(remaining - 1);
            Some(Tick::Counting(remaining - 1))
        }
    }

    /// Store the post-processed capture. Valid only once, in `Captured`;
    /// returns whether the image was stored.
    pub fn attach_image(&mut self, image: Vec<u8>) -> bool {
        if self.state != CaptureState::Captured || self.captured_image.is_some() {
            return false;
        }
        self.captured_image = Some(image);
        true
    }

    /// Discard this attempt and start a fresh one.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
