/// Coalesces redraw requests into at most one pending frame.
///
/// Input handlers call [`FrameScheduler::request`]; the frame loop calls
/// [`FrameScheduler::take`] once per frame boundary and recomputes only when it returns `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameScheduler {
    pending: bool,
    requests: u64,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a frame as needed. Returns `true` if this request scheduled a new frame, `false` if
    /// it folded into one already pending.
    pub fn request(&mut self) -> bool {
        self.requests = self.requests.saturating_add(1);
        !core::mem::replace(&mut self.pending, true)
    }

    /// Consumes the pending frame, if any.
    pub fn take(&mut self) -> bool {
        if !core::mem::replace(&mut self.pending, false) {
            return false;
        }
        self.frames = self.frames.saturating_add(1);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total requests seen, including coalesced ones.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Frames actually produced by [`FrameScheduler::take`].
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
