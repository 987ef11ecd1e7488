/// Fraction of the surface that must be on screen before a scene does work.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;
/// Particle fields and island motion only advance on every n-th frame.
pub const BEAT_DIVISOR: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityGate {
    threshold: f32,
    visible: bool,
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            visible: true,
        }
    }

    /// Records the latest intersection ratio. Returns true when the flag flipped.
    pub fn observe(&mut self, ratio: f32) -> bool {
        let visible = ratio >= self.threshold && ratio > 0.0;
        let changed = visible != self.visible;
        self.visible = visible;
        changed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub index: u64,
    pub on_beat: bool,
}

/// Per-scene frame counter gated on visibility.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    visibility: VisibilityGate,
    frame_count: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            visibility: VisibilityGate::default(),
            frame_count: 0,
        }
    }

    /// `None` while hidden; the frame counter only advances on visible ticks.
    pub fn tick(&mut self) -> Option<FrameTick> {
        if !self.visibility.is_visible() {
            return None;
        }
        self.frame_count += 1;
        Some(FrameTick {
            index: self.frame_count,
            on_beat: self.frame_count % BEAT_DIVISOR == 0,
        })
    }

    pub fn observe_visibility(&mut self, ratio: f32) -> bool {
        let changed = self.visibility.observe(ratio);
        if changed {
            log::debug!(
                "scene visibility changed: visible={} after {} frames",
                self.visibility.is_visible(),
                self.frame_count
            );
        }
        changed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
