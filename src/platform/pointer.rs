//! Mouse drag tracking for the orbit camera

/// Travel (pixels) beyond which a press counts as a drag, not a click
pub const CLICK_SLOP: f32 = 4.0;

/// One button press from down to up
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDrag {
    last: Option<(f32, f32)>,
    travelled: f32,
}

impl PointerDrag {
    pub fn press(&mut self, x: f32, y: f32) {
        self.last = Some((x, y));
        self.travelled = 0.0;
    }

    /// Movement since the previous event, while a button is held
    pub fn moved(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let (lx, ly) = self.last?;
        let (dx, dy) = (x - lx, y - ly);
        self.last = Some((x, y));
        self.travelled += (dx * dx + dy * dy).sqrt();
        Some((dx, dy))
    }

    pub fn release(&mut self) {
        self.last = None;
    }

    pub fn is_pressed(&self) -> bool {
        self.last.is_some()
    }

    /// Whether the last press stayed put (the browser still fires `click`
    /// after a drag)
    pub fn was_click(&self) -> bool {
        self.travelled <= CLICK_SLOP
    }
}
