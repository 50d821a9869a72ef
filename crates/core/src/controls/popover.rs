//! Click-outside-dismissible overlay.

/// Where a pointer click landed relative to the popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Trigger,
    Content,
    Outside,
}

pub struct Popover {
    open: bool,
    on_dismiss: Option<Box<dyn FnMut()>>,
}

impl Popover {
    pub fn new() -> Self {
        Self {
            open: false,
            on_dismiss: None,
        }
    }

    pub fn on_dismiss(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_dismiss = Some(Box::new(handler));
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn handle_click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Trigger => self.toggle(),
            ClickTarget::Content => {}
            ClickTarget::Outside => self.dismiss(),
        }
    }

    /// Escape key behaves like an outside click.
    pub fn escape(&mut self) {
        self.dismiss();
    }

    fn dismiss(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Some(handler) = self.on_dismiss.as_mut() {
            handler();
        }
    }
}

impl Default for Popover {
    fn default() -> Self {
        Self::new()
    }
}
