//! On/off switch with controlled and uncontrolled modes.

/// Where a toggle's checked value comes from.
pub trait CheckedState {
    /// The value the control renders.
    fn is_checked(&self) -> bool;

    /// Record a value requested by user interaction.
    fn request(&mut self, next: bool);

    /// Apply a new value supplied by the owner of the control.
    fn sync(&mut self, _external: bool) {}
}

/// The owner supplies the value; clicks only report what the user asked for.
#[derive(Debug, Clone, Copy)]
pub struct Controlled {
    value: bool,
}

impl CheckedState for Controlled {
    fn is_checked(&self) -> bool {
        self.value
    }

    fn request(&mut self, _next: bool) {}

    fn sync(&mut self, external: bool) {
        self.value = external;
    }
}

/// The toggle owns its value, seeded from a default.
#[derive(Debug, Clone, Copy)]
pub struct Uncontrolled {
    value: bool,
}

impl CheckedState for Uncontrolled {
    fn is_checked(&self) -> bool {
        self.value
    }

    fn request(&mut self, next: bool) {
        self.value = next;
    }
}

type ChangeHandler = Box<dyn FnMut(bool)>;

pub struct Toggle {
    state: Box<dyn CheckedState>,
    controlled: bool,
    disabled: bool,
    on_change: Option<ChangeHandler>,
}

impl Toggle {
    /// Pick the mode from the props: a supplied `checked` makes the toggle
    /// controlled, otherwise it starts from `default_checked`.
    pub fn new(checked: Option<bool>, default_checked: bool) -> Self {
        match checked {
            Some(value) => Self::with_state(Box::new(Controlled { value }), true),
            None => Self::with_state(
                Box::new(Uncontrolled {
                    value: default_checked,
                }),
                false,
            ),
        }
    }

    pub fn controlled(checked: bool) -> Self {
        Self::new(Some(checked), false)
    }

    pub fn uncontrolled(default_checked: bool) -> Self {
        Self::new(None, default_checked)
    }

    fn with_state(state: Box<dyn CheckedState>, controlled: bool) -> Self {
        Self {
            state,
            controlled,
            disabled: false,
            on_change: None,
        }
    }

    pub fn on_change(mut self, handler: impl FnMut(bool) + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_checked(&self) -> bool {
        self.state.is_checked()
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// User click: request the opposite value and notify the handler.
    pub fn click(&mut self) {
        if self.disabled {
            return;
        }
        let next = !self.state.is_checked();
        self.state.request(next);
        if let Some(handler) = self.on_change.as_mut() {
            handler(next);
        }
    }

    /// New `checked` prop from the owner. Ignored in uncontrolled mode.
    pub fn set_checked(&mut self, checked: bool) {
        self.state.sync(checked);
    }
}
