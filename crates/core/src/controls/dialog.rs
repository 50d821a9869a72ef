//! Confirmation dialog (e.g. "Excluir obra?").

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogVariant {
    #[default]
    Default,
    /// Irreversible actions such as deletion; rendered with a danger style.
    Destructive,
}

type Callback = Box<dyn FnMut()>;

pub struct ConfirmDialog {
    pub title: String,
    pub description: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub variant: DialogVariant,
    open: bool,
    on_confirm: Callback,
    on_cancel: Option<Callback>,
}

impl ConfirmDialog {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        on_confirm: impl FnMut() + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            confirm_label: "Confirmar".to_string(),
            cancel_label: "Cancelar".to_string(),
            variant: DialogVariant::Default,
            open: false,
            on_confirm: Box::new(on_confirm),
            on_cancel: None,
        }
    }

    pub fn destructive(mut self) -> Self {
        self.variant = DialogVariant::Destructive;
        self
    }

    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    pub fn on_cancel(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(handler));
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Confirm button. Returns `false` when the dialog was not open.
    pub fn confirm(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        (self.on_confirm)();
        true
    }

    /// Cancel button, escape key or overlay click.
    pub fn cancel(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        if let Some(handler) = self.on_cancel.as_mut() {
            handler();
        }
        true
    }
}
