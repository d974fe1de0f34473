use plate_core::{BlockKind, Mark};
use serde::{Deserialize, Serialize};

use crate::engine::DocumentEngine;
use crate::format::Format;
use crate::keys::{KeyEvent, resolve_key};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarItem {
    pub id: String,
    pub label: String,
    pub format: Format,
}

impl ToolbarItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, format: Format) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            format,
        }
    }
}

/// Buttons shown on the toolbar, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarConfig {
    #[serde(default)]
    pub items: Vec<ToolbarItem>,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            items: vec![
                ToolbarItem::new("bold", "𝗕", Format::mark(Mark::Bold)),
                ToolbarItem::new("italic", "𝐼", Format::mark(Mark::Italic)),
                ToolbarItem::new("underline", "𝐔", Format::mark(Mark::Underline)),
                ToolbarItem::new("strikethrough", "A̶", Format::mark(Mark::Strikethrough)),
                ToolbarItem::new("code", "<>", Format::mark(Mark::Code)),
                ToolbarItem::new("block-quote", "＂", Format::block(BlockKind::BlockQuote)),
                ToolbarItem::new("rainbow", "🌈", Format::mark(Mark::Rainbow)),
            ],
        }
    }
}

impl ToolbarConfig {
    pub fn item(&self, id: &str) -> Option<&ToolbarItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Pointer-down on a toolbar button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonPress {
    pub id: String,
    default_prevented: bool,
}

impl ButtonPress {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Set once the press was handled; the host must then keep focus and
    /// selection in the document.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    ButtonPress(ButtonPress),
    KeyDown(KeyEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub id: String,
    pub label: String,
    pub format: Format,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolbarState {
    pub buttons: Vec<ButtonState>,
}

impl ToolbarState {
    pub fn button(&self, id: &str) -> Option<&ButtonState> {
        self.buttons.iter().find(|button| button.id == id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.button(id).is_some_and(|button| button.active)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.buttons
            .iter()
            .filter(|button| button.active)
            .map(|button| button.id.as_str())
    }
}

/// Draws the toolbar. Called with a fresh state after every change.
pub trait ToolbarView {
    fn render(&mut self, state: &ToolbarState);
}

impl<F: FnMut(&ToolbarState)> ToolbarView for F {
    fn render(&mut self, state: &ToolbarState) {
        self(state)
    }
}

/// Routes toolbar presses and key events to the formatting commands and
/// keeps the toolbar's active flags in step with the engine.
pub struct Dispatcher {
    config: ToolbarConfig,
    state: ToolbarState,
}

impl Dispatcher {
    pub fn new(config: ToolbarConfig) -> Self {
        let buttons = config
            .items
            .iter()
            .map(|item| ButtonState {
                id: item.id.clone(),
                label: item.label.clone(),
                format: item.format,
                active: false,
            })
            .collect();
        Self {
            config,
            state: ToolbarState { buttons },
        }
    }

    pub fn state(&self) -> &ToolbarState {
        &self.state
    }

    /// Runs the command bound to the pressed button. The press is always
    /// marked handled so the document keeps focus. Unknown ids do nothing.
    pub fn on_button_press<E: DocumentEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        press: &mut ButtonPress,
    ) -> Result<bool, E::Error> {
        press.prevent_default();
        let Some(item) = self.config.item(&press.id) else {
            log::trace!("no toolbar item {:?}", press.id);
            return Ok(false);
        };
        log::debug!("toolbar {} -> {}", item.id, item.format);
        item.format.toggle(engine)
    }

    pub fn on_key_down<E: DocumentEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        event: &mut KeyEvent,
    ) -> Result<bool, E::Error> {
        let Some(format) = resolve_key(event) else {
            return Ok(false);
        };
        log::debug!("key {:?} -> {format}", event.key);
        format.toggle(engine)
    }

    pub fn dispatch<E: DocumentEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        event: &mut UiEvent,
    ) -> Result<bool, E::Error> {
        match event {
            UiEvent::ButtonPress(press) => self.on_button_press(engine, press),
            UiEvent::KeyDown(key) => self.on_key_down(engine, key),
        }
    }

    /// Re-queries every button against the engine.
    pub fn refresh<E: DocumentEngine + ?Sized>(&mut self, engine: &E) -> &ToolbarState {
        for button in &mut self.state.buttons {
            button.active = button.format.is_active(engine);
        }
        &self.state
    }

    /// Drains the engine's change notifications and, if there were any,
    /// refreshes and renders the toolbar. Returns whether it rendered.
    pub fn sync<E, V>(&mut self, engine: &mut E, view: &mut V) -> bool
    where
        E: DocumentEngine + ?Sized,
        V: ToolbarView + ?Sized,
    {
        let changes = engine.take_changes();
        if changes.is_empty() {
            return false;
        }
        log::trace!("{} change(s), refreshing toolbar", changes.len());

        self.refresh(&*engine);
        view.render(&self.state);
        true
    }
}
