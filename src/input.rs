use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Input the editor reacts to. Pointer positions are in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed inside the canvas
    PointerDown { position: Pos2, modifiers: Modifiers },
    /// Pointer moved, with or without the button held
    PointerMove { position: Pos2 },
    /// Primary button released
    PointerUp { position: Pos2 },
    DoubleClick { position: Pos2 },
    Shortcut(Shortcut),
}

/// Keyboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    SelectAll,
    DeleteSelected,
    RotateSelected,
    /// Deselect and drop any half-drawn room
    Escape,
    FinishRoom,
}

impl Shortcut {
    /// Map a key press to a command.
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        match key {
            Key::Z if modifiers.command && modifiers.shift => Some(Self::Redo),
            Key::Z if modifiers.command => Some(Self::Undo),
            Key::Y if modifiers.command => Some(Self::Redo),
            Key::A if modifiers.command => Some(Self::SelectAll),
            Key::Delete | Key::Backspace => Some(Self::DeleteSelected),
            Key::R if !modifiers.command => Some(Self::RotateSelected),
            Key::Escape => Some(Self::Escape),
            Key::Enter => Some(Self::FinishRoom),
            _ => None,
        }
    }
}

/// Turns raw egui input into [`InputEvent`]s for the canvas.
///
/// Presses that start outside the canvas are ignored; once a press began
/// inside, moves and the release are reported wherever the pointer goes.
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
    pressed_in_canvas: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            pressed_in_canvas: false,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Collect this frame's events. Key presses are skipped while a text
    /// field has keyboard focus.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let wants_keyboard = ctx.wants_keyboard_input();
        let mut events = Vec::new();

        ctx.input(|input| {
            let pos = input.pointer.interact_pos().or(self.last_pointer_pos);

            if let Some(pos) = pos {
                if input.pointer.button_pressed(PointerButton::Primary)
                    && self.canvas_rect.contains(pos)
                {
                    self.pressed_in_canvas = true;
                    events.push(InputEvent::PointerDown {
                        position: pos,
                        modifiers: input.modifiers,
                    });
                }

                let hovering = self.canvas_rect.contains(pos);
                if Some(pos) != self.last_pointer_pos && (hovering || self.pressed_in_canvas) {
                    events.push(InputEvent::PointerMove { position: pos });
                }

                if input.pointer.button_released(PointerButton::Primary) && self.pressed_in_canvas {
                    self.pressed_in_canvas = false;
                    events.push(InputEvent::PointerUp { position: pos });
                }

                if input.pointer.button_double_clicked(PointerButton::Primary) && hovering {
                    events.push(InputEvent::DoubleClick { position: pos });
                }
            }
            self.last_pointer_pos = input.pointer.hover_pos().or(pos);

            if wants_keyboard {
                return;
            }
            for event in &input.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } = event
                {
                    if let Some(shortcut) = Shortcut::from_key(*key, *modifiers) {
                        events.push(InputEvent::Shortcut(shortcut));
                    }
                }
            }
        });

        events
    }
}
