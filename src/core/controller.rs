/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyQ,
    KeyE,
    Space,
    Shift,
    /// Regenerate the sphere field
    KeyR,
    /// Widen the field of view
    Plus,
    /// Narrow the field of view
    Minus,
    /// Quit the application
    Escape,
}

/// Controller - held and freshly pressed button states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Check if button went down since the last frame boundary
    fn just_pressed(&self, button: Button) -> bool;
}
