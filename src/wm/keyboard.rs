//! Keyboard Module
//!
//! Modifier tracking and the mapping from key presses to window manager
//! actions. Key grabs live in the X11 backend; this module only sees keysyms.

use bitflags::bitflags;

use crate::wm::focus::{Direction, GRID_COLUMNS};

pub type KeySym = u32;

/// The keysyms the bindings are written against
pub mod keysym {
    use super::KeySym;

    pub const F1: KeySym = 0xffbe;
    pub const F4: KeySym = 0xffc1;
    pub const F12: KeySym = 0xffc9;
    pub const LEFT: KeySym = 0xff51;
    pub const UP: KeySym = 0xff52;
    pub const RIGHT: KeySym = 0xff53;
    pub const DOWN: KeySym = 0xff54;
    pub const SHIFT_L: KeySym = 0xffe1;
    pub const SHIFT_R: KeySym = 0xffe2;
    pub const CONTROL_L: KeySym = 0xffe3;
    pub const CONTROL_R: KeySym = 0xffe4;
    pub const ALT_L: KeySym = 0xffe9;
    pub const ALT_R: KeySym = 0xffea;
    pub const SUPER_L: KeySym = 0xffeb;
    pub const SUPER_R: KeySym = 0xffec;
    pub const DIGIT_0: KeySym = 0x30;
    pub const DIGIT_9: KeySym = 0x39;
    pub const A: KeySym = 0x61;
    pub const Z: KeySym = 0x7a;
}

bitflags! {
    /// Modifier keys currently held down
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct ModifierState: u8 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT     = 1 << 2;
        const SUPER   = 1 << 3;
    }
}

impl ModifierState {
    fn for_key(sym: KeySym) -> Option<Self> {
        let m = match sym {
            keysym::SHIFT_L | keysym::SHIFT_R => Self::SHIFT,
            keysym::CONTROL_L | keysym::CONTROL_R => Self::CONTROL,
            keysym::ALT_L | keysym::ALT_R => Self::ALT,
            keysym::SUPER_L | keysym::SUPER_R => Self::SUPER,
            _ => return None,
        };

        Some(m)
    }

    /// Update the held modifiers for a press or release of `sym`.
    /// Returns true if `sym` was a modifier key.
    pub fn track(&mut self, sym: KeySym, pressed: bool) -> bool {
        match Self::for_key(sym) {
            Some(m) => {
                self.set(m, pressed);
                true
            }
            None => false,
        }
    }

    /// Super held together with exactly one of alt and control
    pub fn wants_overlay(&self) -> bool {
        self.contains(Self::SUPER) && (self.contains(Self::ALT) != self.contains(Self::CONTROL))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Run the command bound to `hotkey.<letter>`
    Launch(char),
    SelectWorkspace(usize),
    SelectScreen(usize),
    Navigate(Direction),
    Swap(Direction),
    /// Politely close the front window of the active workspace
    CloseWindow,
}

fn direction(sym: KeySym) -> Option<Direction> {
    match sym {
        keysym::LEFT => Some(Direction::Left),
        keysym::RIGHT => Some(Direction::Right),
        keysym::UP => Some(Direction::Up),
        keysym::DOWN => Some(Direction::Down),
        _ => None,
    }
}

/// The action bound to pressing `sym` with `mods` held, if any
pub fn resolve(mods: ModifierState, sym: KeySym) -> Option<KeyAction> {
    let super_ = mods.contains(ModifierState::SUPER);
    let alt = mods.contains(ModifierState::ALT);
    let control = mods.contains(ModifierState::CONTROL);

    if alt && sym == keysym::F4 {
        return Some(KeyAction::CloseWindow);
    }

    if let Some(dir) = direction(sym) {
        return match (super_, control, alt) {
            (true, true, _) => Some(KeyAction::Swap(dir)),
            (true, false, true) => Some(KeyAction::Navigate(dir)),
            _ => None,
        };
    }

    if (keysym::F1..=keysym::F12).contains(&sym) && (super_ || control) {
        let n = (sym - keysym::F1) as usize;
        let row = if control { 1 } else { 0 };
        return Some(KeyAction::SelectWorkspace(row * GRID_COLUMNS + n));
    }

    if !super_ {
        return None;
    }

    match sym {
        keysym::DIGIT_0 => Some(KeyAction::SelectScreen(9)),
        s if (keysym::DIGIT_0 + 1..=keysym::DIGIT_9).contains(&s) => {
            Some(KeyAction::SelectScreen((s - keysym::DIGIT_0 - 1) as usize))
        }
        s if (keysym::A..=keysym::Z).contains(&s) => char::from_u32(s).map(KeyAction::Launch),
        _ => None,
    }
}
