//! Keybinding glue: egui key events to engine keys. Hosts that want their
//! own bindings bypass this and feed `InputEvent::KeyDown` directly.

use eframe::egui;
use wiregraph_core::{Key, Modifiers};

pub fn modifiers(input: &egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: input.shift,
        ctrl: input.command,
        alt: input.alt,
    }
}

/// Resolves a pressed egui key plus modifiers into an engine key.
pub fn resolve(key: egui::Key, modifiers: &egui::Modifiers) -> Option<Key> {
    match key {
        egui::Key::Escape => Some(Key::Escape),
        egui::Key::Delete | egui::Key::Backspace => Some(Key::Delete),
        egui::Key::C if modifiers.command => Some(Key::Copy),
        egui::Key::X if modifiers.command => Some(Key::Cut),
        egui::Key::V if modifiers.command => Some(Key::Paste),
        egui::Key::D if modifiers.command => Some(Key::Duplicate),
        egui::Key::Z if modifiers.command && modifiers.shift => Some(Key::Redo),
        egui::Key::Z if modifiers.command => Some(Key::Undo),
        egui::Key::F if !modifiers.any() => Some(Key::FrameSelection),
        egui::Key::F2 => Some(Key::Rename),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_share_the_letter() {
        let ctrl = egui::Modifiers::COMMAND;
        let ctrl_shift = egui::Modifiers::COMMAND | egui::Modifiers::SHIFT;
        assert_eq!(resolve(egui::Key::Z, &ctrl), Some(Key::Undo));
        assert_eq!(resolve(egui::Key::Z, &ctrl_shift), Some(Key::Redo));
    }

    #[test]
    fn frame_only_without_modifiers() {
        assert_eq!(resolve(egui::Key::F, &egui::Modifiers::NONE), Some(Key::FrameSelection));
        assert_eq!(resolve(egui::Key::F, &egui::Modifiers::COMMAND), None);
    }
}
