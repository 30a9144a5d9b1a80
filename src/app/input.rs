//! Key and mouse handling: universal start/stop plus toolbar routing.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use simarium_data::SimulationKind;

use crate::app::App;

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char(' ') => {
                if let Some(engine) = self.gallery.engine_mut() {
                    if engine.is_running() {
                        engine.stop();
                    } else {
                        engine.start();
                    }
                }
            }
            KeyCode::Char('r') => {
                let kind = self.kind;
                self.select(kind);
            }
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                self.select(SimulationKind::ALL[index]);
            }
            KeyCode::Left => {
                self.selected_control = self.selected_control.saturating_sub(1);
            }
            KeyCode::Right => {
                if let Some(toolbar) = self.gallery.toolbar_mut() {
                    let count = toolbar.controls().len();
                    if count > 0 {
                        self.selected_control = (self.selected_control + 1).min(count - 1);
                    }
                }
            }
            KeyCode::Up => self.adjust_selected(1),
            KeyCode::Down => self.adjust_selected(-1),
            KeyCode::Char('p') => self.trigger_next_action(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let rect = self.world_rect;
        if mouse.column < rect.x
            || mouse.row < rect.y
            || mouse.column >= rect.x + rect.width
            || mouse.row >= rect.y + rect.height
        {
            return;
        }
        let x = f64::from(mouse.column - rect.x);
        let y = f64::from(mouse.row - rect.y) * 2.0;
        if let Some(engine) = self.gallery.engine_mut() {
            engine.pointer_down(x, y);
        }
    }

    fn adjust_selected(&mut self, steps: i32) {
        let index = self.selected_control;
        if let Some((engine, toolbar)) = self.gallery.parts_mut() {
            if let Some(settings) = toolbar.adjust(index, steps) {
                engine.update_settings(&settings);
            }
        }
    }

    fn trigger_next_action(&mut self) {
        let index = self.next_action;
        if let Some((engine, toolbar)) = self.gallery.parts_mut() {
            let count = toolbar.actions().len();
            if count == 0 {
                return;
            }
            if let Some(settings) = toolbar.trigger(index % count) {
                engine.update_settings(&settings);
            }
            self.next_action = (index + 1) % count;
        }
    }
}
