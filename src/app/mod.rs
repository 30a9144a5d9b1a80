//! Application state and the main loop.
//!
//! The loop draws a frame, drains pending input, measures real elapsed time
//! and feeds it into the gallery's logical scheduler. The drawing surface is
//! rebuilt whenever the terminal's world area changes size; selecting a new
//! simulation always goes through the gallery so the outgoing engine is
//! stopped before its surface is discarded.

pub mod input;
pub mod render;

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use simarium_core::config::GalleryConfig;
use simarium_core::scheduler::Gallery;
use simarium_data::SimulationKind;

/// Terminal guard: raw mode + alternate screen + mouse capture.
pub struct Tui {
    pub terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
        Ok(Self { terminal })
    }

    pub fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
        disable_raw_mode()?;
        Ok(())
    }
}

pub struct App {
    pub gallery: Gallery,
    pub kind: SimulationKind,
    pub running: bool,
    /// Index of the toolbar slider the arrow keys currently target.
    pub selected_control: usize,
    /// Next toolbar action 'p' will trigger (cycles).
    pub next_action: usize,
    /// Terminal rect the surface currently maps onto, for mouse routing.
    pub world_rect: Rect,
}

impl App {
    pub fn new(config: GalleryConfig, seed: u64, kind: SimulationKind) -> Self {
        Self {
            gallery: Gallery::new(config, seed),
            kind,
            running: true,
            selected_control: 0,
            next_action: 0,
            world_rect: Rect::default(),
        }
    }

    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut last_frame = Instant::now();

        while self.running {
            tui.terminal.draw(|f| self.draw(f))?;

            // Short poll keeps the loop responsive without busy-waiting.
            while event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse);
                    }
                    _ => {}
                }
            }

            let elapsed = last_frame.elapsed();
            last_frame = Instant::now();
            self.gallery.advance(elapsed);
        }

        self.gallery.close();
        Ok(())
    }

    /// Select `kind` on a surface matching the current world rect. Each
    /// terminal cell holds two stacked pixels.
    pub fn select(&mut self, kind: SimulationKind) {
        self.kind = kind;
        self.selected_control = 0;
        self.next_action = 0;
        let (width, height) = Self::surface_dims(self.world_rect);
        self.gallery.select(kind, width, height);
    }

    pub fn surface_dims(rect: Rect) -> (u32, u32) {
        (u32::from(rect.width), u32::from(rect.height) * 2)
    }

    /// Rebuild the engine if the world area changed size since the last
    /// frame (or nothing is selected yet).
    pub fn sync_surface(&mut self, rect: Rect) {
        self.world_rect = rect;
        let (width, height) = Self::surface_dims(rect);
        let stale = match self.gallery.engine() {
            Some(engine) => {
                engine.surface().width() != width || engine.surface().height() != height
            }
            None => true,
        };
        if stale && width > 0 && height > 0 {
            let kind = self.kind;
            self.select(kind);
        }
    }
}
