//! Keyboard handling and the event loop

use std::{collections::BTreeSet, io::stdout, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind},
    execute,
};
use gridsynth::{io::DeviceProvider, Engine, NoteId, Waveform};
use ratatui::DefaultTerminal;

use super::ui;

/// Bottom letter row plays white keys, the row above plays the black keys,
/// tracker style. `z` is C4.
const KEYBOARD: &str = "zsxdcvgbhnjm,l.;/";
const BASE_NOTE: NoteId = 60;
const VOLUME_STEP: f32 = 0.1;

pub struct App<P: DeviceProvider> {
    engine: Engine<P>,
    /// Notes currently toggled on.
    held: BTreeSet<NoteId>,
    last_note: Option<NoteId>,
    should_quit: bool,
}

impl<P: DeviceProvider> App<P> {
    pub fn new(engine: Engine<P>) -> Self {
        Self {
            engine,
            held: BTreeSet::new(),
            last_note: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        execute!(stdout(), EnableFocusChange)?;
        let result = self.event_loop(terminal);
        execute!(stdout(), DisableFocusChange)?;

        self.engine.kill_all();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.engine, &self.held))?;

            // ~60fps redraw so levels animate
            if event::poll(Duration::from_millis(16))? {
                self.handle_event(event::read()?);
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key.code),
            // Keys released while unfocused never reach us.
            Event::FocusLost => self.stop_all(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.stop_all(),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.engine.set_sound_type(Waveform::ALL[index]);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.engine.set_volume(self.engine.volume() + VOLUME_STEP);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.engine.set_volume(self.engine.volume() - VOLUME_STEP);
            }
            KeyCode::Left => self.bend(-1),
            KeyCode::Right => self.bend(1),
            KeyCode::Char(c) => {
                if let Some(note) = key_note(c) {
                    self.toggle(note);
                }
            }
            _ => {}
        }
    }

    fn toggle(&mut self, note: NoteId) {
        if self.held.remove(&note) {
            self.engine.note_off(note);
            if self.last_note == Some(note) {
                self.last_note = None;
            }
        } else {
            self.held.insert(note);
            self.engine.note_on(note);
            self.last_note = Some(note);
            self.forget_stolen();
        }
    }

    // Slide the most recent note by a semitone without retriggering it.
    fn bend(&mut self, semitones: NoteId) {
        let Some(old) = self.last_note else {
            return;
        };
        let new = old + semitones;
        self.engine.change_note(old, new);
        self.held.remove(&old);
        self.held.insert(new);
        self.last_note = Some(new);
        self.forget_stolen();
    }

    fn stop_all(&mut self) {
        self.engine.kill_all();
        self.held.clear();
        self.last_note = None;
    }

    // A steal takes a held note away without a key press; drop it here so
    // the next press strikes it again.
    fn forget_stolen(&mut self) {
        let Some(pool) = self.engine.pool() else {
            return;
        };
        self.held.retain(|&note| pool.voice_for(note).is_some());
        if self.last_note.is_some_and(|note| !self.held.contains(&note)) {
            self.last_note = None;
        }
    }
}

fn key_note(c: char) -> Option<NoteId> {
    KEYBOARD
        .chars()
        .position(|k| k == c.to_ascii_lowercase())
        .map(|offset| BASE_NOTE + offset as NoteId)
}
