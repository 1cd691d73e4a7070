//! Voice panel

use std::collections::BTreeSet;

use gridsynth::{
    io::DeviceProvider,
    synth::voice::VoiceState,
    Engine, NoteId, Waveform,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const LEVEL_WIDTH: usize = 24;

pub fn render<P: DeviceProvider>(frame: &mut Frame, engine: &Engine<P>, held: &BTreeSet<NoteId>) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(5),    // Voices
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    render_status(frame, chunks[0], engine, held);
    render_voices(frame, chunks[1], engine);

    let help = Paragraph::new(
        " [z..m , . /] Toggle notes  [←/→] Bend last  [1-5] Timbre  [+/-] Volume  [Space] Kill  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}

fn render_status<P: DeviceProvider>(frame: &mut Frame, area: Rect, engine: &Engine<P>, held: &BTreeSet<NoteId>) {
    let block = Block::default().title(" gridsynth ").borders(Borders::ALL);

    let mut spans = vec![Span::styled(" ", Style::default())];
    for (i, waveform) in Waveform::ALL.iter().enumerate() {
        let style = if *waveform == engine.sound_type() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!("{}:{}", i + 1, waveform), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!(" Vol {:.0}%  ", engine.volume() * 100.0),
        Style::default().fg(Color::Green),
    ));
    spans.push(Span::styled(
        format!("Master {:.2}  ", engine.master_gain()),
        Style::default().fg(Color::Magenta),
    ));
    let names: Vec<String> = held.iter().map(|&n| note_name(n)).collect();
    spans.push(Span::styled(
        format!("Held: {}", names.join(" ")),
        Style::default().fg(Color::White),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_voices<P: DeviceProvider>(frame: &mut Frame, area: Rect, engine: &Engine<P>) {
    let block = Block::default().title(" Voices ").borders(Borders::ALL);
    let now = engine.now();

    let lines: Vec<Line> = engine
        .voices()
        .iter()
        .enumerate()
        .map(|(i, voice)| {
            let state = voice.state(now);
            let (label, color) = match state {
                VoiceState::Idle => ("idle     ", Color::DarkGray),
                VoiceState::Sounding => ("sounding ", Color::Green),
                VoiceState::Releasing => ("release  ", Color::Yellow),
            };
            let note = match (state, voice.note()) {
                (VoiceState::Idle, _) | (_, None) => "--".to_string(),
                (_, Some(n)) => note_name(n),
            };
            let level = voice.level(now);
            let filled = ((level.clamp(0.0, 1.0) * LEVEL_WIDTH as f32).round()) as usize;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(LEVEL_WIDTH - filled));

            Line::from(vec![
                Span::raw(format!(" {} ", i + 1)),
                Span::styled(format!("{note:<4}"), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(label, Style::default().fg(color)),
                Span::styled(bar, Style::default().fg(color)),
                Span::styled(format!(" {level:.2}"), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn note_name(note: NoteId) -> String {
    let name = NOTE_NAMES[note.rem_euclid(12) as usize];
    format!("{}{}", name, note.div_euclid(12) - 1)
}
