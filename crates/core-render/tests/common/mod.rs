#![allow(dead_code)]

use core_events::EventQueue;
use core_render::RenderState;
use core_terminal::{Directive, RecordingBackend};

pub fn session(height: u16, width: u16) -> (RecordingBackend, RenderState, EventQueue) {
    let mut backend = RecordingBackend::new(height, width);
    let state = RenderState::prepare(&mut backend).unwrap();
    (backend, state, EventQueue::new())
}

pub fn screen(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}

pub fn numbered(rows: usize) -> Vec<String> {
    (0..rows).map(|i| format!("row {i}")).collect()
}

pub fn scroll_directives(backend: &RecordingBackend) -> Vec<&Directive> {
    backend
        .directives
        .iter()
        .filter(|d| matches!(d, Directive::Scroll { .. }))
        .collect()
}
