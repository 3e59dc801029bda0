//! oxrepl entrypoint: a minimal line-editing loop driving the console core.
//!
//! The loop is the "editor" side of the driver contract: after every event
//! it rebuilds the virtual screen and calls `refresh`; a `Scroll` event just
//! triggers the next refresh, a `Resize` re-prepares the session.

use anyhow::Result;
use clap::Parser;
use core_terminal::CrosstermBackend;
use oxrepl::{Console, Event, display_width};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, trace};
use tracing_appender::non_blocking::WorkerGuard;

const PROMPT: &str = ">>> ";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxrepl", version, about = "Line-editing console driver demo")]
struct Args {
    /// Log file path; filtering via RUST_LOG.
    #[arg(long = "log", default_value = "oxrepl.log")]
    log: PathBuf,
}

fn configure_logging(path: &Path) -> Option<WorkerGuard> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let name = path.file_name()?;
    let file_appender = tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // A global subscriber is already installed; drop the guard so the
        // writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Editable input line: characters plus a cursor index into them.
#[derive(Debug, Default)]
struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    fn take(&mut self) -> String {
        self.cursor = 0;
        self.chars.drain(..).collect()
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Display column of the cursor within the prompt line.
    fn column(&self) -> usize {
        let prefix: String = self.chars[..self.cursor].iter().collect();
        display_width(PROMPT) + display_width(&prefix)
    }
}

fn compose_screen(history: &[String], line: &LineBuffer) -> Vec<String> {
    let mut screen = Vec::with_capacity(history.len() + 1);
    screen.extend(history.iter().cloned());
    screen.push(format!("{PROMPT}{}", line.text()));
    screen
}

fn run(console: &mut Console<CrosstermBackend>) -> Result<()> {
    let mut history: Vec<String> = Vec::new();
    let mut line = LineBuffer::default();

    loop {
        let screen = compose_screen(&history, &line);
        let row = screen.len() - 1;
        console.refresh(screen, (line.column(), row))?;

        let Some(event) = console.next_event(true)? else {
            continue;
        };
        trace!(target: "runtime.loop", ?event, "event");

        match event {
            // The renderer asked for another refresh; the loop top does it.
            Event::Scroll => {}
            Event::Resize => console.prepare()?,
            Event::Key { data, .. } => match data.as_str() {
                "\n" => {
                    let entered = line.take();
                    if entered == "exit" {
                        break;
                    }
                    history.push(format!("{PROMPT}{entered}"));
                    history.push(format!("=> {entered}"));
                }
                "escape" => break,
                "backspace" => {
                    if !line.backspace() {
                        console.beep()?;
                    }
                }
                "delete" => {
                    if !line.delete() {
                        console.beep()?;
                    }
                }
                "left" => line.cursor = line.cursor.saturating_sub(1),
                "right" => line.cursor = (line.cursor + 1).min(line.chars.len()),
                "home" => line.cursor = 0,
                "end" => line.cursor = line.chars.len(),
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) if !ch.is_control() => line.insert(ch),
                        // Unbound symbolic keys and control characters.
                        _ => console.beep()?,
                    }
                }
            },
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = configure_logging(&args.log);
    install_panic_hook();
    info!(target: "runtime", "startup");

    let mut console = Console::new(CrosstermBackend::new());
    console.prepare()?;
    let result = run(&mut console);
    console.finish()?;
    info!(target: "runtime", ok = result.is_ok(), "shutdown");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_buffer_edits_around_cursor() {
        let mut line = LineBuffer::default();
        for ch in "abc".chars() {
            line.insert(ch);
        }
        line.cursor = 1;
        line.insert('X');
        assert_eq!(line.text(), "aXbc");
        assert!(line.backspace());
        assert_eq!(line.text(), "abc");
        assert!(line.delete());
        assert_eq!(line.text(), "ac");
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut line = LineBuffer::default();
        line.insert('日');
        line.insert('x');
        assert_eq!(line.column(), display_width(PROMPT) + 3);
    }

    #[test]
    fn compose_screen_keeps_prompt_on_last_row() {
        let history = vec![">>> 1".to_string(), "=> 1".to_string()];
        let mut line = LineBuffer::default();
        line.insert('2');
        let screen = compose_screen(&history, &line);
        assert_eq!(screen.len(), 3);
        assert_eq!(screen[2], ">>> 2");
    }
}
