use std::{
    cell::RefCell,
    fmt::Arguments,
    io::{self, Write},
    rc::Rc,
};

/// Sink for program output: `print` statements and REPL echoes.
pub trait Logger {
    fn print(&mut self, value: Arguments);
}

pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn print(&mut self, value: Arguments) {
        let mut stdout = io::stdout().lock();
        // a closed stdout (e.g. `slex script.lx | head`) is not a program error
        let _ = writeln!(stdout, "{value}").and_then(|_| stdout.flush());
    }
}

/// Keeps every printed line in memory. Clones share the same buffer, so one
/// copy can be handed to the interpreter while another is inspected.
#[derive(Clone, Default)]
pub struct MemoryLogger {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> MemoryLogger {
        MemoryLogger::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl Logger for MemoryLogger {
    fn print(&mut self, value: Arguments) {
        self.lines.borrow_mut().push(value.to_string());
    }
}
