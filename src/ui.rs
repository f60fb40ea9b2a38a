//! Prompt and notification surfaces.
//!
//! Events reach the engine one at a time, so prompts return their answer
//! directly instead of taking a callback.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Ui {
    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str) -> bool;

    /// Collect one line of free text. `None` means the prompt was dismissed.
    fn input(&self, prompt: &str, placeholder: &str) -> Option<String>;

    /// Show a transient message.
    fn notice(&self, message: &str);
}

/// Terminal implementation: prompts on stderr, answers from stdin.
#[derive(Debug, Default, Clone)]
pub struct TerminalUi {
    /// Answer every confirmation with this value instead of asking.
    pub assume: Option<bool>,
}

impl TerminalUi {
    fn read_line() -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Ui for TerminalUi {
    fn confirm(&self, prompt: &str) -> bool {
        if let Some(answer) = self.assume {
            return answer;
        }
        eprint!("{} [y/N] ", prompt);
        let _ = io::stderr().flush();
        Self::read_line().is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
    }

    fn input(&self, prompt: &str, placeholder: &str) -> Option<String> {
        eprintln!("{}", placeholder);
        eprint!("{}: ", prompt);
        let _ = io::stderr().flush();
        Self::read_line()
    }

    fn notice(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Replays queued answers and records every notice and prompt.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    confirms: RefCell<VecDeque<bool>>,
    inputs: RefCell<VecDeque<Option<String>>>,
    prompts: RefCell<Vec<String>>,
    notices: RefCell<Vec<String>>,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next `confirm`. Unqueued confirmations answer `false`.
    pub fn answer_confirm(&self, answer: bool) -> &Self {
        self.confirms.borrow_mut().push_back(answer);
        self
    }

    /// Queue an answer for the next `input`. Unqueued inputs are dismissed.
    pub fn answer_input(&self, answer: Option<&str>) -> &Self {
        self.inputs
            .borrow_mut()
            .push_back(answer.map(str::to_string));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }
}

impl Ui for ScriptedUi {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirms.borrow_mut().pop_front().unwrap_or(false)
    }

    fn input(&self, prompt: &str, _placeholder: &str) -> Option<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.inputs.borrow_mut().pop_front().flatten()
    }

    fn notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}
