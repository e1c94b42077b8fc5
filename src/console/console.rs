/*
 * Console primitives for the interactive front-end: plain and colored line
 * output, and a line-buffered, quote-aware token reader over stdin.
 */
use owo_colors::OwoColorize;
use std::io::{self, BufRead};

pub struct Console {
    pending: String,
}

impl Console {
    pub fn new() -> Self {
        Console {
            pending: String::new(),
        }
    }

    pub fn print_line(&self, text: &str) {
        println!("{text}");
    }

    pub fn print_prompt(&self, text: &str) {
        println!("{}", text.green());
    }

    /*
     * Reads the next token from stdin. Tokens are separated by unquoted
     * spaces; a double quote toggles verbatim mode and is dropped from the
     * token, so paths with spaces can be entered as "like this". The unread
     * remainder of a line stays buffered, letting one input line feed
     * several reads. Returns `None` once stdin is closed.
     */
    pub fn read_token(&mut self, lower_case: bool) -> Option<String> {
        if self.pending.is_empty() {
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(error) => {
                    log::warn!("Console: Failed to read input: {error}");
                    return None;
                }
            }
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            self.pending = line;
        }

        let mut token = String::new();
        let mut in_string = false;
        let mut skip_space = true;
        let mut consumed = 0;

        for c in self.pending.chars() {
            consumed += c.len_utf8();
            if c == '"' {
                in_string = !in_string;
                skip_space = false;
            } else if !in_string && skip_space && c == ' ' {
                continue;
            } else if !in_string && c == ' ' {
                // The terminating space is consumed with the token.
                break;
            } else {
                token.push(c);
                skip_space = false;
            }
        }

        self.pending.drain(..consumed);

        if lower_case {
            token.make_ascii_lowercase();
        }
        Some(token)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
