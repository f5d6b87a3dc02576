//! Statement splitter
//!
//! Cuts a SQL script into individual statements at `;` boundaries that are
//! outside quoted text and comments. Understands:
//!
//! - `'text'` with `''` escapes
//! - `"identifier"` and `` `identifier` `` with doubled-quote escapes
//! - `[identifier]`
//! - `-- line` and `/* block */` comments
//!
//! Comments are dropped from the output. Chunks with no code (blank or
//! comment-only) produce no statement. A trailing statement without `;` is
//! kept.

use std::iter::Peekable;
use std::str::Chars;

/// Split a script into statements, each ending in `;` unless it was the
/// unterminated tail of the script
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                current.push(c);
                has_code = true;
                copy_through(&mut chars, &mut current, c);
            }
            '[' => {
                current.push(c);
                has_code = true;
                copy_through(&mut chars, &mut current, ']');
            }
            '-' if chars.peek() == Some(&'-') => {
                // Keep the newline so tokens on either side stay apart
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                current.push(' ');
            }
            ';' => {
                current.push(';');
                flush(&mut statements, &mut current, &mut has_code);
            }
            c => {
                if !c.is_whitespace() {
                    has_code = true;
                }
                current.push(c);
            }
        }
    }
    flush(&mut statements, &mut current, &mut has_code);
    statements
}

/// Copy characters up to and including `close`
fn copy_through(chars: &mut Peekable<Chars<'_>>, out: &mut String, close: char) {
    for c in chars.by_ref() {
        out.push(c);
        if c == close {
            break;
        }
    }
}

fn flush(statements: &mut Vec<String>, current: &mut String, has_code: &mut bool) {
    if *has_code {
        statements.push(current.trim().to_string());
    }
    current.clear();
    *has_code = false;
}
