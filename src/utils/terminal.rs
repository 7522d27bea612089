//! Terminal output sanitization
//!
//! Filenames and document content come from the backend, which in turn stores
//! whatever was uploaded or scraped. Escape sequences embedded in that text
//! could move the cursor, recolor the screen or retitle the terminal window, so
//! everything user-controlled goes through [`sanitize_for_display`] before it
//! is printed or rendered.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Removes terminal escape sequences and control characters from `text`.
///
/// Handles CSI sequences (`ESC [ ... final-byte`), OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ESC \`) and two-byte escapes. Tab, newline and
/// carriage return survive; every other control character is dropped.
///
/// # Examples
///
/// ```
/// use corpus_admin::utils::terminal::sanitize_for_display;
///
/// assert_eq!(sanitize_for_display("\x1b[31mlaw.txt\x1b[0m"), "law.txt");
/// assert_eq!(sanitize_for_display("\x1b]0;pwned\x07title"), "title");
/// ```
pub fn sanitize_for_display(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
            match chars.next() {
                // CSI: parameters and intermediates up to a final byte in @..~
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: terminated by BEL or ST (ESC \)
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // Two-byte escape, or a lone ESC at the end
                _ => {}
            }
            continue;
        }

        if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
            continue;
        }

        out.push(ch);
    }

    out
}
