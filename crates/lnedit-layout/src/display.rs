#![forbid(unsafe_code)]

//! How buffer characters are drawn.
//!
//! Printable characters occupy one column each. Control characters would move
//! the terminal cursor behind the layout's back, so they are drawn as visible
//! escapes instead:
//!
//! | Input | Drawn as |
//! |-------|----------|
//! | `0x00..=0x1F` | `^@` .. `^_` (so `\t` is `^I`) |
//! | `0x7F` | `^?` |
//! | other control (`0x80..=0x9F`) | `\u0085` style, 6 columns |

/// Whether `ch` is drawn as an escape rather than as itself.
#[inline]
#[must_use]
pub fn needs_escape(ch: char) -> bool {
    ch.is_control()
}

/// Feed the on-screen cells of `ch` to `emit`, left to right.
pub fn render_char(ch: char, mut emit: impl FnMut(char)) {
    match ch {
        '\0'..='\x1f' => {
            emit('^');
            emit(char::from(ch as u8 + 0x40));
        }
        '\x7f' => {
            emit('^');
            emit('?');
        }
        c if c.is_control() => {
            for cell in format!("\\u{:04x}", u32::from(c)).chars() {
                emit(cell);
            }
        }
        c => emit(c),
    }
}
