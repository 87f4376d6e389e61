//! # Character Display
//!
//! A 2×16 character LCD modelled as a flat 32-cell text buffer addressed by
//! absolute position (0–15 = line 1, 16–31 = line 2). Writes never run past
//! the end of the buffer; they are truncated and, where room remains,
//! terminated with a NUL cell that the panel driver treats as end-of-line.
//!
//! The panel driver itself lives outside this crate behind [`LcdPanel`].

use core::fmt::{self, Write};

use heapless::String;

use crate::config::{DISPLAY_CAPACITY, DISPLAY_COLUMNS, DISPLAY_LINES};
use crate::error::{Error, Result};
use crate::identity::IpAddress;

/// Cell value marking the end of the text on a line.
pub const TERMINATOR: u8 = 0;

/// Copy a NUL-terminated string into `dst`, `strlcpy`-style.
///
/// `src` ends at its first NUL or at its end, whichever comes first. At most
/// `dst.len() - 1` bytes are copied and the result is always terminated
/// inside `dst` (unless `dst` is empty). Returns the length of `src`, so a
/// return value `>= dst.len()` means the copy was truncated.
pub fn truncating_copy(dst: &mut [u8], src: &[u8]) -> usize {
    let len = src.iter().position(|&b| b == TERMINATOR).unwrap_or(src.len());
    if let Some(room) = dst.len().checked_sub(1) {
        let copied = len.min(room);
        dst[..copied].copy_from_slice(&src[..copied]);
        dst[copied] = TERMINATOR;
    }
    len
}

// ---------------------------------------------------------------------------
// Text buffer
// ---------------------------------------------------------------------------

/// Backing text for the two display lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    cells: [u8; DISPLAY_CAPACITY],
}

impl DisplayBuffer {
    pub const fn new() -> Self {
        Self {
            cells: [b' '; DISPLAY_CAPACITY],
        }
    }

    pub fn as_bytes(&self) -> &[u8; DISPLAY_CAPACITY] {
        &self.cells
    }

    /// Blank both lines.
    pub fn clear(&mut self) {
        self.cells = [b' '; DISPLAY_CAPACITY];
    }

    /// Copy `text` in starting at `position`, truncating at the end of the
    /// buffer and reserving a cell for the terminator. Returns the untruncated
    /// text length.
    pub fn write_text(&mut self, position: usize, text: &str) -> Result<usize> {
        let cells = self.cells_from(position)?;
        Ok(truncating_copy(cells, text.as_bytes()))
    }

    /// Render `address` in dotted decimal starting at `position`.
    ///
    /// Characters fill up to the last cell of the buffer; a terminator is
    /// written only if a cell is left after the text. Returns the number of
    /// characters stored.
    pub fn write_address(&mut self, position: usize, address: IpAddress) -> Result<usize> {
        let mut cursor = Cursor::new(self.cells_from(position)?);
        // Cursor never reports an error; overflow is dropped.
        let _ = write!(cursor, "{address}");
        Ok(cursor.terminate())
    }

    /// Text on `line` (0-based) up to its terminator.
    pub fn line(&self, line: usize) -> &[u8] {
        if line >= DISPLAY_LINES {
            return &[];
        }
        let start = line * DISPLAY_COLUMNS;
        let cells = &self.cells[start..start + DISPLAY_COLUMNS];
        let end = cells.iter().position(|&c| c == TERMINATOR).unwrap_or(cells.len());
        &cells[..end]
    }

    fn cells_from(&mut self, position: usize) -> Result<&mut [u8]> {
        self.cells
            .get_mut(position..)
            .filter(|cells| !cells.is_empty())
            .ok_or(Error::position_out_of_range(position))
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// `fmt::Write` sink over a cell slice that silently drops overflow.
struct Cursor<'a> {
    cells: &'a mut [u8],
    len: usize,
}

impl<'a> Cursor<'a> {
    fn new(cells: &'a mut [u8]) -> Self {
        Self { cells, len: 0 }
    }

    /// Terminate if room is left; return the number of cells written.
    fn terminate(self) -> usize {
        if let Some(cell) = self.cells.get_mut(self.len) {
            *cell = TERMINATOR;
        }
        self.len
    }
}

impl Write for Cursor<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.cells.len() - self.len;
        let n = s.len().min(room);
        self.cells[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Panel + display
// ---------------------------------------------------------------------------

/// Physical character panel driver.
pub trait LcdPanel {
    /// Push the whole buffer to the device.
    fn refresh(&mut self, buffer: &DisplayBuffer);
}

impl<P: LcdPanel + ?Sized> LcdPanel for &mut P {
    fn refresh(&mut self, buffer: &DisplayBuffer) {
        (**self).refresh(buffer)
    }
}

/// Text buffer bound to a panel.
///
/// `write_*` only touch the buffer; nothing reaches the panel until
/// [`refresh`](Self::refresh). The `show_*` helpers write and refresh in one
/// call and are meant for bring-up and debug output.
pub struct CharDisplay<P: LcdPanel> {
    buffer: DisplayBuffer,
    panel: P,
}

impl<P: LcdPanel> CharDisplay<P> {
    pub const fn new(panel: P) -> Self {
        Self {
            buffer: DisplayBuffer::new(),
            panel,
        }
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn write_text(&mut self, position: usize, text: &str) -> Result<usize> {
        self.buffer.write_text(position, text)
    }

    pub fn write_address(&mut self, position: usize, address: IpAddress) -> Result<usize> {
        self.buffer.write_address(position, address)
    }

    pub fn refresh(&mut self) {
        self.panel.refresh(&self.buffer);
    }

    /// Write `text` at `position` and refresh.
    pub fn show_text(&mut self, position: usize, text: &str) -> Result<usize> {
        let len = self.write_text(position, text)?;
        self.refresh();
        Ok(len)
    }

    /// Write `value` in decimal at `position` and refresh.
    pub fn show_number(&mut self, position: usize, value: u16) -> Result<usize> {
        let mut digits: String<5> = String::new();
        // u16::MAX has five digits, so this always fits.
        let _ = write!(digits, "{value}");
        let mut cursor = Cursor::new(self.buffer.cells_from(position)?);
        let _ = cursor.write_str(&digits);
        let len = cursor.terminate();
        self.refresh();
        Ok(len)
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
