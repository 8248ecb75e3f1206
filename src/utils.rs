use crate::primitive::WORD_SIZE;
use alloy_primitives::hex;
use core::fmt;

/// Renders a buffer one 32-byte word per line, prefixed by its offset.
/// Used for trace output of encoded buffers.
pub struct Words<'a>(pub &'a [u8]);

impl fmt::Display for Words<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<empty>");
        }
        for (index, chunk) in self.0.chunks(WORD_SIZE).enumerate() {
            if index != 0 {
                f.write_str("\n")?;
            }
            write!(f, "{:04x}: {}", index * WORD_SIZE, hex::encode(chunk))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Words<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
