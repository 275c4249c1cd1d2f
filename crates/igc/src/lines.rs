//! Line splitting for IGC input.
//!
//! IGC files are nominally CRLF-terminated ASCII, but real recorders emit
//! bare LF, doubled CRs and unterminated final lines. [`Lines`] normalises
//! all of these without merging, dropping or reordering lines.

use std::io::BufRead;

/// One numbered line of input, with line terminators removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// One-based line number.
    pub number: usize,
    /// Raw bytes of the line.
    pub bytes: Vec<u8>,
}

impl Line {
    /// Check if the line has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Iterator over the numbered lines of a buffered reader.
#[derive(Debug)]
pub struct Lines<R> {
    reader: R,
    number: usize,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            number: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = std::io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut bytes = Vec::new();
        match self.reader.read_until(b'\n', &mut bytes) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if bytes.last() == Some(&b'\n') {
                    bytes.pop();
                }
                trim_carriage_returns(&mut bytes);
                self.number += 1;
                Some(Ok(Line {
                    number: self.number,
                    bytes,
                }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn trim_carriage_returns(bytes: &mut Vec<u8>) {
    while bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
}
