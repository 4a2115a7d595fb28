//! Ring-addressed tape of integer cells

use std::fmt;

use crate::error::{Error, Result};

/// Memory of a running script.
///
/// The pointer always stays inside the tape: moves past either end wrap
/// around instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<i64>,
    pointer: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// A single zero cell. Scripts normally start with `Happy` to get more.
    pub fn new() -> Self {
        Tape {
            cells: vec![0],
            pointer: 0,
        }
    }

    /// Add `delta` to the current cell. A negative delta subtracts.
    pub fn add(&mut self, delta: i64) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(delta);
    }

    /// Value of the current cell
    pub fn value(&self) -> i64 {
        self.cells[self.pointer]
    }

    pub fn next(&mut self) {
        self.move_by(1);
    }

    pub fn previous(&mut self) {
        self.move_by(-1);
    }

    /// Move the pointer `n` cells, wrapping at both ends.
    pub fn move_by(&mut self, n: i64) {
        let len = self.cells.len() as i64;
        let target = self.pointer as i64 + n % len;

        self.pointer = target.rem_euclid(len) as usize;
    }

    /// Throw the current cells away and start over with `size` zero cells.
    pub fn reallocate(&mut self, size: usize) -> Result<()> {
        if size < 1 {
            return Err(Error::InvalidAllocation { size });
        }

        self.cells = vec![0; size];
        self.pointer = 0;

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false, a tape has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }
}

/// Renders `[0 >3< 0]` with the current cell marked.
impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if i == self.pointer {
                write!(f, ">{}<", cell)?;
            } else {
                write!(f, "{}", cell)?;
            }
        }
        write!(f, "]")
    }
}
