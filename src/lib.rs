//! Auld is a line-oriented toy language whose instructions are phrases of
//! *Auld Lang Syne*.
//!
//! # Example
//!
//! ```text
//! Happy new year
//! We'll tak a cup o' kindness yet for auld lang syne, my jo, for auld lang
//! Sin auld lang syne
//! ```
//!
//! prints `B`: the `We'll` line adds 66, the length of its trailing text.
//!
//! The script runs over a ring of integer cells (the tape). Every line is
//! decoded when it is reached: an opening phrase selects the command and the
//! last character of the line may add a terminator. Numbers are never
//! written as digits. The operand of a command is the number of characters
//! that follow the phrase and its separating space, so `And four` subtracts 4.
//!
//! # Commands
//!
//! | Phrase                             | Effect |
//! |------------------------------------|--------|
//! | Happy _n_                          | Replace the tape with `n` zero cells and reset the pointer. `n` must be at least 1. |
//! | Should auld acquaintance be forgot | Repeat the next line while the current cell is non-zero. The line runs once more after the loop. |
//! | We'll _n_                          | Add `n` to the current cell. |
//! | And _n_                            | Subtract `n` from the current cell. |
//! | Frae _n_                           | Move the pointer `n` cells forward. |
//! | Sin auld lang syne _n_             | Print the current cell, then move `n` cells forward. |
//! | For auld lang syne _n_             | Print the current cell, then move `n` cells backward. |
//! | We _n_                             | If the current cell is below `n`, jump forward to the next line starting with `But`, or end the script. |
//! | But _n_                            | If the current cell is above `n`, jump back to the previous line starting with `We`. |
//! | Kevlin                             | Log the tape after every following instruction. |
//!
//! Phrases are matched in this order, ignoring case and treating commas as
//! spaces. Empty lines do nothing. Any other line is a syntax error.
//!
//! # Terminators
//!
//! | Suffix | Effect |
//! |--------|--------|
//! | `?`    | Read a line of input, add its length to the current cell and move to the next cell. |
//! | `!`    | Move to the next cell. |
//! | `;`    | Move to the previous cell. |
//! | `,`    | Add 1 to the current cell. |
//! | `.`    | Subtract 1 from the current cell. |
//!
//! # Output
//!
//! Printed cells are reduced to `|value| mod 127`. Codes 32 and up, as well
//! as 0, 9, 10 and 15, are printed as characters. Anything else is printed
//! as a bracketed number such as `[5]`.
//!
//! # Important notes
//!
//! - Moving past either end of the tape wraps around.
//! - A backward jump never lands on the first line of a script.
//! - Output is collected by the script and handed over once it ends.

pub mod codec;
pub mod error;
pub mod instruction;
mod lexer;
pub mod tape;
pub mod token;
pub mod vm;

pub use error::{Error, Result};
pub use vm::Script;
