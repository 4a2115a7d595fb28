//! Decoded representation of a single line

use crate::{
    error::{Error, Result},
    lexer,
    token::{Keyword, KEYWORDS},
};

/// Primary effect of a line. Operands are the lengths of the text trailing
/// the keyword.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Command {
    /// Empty line
    Nop,
    /// Replace the tape with `n` zero cells
    Reallocate(usize),
    /// Repeat the next line while the current cell is non-zero
    Repeat,
    /// Add `n` to the current cell
    Add(usize),
    /// Subtract `n` from the current cell
    Subtract(usize),
    /// Move the pointer `n` cells forward
    Move(usize),
    /// Emit the current cell, then move `n` cells forward
    EmitForward(usize),
    /// Emit the current cell, then move `n` cells backward
    EmitBackward(usize),
    /// Jump forward to the next `But` line if the current cell is below `n`
    Skip(usize),
    /// Jump back to the previous `We` line if the current cell is above `n`
    Loop(usize),
    /// Dump the tape after every instruction from here on
    Debug,
}

/// Secondary effect selected by the punctuation that ends a line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Terminator {
    None,
    /// `?`: read a line of input, add its length, move to the next cell
    Input,
    /// `!`
    Next,
    /// `;`
    Previous,
    /// `,`
    Increment,
    /// `.`
    Decrement,
}

/// One decoded line. Instructions are decoded every time a line is reached
/// and dropped once executed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Instruction {
    /// 0-based index of the source line
    pub line: usize,
    pub command: Command,
    pub terminator: Terminator,
}

impl Instruction {
    pub fn nop(line: usize) -> Self {
        Instruction {
            line,
            command: Command::Nop,
            terminator: Terminator::None,
        }
    }
}

impl Keyword {
    fn command(self, operand: usize) -> Command {
        match self {
            Keyword::Happy => Command::Reallocate(operand),
            Keyword::ShouldAuldAcquaintance => Command::Repeat,
            Keyword::Well => Command::Add(operand),
            Keyword::And => Command::Subtract(operand),
            Keyword::Frae => Command::Move(operand),
            Keyword::SinAuldLangSyne => Command::EmitForward(operand),
            Keyword::ForAuldLangSyne => Command::EmitBackward(operand),
            Keyword::We => Command::Skip(operand),
            Keyword::But => Command::Loop(operand),
            Keyword::Kevlin => Command::Debug,
        }
    }
}

/// Decode the source line at index `line`.
pub fn decode(line: usize, text: &str) -> Result<Instruction> {
    if text.is_empty() {
        return Ok(Instruction::nop(line));
    }

    let (command_text, terminator) = lexer::split_terminator(text);

    let command = KEYWORDS
        .iter()
        .find_map(|keyword| {
            lexer::operand(keyword.phrase(), command_text).map(|n| keyword.command(n))
        })
        .ok_or_else(|| Error::Syntax {
            line: line + 1,
            text: command_text.to_string(),
        })?;

    Ok(Instruction {
        line,
        command,
        terminator,
    })
}
