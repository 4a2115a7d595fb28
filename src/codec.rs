//! Translation between cell values and the outside world

use std::{
    fmt,
    io::{self, BufRead, BufReader, Write},
};

use crate::error::Result;

/// Cell values are reduced into `0..MODULUS` before they are rendered.
pub const MODULUS: u64 = 127;

/// Control codes that are rendered as themselves.
const PRINTABLE_CONTROLS: [u8; 4] = [0, b'\t', b'\n', 0x0F];

/// Render a cell value.
///
/// `|value| mod 127` is emitted as the character with that code when it is
/// printable (32 and up) or one of a few whitelisted control codes, and as a
/// bracketed decimal such as `[5]` otherwise.
pub fn encode(value: i64) -> String {
    let code = (value.unsigned_abs() % MODULUS) as u8;

    if code >= 32 || PRINTABLE_CONTROLS.contains(&code) {
        char::from(code).to_string()
    } else {
        format!("[{}]", code)
    }
}

/// Output buffer of a script, printed by the driver once the run is over.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Output {
    buffer: String,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the rendering of `value`
    pub fn emit(&mut self, value: i64) {
        self.buffer.push_str(&encode(value));
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

/// Interactive input source.
///
/// Each read writes the prompt to `prompt` and consumes one line from
/// `reader`.
pub struct Console<'a> {
    reader: Box<dyn BufRead + 'a>,
    prompt: Box<dyn Write + 'a>,
    prompt_text: String,
}

impl<'a> Console<'a> {
    pub const DEFAULT_PROMPT: &'static str = "> ";

    pub fn new(reader: impl BufRead + 'a, prompt: impl Write + 'a) -> Self {
        Console {
            reader: Box::new(reader),
            prompt: Box::new(prompt),
            prompt_text: Self::DEFAULT_PROMPT.to_string(),
        }
    }

    /// Read from stdin, prompt on stdout.
    pub fn stdio() -> Console<'static> {
        Console::new(BufReader::new(io::stdin()), io::stdout())
    }

    pub fn with_prompt(mut self, prompt_text: impl Into<String>) -> Self {
        self.prompt_text = prompt_text.into();
        self
    }

    /// Read one line and return its length in characters.
    ///
    /// The line ending is not counted. End of input reads as an empty line.
    /// Bytes that are not UTF-8 count as one replacement character each.
    pub fn read_operand(&mut self) -> Result<usize> {
        self.prompt.write_all(self.prompt_text.as_bytes())?;
        self.prompt.flush()?;

        let mut line = Vec::new();
        self.reader.read_until(b'\n', &mut line)?;

        let bytes = line
            .strip_suffix(b"\r\n")
            .or_else(|| line.strip_suffix(b"\n"))
            .unwrap_or(line.as_slice());

        Ok(String::from_utf8_lossy(bytes).chars().count())
    }
}

impl fmt::Debug for Console<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("prompt_text", &self.prompt_text)
            .finish_non_exhaustive()
    }
}
