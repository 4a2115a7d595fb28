//! Fetch-decode-execute loop of an Auld script

use tracing::{debug, info, trace};

use crate::{
    codec::{Console, Output},
    error::Result,
    instruction::{decode, Command, Instruction, Terminator},
    tape::Tape,
    token::{BACKWARD_TARGET, FORWARD_TARGET},
};

/// Lowest line a backward branch may land on. Line 0 is never a target.
const BACKWARD_SCAN_FLOOR: usize = 1;

/// A loaded script together with the state of its run.
pub struct Script<'a> {
    lines: Vec<&'a str>,
    pc: usize, // line to decode next, `lines.len()` once halted
    tape: Tape,
    output: Output,
    console: Console<'a>,
    repeats: Vec<Instruction>, // repeat lines whose body is still looping, innermost last
    debug: bool,               // dump the tape after every instruction
}

impl<'a> Script<'a> {
    /// Split `program` into lines. An empty program is a single empty line.
    pub fn load(program: &'a str) -> Self {
        Script {
            lines: program.split('\n').collect(),
            pc: 0,
            tape: Tape::new(),
            output: Output::new(),
            console: Console::stdio(),
            repeats: Vec::new(),
            debug: false,
        }
    }

    /// Read `?` operands from `console` instead of stdin.
    pub fn with_console(mut self, console: Console<'a>) -> Self {
        self.console = console;
        self
    }

    /// Start the run with tape dumps switched on, as if the first line was
    /// `Kevlin`.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Run until the line pointer falls off the end of the script.
    ///
    /// The output collected so far stays available through `output` when
    /// the run fails.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? {}

        debug!(tape = %self.tape, "script finished");
        Ok(())
    }

    /// Decode and execute the next line: the body of the innermost active
    /// repeat, or else the line under the line pointer. Returns `false` once
    /// the script has halted.
    pub fn step(&mut self) -> Result<bool> {
        if let Some(&repeat) = self.repeats.last() {
            self.repeat_step(repeat)?;
            return Ok(true);
        }

        if self.is_halted() {
            return Ok(false);
        }

        let instruction = self.fetch(self.pc)?;
        self.pc += 1;
        self.execute(&instruction)?;

        Ok(true)
    }

    pub fn is_halted(&self) -> bool {
        self.repeats.is_empty() && self.pc >= self.lines.len()
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    pub fn into_output(self) -> String {
        self.output.into_string()
    }

    fn fetch(&self, line: usize) -> Result<Instruction> {
        let text = self.lines[line];
        trace!(line = line + 1, text, "decode");

        decode(line, text)
    }

    /// Run the command of `instruction`, then its terminator.
    ///
    /// A repeat whose body has to loop only gets pushed here. Its body passes
    /// and its terminator are run by later steps.
    fn execute(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction.command {
            Command::Nop => {}
            Command::Reallocate(size) => {
                self.tape.reallocate(size)?;
                debug!(size, "tape reallocated");
            }
            Command::Repeat => {
                if self.enter_repeat(instruction) {
                    return Ok(());
                }
            }
            Command::Add(n) => self.tape.add(n as i64),
            Command::Subtract(n) => self.tape.add(-(n as i64)),
            Command::Move(n) => self.tape.move_by(n as i64),
            Command::EmitForward(n) => {
                self.output.emit(self.tape.value());
                self.tape.move_by(n as i64);
            }
            Command::EmitBackward(n) => {
                self.output.emit(self.tape.value());
                self.tape.move_by(-(n as i64));
            }
            Command::Skip(n) => self.skip(instruction.line, n),
            Command::Loop(n) => self.jump_back(instruction.line, n),
            Command::Debug => self.debug = true,
        }

        self.finish(instruction)
    }

    /// Terminator and tape dump, the tail of every executed instruction.
    fn finish(&mut self, instruction: &Instruction) -> Result<()> {
        self.terminate(instruction)?;
        self.dump(instruction.line);

        Ok(())
    }

    /// Run only the terminator of `instruction`.
    fn terminate(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction.terminator {
            Terminator::None => {}
            Terminator::Input => {
                let operand = self.console.read_operand()?;
                self.tape.add(operand as i64);
                self.tape.next();
            }
            Terminator::Next => self.tape.next(),
            Terminator::Previous => self.tape.previous(),
            Terminator::Increment => self.tape.add(1),
            Terminator::Decrement => self.tape.add(-1),
        }

        Ok(())
    }

    /// Start repeating the line after `repeat` while the current cell is
    /// non-zero. Returns `true` when the repeat was pushed and has to be
    /// serviced by `step`.
    ///
    /// Without a body line the repeat does nothing. With a zero cell the
    /// line pointer already sits on the body, so it runs once from the fetch
    /// loop.
    fn enter_repeat(&mut self, repeat: &Instruction) -> bool {
        let body = repeat.line + 1;
        if body >= self.lines.len() {
            return false;
        }

        self.pc = body;
        if self.tape.value() == 0 {
            return false;
        }

        debug!(line = repeat.line + 1, value = self.tape.value(), "repeat");
        self.repeats.push(*repeat);
        true
    }

    /// One pass of the innermost repeat.
    ///
    /// This is the one place a line is decoded out of the normal fetch
    /// order. The line pointer is pinned to the body for every pass and
    /// again once the cell reaches zero, so the fetch loop executes the body
    /// once more after the repeat is done. A body that is itself a repeat
    /// pushes another level instead of nesting calls.
    fn repeat_step(&mut self, repeat: Instruction) -> Result<()> {
        let body = repeat.line + 1;
        self.pc = body;

        if self.tape.value() != 0 {
            let instruction = self.fetch(body)?;
            return self.execute(&instruction);
        }

        self.repeats.pop();
        debug!(line = repeat.line + 1, "repeat done");
        self.finish(&repeat)
    }

    /// Jump forward to the next `But` line unless the current cell is at
    /// least `limit`. Without one the script ends.
    fn skip(&mut self, line: usize, limit: usize) {
        if self.tape.value() >= limit as i64 {
            return;
        }

        self.pc = (line + 1..self.lines.len())
            .find(|&i| self.lines[i].starts_with(FORWARD_TARGET))
            .unwrap_or(self.lines.len());

        debug!(from = line + 1, to = self.pc + 1, "skip");
    }

    /// Jump back to the previous `We` line while the current cell is above
    /// `limit`. Without one the jump does nothing.
    fn jump_back(&mut self, line: usize, limit: usize) {
        if self.tape.value() <= limit as i64 {
            return;
        }

        if let Some(target) = (BACKWARD_SCAN_FLOOR..line)
            .rev()
            .find(|&i| self.lines[i].starts_with(BACKWARD_TARGET))
        {
            self.pc = target;
            debug!(from = line + 1, to = target + 1, "jump back");
        }
    }

    fn dump(&self, line: usize) {
        if self.debug {
            info!(line = line + 1, tape = %self.tape);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::{
        io::{self, Cursor},
        sync::{Arc, Mutex},
    };

    fn load<'a>(program: &'a str, input: &'a str) -> Script<'a> {
        Script::load(program).with_console(Console::new(Cursor::new(input), io::sink()))
    }

    fn run(program: &str) -> Script<'_> {
        let mut script = load(program, "");
        script.run().unwrap();
        script
    }

    #[test]
    fn empty_program() {
        let script = run("");
        assert!(script.is_halted());
        assert_eq!(script.lines, vec![""]);
        assert_eq!(script.output(), "");
    }

    #[test]
    fn reallocate() {
        let script = run("Happy four");
        assert_eq!(script.tape().cells(), &[0, 0, 0, 0]);
        assert_eq!(script.tape().pointer(), 0);
        assert_eq!(script.output(), "");
    }

    #[test]
    fn invalid_allocation() {
        let mut script = load("We'll x\nHappy", "");
        match script.run() {
            Err(Error::InvalidAllocation { size }) => assert_eq!(size, 0),
            other => panic!("expected invalid allocation, got {:?}", other),
        }
        // The failed allocation keeps the old tape.
        assert_eq!(script.tape().cells(), &[1]);
    }

    #[test]
    fn add_and_emit() {
        let script = run("Happy xx\nWe'll x\nSin auld lang syne x");
        assert_eq!(script.tape().cells(), &[1, 0]);
        assert_eq!(script.tape().pointer(), 1);
        assert_eq!(script.output(), "[1]");
    }

    #[test]
    fn emit_backward() {
        let program = "Happy xxx\nWe'll 72 characters makes an H in the output, see if you can count them please\nFor auld lang syne x";
        let script = run(program);
        assert_eq!(script.tape().value(), 0);
        assert_eq!(script.tape().pointer(), 2);
        assert_eq!(script.output(), "H");
    }

    #[test]
    fn arithmetic_and_moves() {
        let script = run("Happy xxx\nWe'll xxxxx\nAnd xx\nFrae xxxx\nAnd x");
        assert_eq!(script.tape().cells(), &[3, -1, 0]);
        assert_eq!(script.tape().pointer(), 1);
    }

    #[test]
    fn terminators() {
        let script = run("Happy xxx\nWe'll x,\nAnd x!\nAnd xxx.\nWe'll;");
        // cell 0: 1 + 1 - 1 = 1, cell 1: -3 - 1 = -4, then back to cell 0
        assert_eq!(script.tape().cells(), &[1, -4, 0]);
        assert_eq!(script.tape().pointer(), 0);
    }

    #[test]
    fn input_terminator() {
        let mut script = load("Happy xx\nWe'll x?\nWe'll?", "four\nsix!!!\n");
        script.run().unwrap();
        assert_eq!(script.tape().cells(), &[5, 6]);
        assert_eq!(script.tape().pointer(), 0);
    }

    #[test]
    fn input_that_is_not_utf8() {
        let console = Console::new(Cursor::new(&b"\xff\xfe\n"[..]), io::sink());
        let mut script = Script::load("We'll?").with_console(console);
        script.run().unwrap();
        assert_eq!(script.tape().value(), 2);
    }

    #[test]
    fn syntax_error_names_line() {
        let mut script = load("Auld lang syne", "");
        match script.run() {
            Err(Error::Syntax { line, text }) => {
                assert_eq!(line, 1);
                assert_eq!(text, "Auld lang syne");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn syntax_error_keeps_output() {
        let mut script = load("We'll xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx\nSin auld lang syne\n\nnonsense", "");
        assert!(matches!(
            script.run(),
            Err(Error::Syntax { line: 4, .. })
        ));
        assert_eq!(script.output(), "!");
    }

    #[test]
    fn unreached_lines_are_not_decoded() {
        let script = run("We x\nnonsense");
        assert!(script.is_halted());
    }

    #[test]
    fn skip_without_target_ends_script() {
        let mut script = load("We x\nWe'll x\nSin auld lang syne", "");
        assert!(script.step().unwrap());
        assert!(script.is_halted());
        assert!(!script.step().unwrap());
        assert_eq!(script.tape().value(), 0);
        assert_eq!(script.output(), "");
    }

    #[test]
    fn skip_lands_on_but_line() {
        let mut script = load("We x\nWe'll x\nBut x\nWe'll xx", "");
        script.step().unwrap();
        assert_eq!(script.pc(), 2);
        script.run().unwrap();
        // `But x` falls through since the cell is 0.
        assert_eq!(script.tape().value(), 2);
    }

    #[test]
    fn skip_falls_through() {
        let script = run("We'll x\nWe x\nWe'll xx");
        assert_eq!(script.tape().value(), 3);
    }

    #[test]
    fn paired_branch_loop() {
        // Counts the first cell down from 3, adding 1 to the second cell per
        // pass. `But` jumps back over the body while the first cell is above 0.
        let program = "Happy xx\nWe'll xxx\nWe x\nAnd x!\nFrae,\nFrae;\nBut\nSin auld lang syne";
        let script = run(program);
        assert_eq!(script.tape().cells(), &[0, 3]);
        assert_eq!(script.output(), "\0");
    }

    #[test]
    fn jump_back_never_targets_first_line() {
        let script = run("We\nFrae,\nBut");
        assert!(script.is_halted());
        assert_eq!(script.tape().value(), 1);
    }

    #[test]
    fn jump_back_without_target() {
        let mut script = load("\nFrae,\nFrae,\nBut x\nAnd x", "");
        for _ in 0..4 {
            script.step().unwrap();
        }
        assert_eq!(script.pc(), 4);
        script.run().unwrap();
        assert_eq!(script.tape().value(), 1);
    }

    #[test]
    fn jump_back_matches_raw_prefix() {
        // `We'll` also starts with `We`, so it is a valid target.
        let mut script = load("\nWe'll x\nWe'll x\nBut x", "");
        for _ in 0..4 {
            script.step().unwrap();
        }
        assert_eq!(script.pc(), 2);
    }

    #[test]
    fn repeat_runs_body_once_more() {
        let program = "We'll xxx\nShould auld acquaintance be forgot\nAnd x";
        let script = run(program);
        // Three passes inside the repeat, one more from the fetch loop.
        assert_eq!(script.tape().value(), -1);
    }

    #[test]
    fn repeat_leaves_pc_on_body() {
        let mut script = load("We'll xx\nShould auld acquaintance be forgot\nAnd x\nWe'll xxxx", "");
        script.step().unwrap();
        script.step().unwrap();
        assert_eq!(script.repeats.len(), 1);
        while !script.repeats.is_empty() {
            script.step().unwrap();
        }
        assert_eq!(script.pc(), 2);
        assert_eq!(script.tape().value(), 0);
        script.run().unwrap();
        assert_eq!(script.tape().value(), 3);
    }

    #[test]
    fn repeat_with_zero_cell() {
        let script = run("Should auld acquaintance be forgot\nWe'll x");
        assert_eq!(script.tape().value(), 1);
    }

    #[test]
    fn repeat_without_body() {
        let script = run("We'll x\nShould auld acquaintance be forgot");
        assert!(script.is_halted());
        assert_eq!(script.tape().value(), 1);
    }

    #[test]
    fn repeat_with_terminators() {
        // Walks right until the pointer reaches a zero cell, then the extra
        // pass steps past it.
        let program = "Happy xxx\nWe'll x!\nWe'll x;\nShould auld acquaintance be forgot\nFrae!";
        let script = run(program);
        assert_eq!(script.tape().cells(), &[1, 1, 0]);
        assert_eq!(script.tape().pointer(), 0);
    }

    #[test]
    fn nested_repeats() {
        // The inner repeat counts cell 0 down, then its `!` moves to the
        // empty cell 1, which ends the outer repeat. Both repeat lines and
        // the body then run once more from the fetch loop.
        let program = "Happy xx\nWe'll xx\nShould auld acquaintance be forgot\nShould auld acquaintance be forgot!\nAnd x";
        let script = run(program);
        assert!(script.is_halted());
        assert!(script.repeats.is_empty());
        assert_eq!(script.tape().cells(), &[-1, 0]);
        assert_eq!(script.tape().pointer(), 0);
    }

    #[test]
    fn deep_repeat_chain() {
        let mut program = String::from("We'll x\n");
        for _ in 0..100_000 {
            program.push_str("Should auld acquaintance be forgot\n");
        }
        program.push_str("And x");

        let script = run(&program);
        assert!(script.is_halted());
        // Once inside the innermost repeat, once more from the fetch loop.
        assert_eq!(script.tape().value(), -1);
    }

    #[test]
    fn debug_keyword() {
        let script = run("Kevlin\nWe'll x");
        assert!(script.debug);
        assert_eq!(script.tape().value(), 1);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn debug_keyword_dumps_tape() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            run("We'll x\nKevlin\nWe'll x");
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(!logs.contains("line=1"));
        assert!(logs.contains("line=2 tape=[>1<]"));
        assert!(logs.contains("line=3 tape=[>2<]"));
    }

    #[test]
    fn into_output() {
        let program = "We'll 72 characters makes an H in the output, see if you can count them please\nSin auld lang syne";
        let script = run(program);
        assert_eq!(script.into_output(), "H");
    }
}
