#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RedirectInstruction {
    Output,
    Input,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Redirect {
    pub instruction: RedirectInstruction,
    pub filename: String,
}

/// One stage of a line: words and redirects in the order they were written.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleCommand {
    pub words: Vec<String>,
    pub redirects: Vec<Redirect>,
}

#[derive(Debug, PartialEq)]
pub struct Line {
    pub first: SimpleCommand,
    pub second: Option<SimpleCommand>,
    pub background: bool,
}

#[derive(Debug, Default)]
pub struct SimpleCommandBuilder {
    pub words: Vec<String>,
    pub redirects: Vec<Redirect>,
}

impl SimpleCommandBuilder {
    pub fn update(mut self, command_part: SimpleCommandPart) -> SimpleCommandBuilder {
        match command_part {
            SimpleCommandPart::Word(w) => self.words.push(w),
            SimpleCommandPart::Redirect(r) => self.redirects.push(r),
        };

        self
    }

    pub fn build(self) -> SimpleCommand {
        SimpleCommand {
            words: self.words,
            redirects: self.redirects,
        }
    }
}

#[derive(Debug)]
pub enum SimpleCommandPart {
    Word(String),
    Redirect(Redirect),
}

impl SimpleCommandPart {
    pub fn input(filename: String) -> SimpleCommandPart {
        SimpleCommandPart::Redirect(Redirect {
            instruction: RedirectInstruction::Input,
            filename,
        })
    }

    pub fn output(filename: String) -> SimpleCommandPart {
        SimpleCommandPart::Redirect(Redirect {
            instruction: RedirectInstruction::Output,
            filename,
        })
    }
}
