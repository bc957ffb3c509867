//! Operator input.

use std::io::{self, BufRead, Write};

/// Source of operator-entered text.
///
/// End of input is reported as an [`io::ErrorKind::UnexpectedEof`] error, which ends
/// the session.
pub trait Prompt {
    /// Ask for a value; surrounding whitespace is removed.
    fn required(&mut self, message: &str) -> io::Result<String>;

    /// Ask for a value that may be left empty, in which case `None` is returned.
    fn nullable(&mut self, message: &str) -> io::Result<Option<String>>;
}

/// Line-oriented prompt over any reader/writer pair.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn read_line(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "{}: ", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of operator input",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn required(&mut self, message: &str) -> io::Result<String> {
        self.read_line(message)
    }

    fn nullable(&mut self, message: &str) -> io::Result<Option<String>> {
        let line = self.read_line(message)?;
        Ok(if line.is_empty() { None } else { Some(line) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_required_trims_and_echoes_prompt() {
        let mut prompt = LinePrompt::new(Cursor::new("  supplier \n"), Vec::new());
        assert_eq!(prompt.required("Table name").unwrap(), "supplier");
        let (_, output) = prompt.into_inner();
        assert_eq!(String::from_utf8(output).unwrap(), "Table name: ");
    }

    #[test]
    fn test_nullable_empty_is_none() {
        let mut prompt = LinePrompt::new(Cursor::new("\n   \nvalue\n"), Vec::new());
        assert_eq!(prompt.nullable("a").unwrap(), None);
        assert_eq!(prompt.nullable("b").unwrap(), None);
        assert_eq!(prompt.nullable("c").unwrap(), Some("value".to_string()));
    }

    #[test]
    fn test_end_of_input() {
        let mut prompt = LinePrompt::new(Cursor::new(""), Vec::new());
        let err = prompt.required("anything").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
