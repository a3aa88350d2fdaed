use std::fmt::Write;

use common::{num_size, string_map::{StringMap, StringIndex}, source::{SourceRange, FileData}};

pub struct ErrorFormatter<'me> {
    writer: &'me mut String,
    string_map: &'me StringMap<'me>,
    file: &'me FileData,
}


impl<'me> ErrorFormatter<'me> {
    pub fn new(
        writer: &'me mut String,
        string_map: &'me StringMap,
        file: &'me FileData,
    ) -> Self {
        Self {
            writer,
            string_map,
            file,
        }
    }


    pub fn error<'fmt>(&'fmt mut self, msg: &str) -> CompilerError<'fmt, 'me> {
        CompilerError::new(self, msg)
    }


    pub fn string(&self, string_index: StringIndex) -> &str {
        self.string_map.get(string_index)
    }
}


impl Write for ErrorFormatter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.writer.write_str(s)
    }
}


pub struct CompilerError<'me, 'fmt> {
    fmt: &'me mut ErrorFormatter<'fmt>,
}


impl<'me, 'fmt> CompilerError<'me, 'fmt> {
    fn new(f: &'me mut ErrorFormatter<'fmt>, msg: &str) -> Self {
        let _ = writeln!(f, "Error: {msg}:");
        Self {
            fmt: f,
        }
    }


    pub fn highlight(&mut self, source: SourceRange) {
        self.inner_highlight(source, "");
    }


    pub fn highlight_with_note(&mut self, source: SourceRange, note: &str) {
        self.inner_highlight(source, note);
    }


    fn inner_highlight(&mut self, source: SourceRange, note: &str) {
        let data = self.fmt.file.read();
        let at = line_at(source.start() as usize, data);

        let line_no = at.line + 1;
        let column = source.start() as usize - at.offset + 1;

        let file_name = self.fmt.string_map.get(self.fmt.file.name());
        let _ = writeln!(self.fmt, " --> {}:{}:{}", file_name, line_no, column);
        let _ = writeln!(self.fmt);

        let gutter = " ".repeat(num_size(line_no as u32) as usize);

        let line = data.lines().nth(at.line).unwrap_or("");

        if at.line > 0 {
            if let Some(previous) = data.lines().nth(at.line - 1) {
                let _ = writeln!(self.fmt, "{gutter} | {previous}");
            }
        }

        let _ = writeln!(self.fmt, "{line_no} | {line}");

        // the caret line; a span reaching past the line is
        // clamped to the line's last character
        {
            let start = source.start() as usize - at.offset;
            let end = (source.end() as usize).min(at.offset + line.len().saturating_sub(1)) - at.offset;
            let width = (end + 1).saturating_sub(start).max(1);

            let _ = write!(self.fmt, "{gutter} | {}{}", " ".repeat(start), "^".repeat(width));
            if note.is_empty() {
                let _ = writeln!(self.fmt);
            } else {
                let _ = writeln!(self.fmt, " {note}");
            }
        }

        if let Some(next) = data.lines().nth(at.line + 1) {
            let _ = writeln!(self.fmt, "{gutter} | {next}");
        }
    }
}


#[derive(Clone, Copy, Debug)]
struct LineAt {
    offset: usize,
    line: usize,
}


fn line_at(offset: usize, data: &str) -> LineAt {
    let mut current = LineAt { offset: 0, line: 0 };

    for (index, line) in data.lines().enumerate() {
        let end = current.offset + line.len();
        if offset <= end {
            return LineAt { offset: current.offset, line: index }
        }

        current = LineAt { offset: end + 1, line: index + 1 };
    }

    current
}


#[cfg(test)]
mod tests {
    use super::line_at;

    #[test]
    fn line_lookup() {
        let data = "first\nsecond\nthird";

        let at = line_at(0, data);
        assert_eq!((at.line, at.offset), (0, 0));

        let at = line_at(4, data);
        assert_eq!((at.line, at.offset), (0, 0));

        let at = line_at(6, data);
        assert_eq!((at.line, at.offset), (1, 6));

        let at = line_at(13, data);
        assert_eq!((at.line, at.offset), (2, 13));
    }
}
