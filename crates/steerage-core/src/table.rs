use crate::error::{Error, Result};
use crate::record::Record;

/// Parses delimited text with a header row into records.
///
/// The first non-empty line names the attributes; every following non-empty
/// line becomes one record mapping attribute name to field value. Fields may
/// be double-quoted (with `""` escaping a quote) to carry commas or newlines.
/// Rows shorter than the header leave the trailing attributes absent; extra
/// fields are ignored.
pub fn parse_table(text: &str) -> Result<Vec<Record>> {
    let mut parser = TableParser::new(text);

    parser.consume_newlines();
    let Some(header) = parser.parse_row()? else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    while let Some(fields) = parser.parse_row()? {
        let record = header
            .iter()
            .zip(fields)
            .map(|(name, value)| (name.clone(), value))
            .collect();
        records.push(record);
    }
    Ok(records)
}

struct TableParser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> TableParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Parses one full row; `None` at end of input. Blank lines are skipped.
    fn parse_row(&mut self) -> Result<Option<Vec<String>>> {
        if self.eof() {
            return Ok(None);
        }

        let mut fields = vec![self.parse_field()?];
        while self.peek_char() == Some(',') {
            self.pos += 1;
            fields.push(self.parse_field()?);
        }
        self.consume_newlines();

        // A lone empty field means the line was blank.
        if fields.len() == 1 && fields[0].is_empty() {
            return self.parse_row();
        }
        Ok(Some(fields))
    }

    fn consume_newlines(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                '\r' => {
                    self.pos += 1;
                    if self.peek_char() == Some('\n') {
                        self.pos += 1;
                    }
                    self.line += 1;
                }
                _ => break,
            }
        }
    }

    fn parse_field(&mut self) -> Result<String> {
        match self.peek_char() {
            Some('"') => self.parse_quoted_field(),
            Some('\n' | '\r') | None => Ok(String::new()),
            _ => Ok(self.parse_unquoted_field()),
        }
    }

    fn parse_unquoted_field(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek_char() {
            if ch == ',' || ch == '\n' || ch == '\r' {
                break;
            }
            out.push(ch);
            self.pos += ch.len_utf8();
        }
        out
    }

    fn parse_quoted_field(&mut self) -> Result<String> {
        let start_line = self.line;
        self.pos += 1;
        let mut out = String::new();
        while let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
            }
            if ch == '"' {
                if self.peek_char() == Some('"') {
                    // Escaped quote
                    self.pos += 1;
                    out.push('"');
                    continue;
                }
                return Ok(out);
            }
            out.push(ch);
        }
        Err(Error::Table {
            line: start_line,
            message: "unterminated quoted field".to_string(),
        })
    }
}
