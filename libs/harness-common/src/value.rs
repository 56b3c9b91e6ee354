use crate::error::ValueParseError;
use crate::types::ValueType;

/// A test value in textual notation, shaped by its declared type.
///
/// Scalars keep their raw text; rendering into a target language's literal
/// syntax happens later, where range and precision can be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    Sequence(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

const OPEN: char = '{';
const CLOSE: char = '}';
const ELEMENT_SEPARATOR: char = ',';
const KEY_SEPARATOR: char = ':';

impl Value {
    /// Parses `text` according to `ty`.
    ///
    /// A top-level scalar is taken verbatim. Inside braces, a scalar runs up
    /// to the next delimiter, and whitespace around braces and separators is
    /// ignored: `{ 1: { a, b }, 2: {} }` is a valid `map<int32, list<string>>`.
    pub fn parse(ty: &ValueType, text: &str) -> Result<Value, ValueParseError> {
        let mut cursor = Cursor { text, pos: 0 };
        let value = cursor.value(ty, &[])?;
        if cursor.pos != text.len() {
            return Err(ValueParseError::TrailingInput {
                text: text.to_string(),
                offset: cursor.pos,
            });
        }
        Ok(value)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text),
            _ => None,
        }
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Length of `\s*<delimiter>\s*` at `offset` past the cursor.
    fn delimiter_len_at(&self, offset: usize, delimiter: char) -> Option<usize> {
        let rest = &self.rest()[offset..];
        let trimmed = rest.trim_start();
        let after = trimmed.strip_prefix(delimiter)?;
        let trailing = after.len() - after.trim_start().len();
        Some(rest.len() - trimmed.len() + delimiter.len_utf8() + trailing)
    }

    fn looking_at(&self, delimiter: char) -> bool {
        self.delimiter_len_at(0, delimiter).is_some()
    }

    fn consume(&mut self, delimiter: char) -> bool {
        match self.delimiter_len_at(0, delimiter) {
            Some(len) => {
                self.pos += len;
                true
            }
            None => false,
        }
    }

    fn value(&mut self, ty: &ValueType, delimiters: &[char]) -> Result<Value, ValueParseError> {
        match ty {
            ValueType::Scalar(_) => self.scalar(delimiters),
            ValueType::Map(key, value) => self.map(key, value),
            ValueType::Array(element) | ValueType::List(element) | ValueType::Set(element) => {
                self.sequence(element)
            }
        }
    }

    fn scalar(&mut self, delimiters: &[char]) -> Result<Value, ValueParseError> {
        let rest = self.rest();
        if delimiters.is_empty() {
            self.pos = self.text.len();
            return Ok(Value::Scalar(rest.to_string()));
        }

        let end = rest
            .char_indices()
            .map(|(offset, _)| offset)
            .find(|&offset| {
                delimiters
                    .iter()
                    .any(|&d| self.delimiter_len_at(offset, d).is_some())
            })
            .ok_or_else(|| ValueParseError::Unterminated {
                text: self.text.to_string(),
            })?;

        self.pos += end;
        Ok(Value::Scalar(rest[..end].to_string()))
    }

    fn open(&mut self) -> Result<(), ValueParseError> {
        if self.consume(OPEN) {
            Ok(())
        } else {
            Err(ValueParseError::MissingOpen {
                text: self.text.to_string(),
                offset: self.pos,
            })
        }
    }

    /// Consumes the separator before element `index`, or the closing bracket.
    /// Returns `false` once the container is closed.
    fn next_element(&mut self, index: usize) -> Result<bool, ValueParseError> {
        if self.consume(CLOSE) {
            return Ok(false);
        }
        if index > 0 && !self.consume(ELEMENT_SEPARATOR) {
            if self.pos >= self.text.len() {
                return Err(ValueParseError::Unterminated {
                    text: self.text.to_string(),
                });
            }
            return Err(ValueParseError::MissingSeparator {
                text: self.text.to_string(),
                offset: self.pos,
            });
        }
        Ok(true)
    }

    fn sequence(&mut self, element: &ValueType) -> Result<Value, ValueParseError> {
        self.open()?;
        let mut items = Vec::new();
        while self.next_element(items.len())? {
            items.push(self.value(element, &[CLOSE, ELEMENT_SEPARATOR])?);
        }
        Ok(Value::Sequence(items))
    }

    fn map(&mut self, key: &ValueType, value: &ValueType) -> Result<Value, ValueParseError> {
        self.open()?;
        let mut entries = Vec::new();
        while self.next_element(entries.len())? {
            let k = self.value(key, &[CLOSE, ELEMENT_SEPARATOR, KEY_SEPARATOR])?;
            if !self.consume(KEY_SEPARATOR) {
                return Err(ValueParseError::MissingKeySeparator {
                    text: self.text.to_string(),
                    offset: self.pos,
                });
            }
            let v = self.value(value, &[CLOSE, ELEMENT_SEPARATOR, KEY_SEPARATOR])?;
            if !self.looking_at(CLOSE) && !self.looking_at(ELEMENT_SEPARATOR) {
                return Err(ValueParseError::MissingSeparator {
                    text: self.text.to_string(),
                    offset: self.pos,
                });
            }
            entries.push((k, v));
        }
        Ok(Value::Map(entries))
    }
}
