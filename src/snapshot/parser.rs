//! Snapshot text parser.

use bumpalo::Bump;
use hashbrown::HashMap;

use super::{Node, Snapshot, SnapshotError, ValueId};

/// Deepest struct nesting accepted in one value.
pub const MAX_VALUE_DEPTH: usize = 64;

pub fn parse_snapshot<'a>(arena: &'a Bump, text: &str) -> Result<Snapshot<'a>, SnapshotError> {
    let parser = Parser::new(arena, text);
    parser.parse()
}

struct Parser<'t, 'a> {
    text: &'t str,
    pos: usize,
    arena: &'a Bump,
    snapshot: Snapshot<'a>,
    depth: usize,

    // Names already copied into the arena
    interned: HashMap<&'t str, &'a str>,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(arena: &'a Bump, text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            arena,
            snapshot: Snapshot::default(),
            depth: 0,
            interned: HashMap::new(),
        }
    }

    fn parse(mut self) -> Result<Snapshot<'a>, SnapshotError> {
        self.skip_whitespace();

        while !self.is_eof() {
            let keyword = self.read_word()?;
            match keyword {
                "module" => {
                    let name = self.read_string_literal()?;
                    let name = String::from_utf8(name)
                        .map_err(|_| self.error("module name is not valid UTF-8"))?;
                    let name = self.arena.alloc_str(&name);
                    self.snapshot.set_module(name);
                }
                "memory" => self.parse_memory()?,
                "value" => {
                    let name = self.read_word()?;
                    let name = self.intern(name);
                    self.expect('=')?;
                    let value = self.parse_value()?;
                    self.snapshot.add_root(name, value)?;
                }
                other => return Err(self.error(format!("unknown item `{other}`"))),
            }
            self.skip_whitespace();
        }

        self.snapshot.seal()?;
        log::debug!(
            "parsed snapshot: {} values, {} memory segments",
            self.snapshot.roots().count(),
            self.snapshot.segment_count()
        );
        Ok(self.snapshot)
    }

    fn parse_memory(&mut self) -> Result<(), SnapshotError> {
        let address = self.read_address()?;
        self.expect('=')?;

        self.skip_whitespace();
        let bytes = match self.current_char() {
            Some('"') => self.read_string_literal()?,
            Some('[') => self.read_byte_list()?,
            _ => return Err(self.error("expected a string literal or a byte list")),
        };
        if address.checked_add(bytes.len() as u64).is_none() {
            return Err(self.error(format!("memory at {address:#x} runs past the address space")));
        }

        let bytes = self.arena.alloc_slice_copy(&bytes);
        self.snapshot.add_segment(address, bytes);
        Ok(())
    }

    fn parse_value(&mut self) -> Result<ValueId, SnapshotError> {
        if self.depth >= MAX_VALUE_DEPTH {
            return Err(self.error(format!("value nests deeper than {MAX_VALUE_DEPTH} levels")));
        }
        self.depth += 1;
        let value = self.parse_node();
        self.depth -= 1;
        value
    }

    fn parse_node(&mut self) -> Result<ValueId, SnapshotError> {
        let kind = self.read_word()?;
        let node = match kind {
            "int" => Node::Int(self.read_number()?),
            "ptr" => Node::Ptr(self.read_address()?),
            "struct" => {
                let tag = self.read_tag()?;
                let tag = self.intern(tag);
                self.expect('{')?;

                let mut fields: Vec<(&'a str, ValueId)> = Vec::new();
                loop {
                    if self.try_read('}') {
                        break;
                    }
                    let name = self.read_word()?;
                    if fields.iter().any(|(field, _)| *field == name) {
                        return Err(self.error(format!("field `{name}` appears twice in `{tag}`")));
                    }
                    let name = self.intern(name);
                    self.expect(':')?;
                    let value = self.parse_value()?;
                    fields.push((name, value));
                    self.try_read(',');
                }

                Node::Struct {
                    tag,
                    fields: self.arena.alloc_slice_copy(&fields),
                }
            }
            other => return Err(self.error(format!("unknown value kind `{other}`"))),
        };
        Ok(self.snapshot.push_node(node))
    }

    fn intern(&mut self, name: &'t str) -> &'a str {
        if let Some(&interned) = self.interned.get(name) {
            return interned;
        }
        let interned: &'a str = self.arena.alloc_str(name);
        self.interned.insert(name, interned);
        interned
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == ';' {
                // Skip comment line
                while let Some(ch) = self.current_char() {
                    self.advance();
                    if ch == '\n' {
                        break;
                    }
                }
            } else if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn try_read(&mut self, ch: char) -> bool {
        self.skip_whitespace();
        if self.current_char() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), SnapshotError> {
        if !self.try_read(ch) {
            let found = match self.current_char() {
                Some(found) => format!("`{found}`"),
                None => "end of input".to_string(),
            };
            return Err(self.error(format!("expected `{ch}`, found {found}")));
        }
        Ok(())
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'t str {
        let text = self.text;
        let start = self.pos;
        while let Some(ch) = self.current_char() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        &text[start..self.pos]
    }

    fn read_word(&mut self) -> Result<&'t str, SnapshotError> {
        self.skip_whitespace();
        let word = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if word.is_empty() {
            return Err(self.error("expected a name"));
        }
        Ok(word)
    }

    /// A type tag runs up to whitespace or `{`, so `alloc::vec::Vec<u8>` is one tag.
    fn read_tag(&mut self) -> Result<&'t str, SnapshotError> {
        self.skip_whitespace();
        let tag = self.take_while(|ch| !ch.is_whitespace() && ch != '{' && ch != ';');
        if tag.is_empty() {
            return Err(self.error("expected a type tag"));
        }
        Ok(tag)
    }

    fn read_number(&mut self) -> Result<i128, SnapshotError> {
        self.skip_whitespace();
        let negative = self.current_char() == Some('-');
        if negative {
            self.advance();
        }

        let token = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        let digits = token.replace('_', "");
        let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => i128::from_str_radix(hex, 16),
            None => digits.parse::<i128>(),
        }
        .map_err(|_| self.error(format!("invalid number `{token}`")))?;

        Ok(if negative { -magnitude } else { magnitude })
    }

    fn read_address(&mut self) -> Result<u64, SnapshotError> {
        let value = self.read_number()?;
        u64::try_from(value).map_err(|_| self.error(format!("address {value} is out of range")))
    }

    fn read_string_literal(&mut self) -> Result<Vec<u8>, SnapshotError> {
        self.expect('"')?;
        let mut bytes = Vec::new();
        loop {
            let Some(ch) = self.current_char() else {
                return Err(self.error("unterminated string literal"));
            };
            self.advance();
            match ch {
                '"' => break,
                '\\' => {
                    let Some(escape) = self.current_char() else {
                        return Err(self.error("unterminated string literal"));
                    };
                    self.advance();
                    match escape {
                        'n' => bytes.push(b'\n'),
                        't' => bytes.push(b'\t'),
                        'r' => bytes.push(b'\r'),
                        '0' => bytes.push(0),
                        '\\' => bytes.push(b'\\'),
                        '"' => bytes.push(b'"'),
                        'x' => {
                            let start = self.pos;
                            let end = (start + 2).min(self.text.len());
                            let hex = self.text.get(start..end).unwrap_or("");
                            let byte = u8::from_str_radix(hex, 16)
                                .ok()
                                .filter(|_| hex.len() == 2)
                                .ok_or_else(|| self.error(format!("invalid escape `\\x{hex}`")))?;
                            self.pos = end;
                            bytes.push(byte);
                        }
                        other => return Err(self.error(format!("unknown escape `\\{other}`"))),
                    }
                }
                _ => {
                    let mut utf8 = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
        Ok(bytes)
    }

    fn read_byte_list(&mut self) -> Result<Vec<u8>, SnapshotError> {
        self.expect('[')?;
        let mut bytes = Vec::new();
        loop {
            if self.try_read(']') {
                break;
            }
            if self.is_eof() {
                return Err(self.error("unterminated byte list"));
            }
            let token = self.take_while(|ch| ch.is_ascii_hexdigit());
            let byte = u8::from_str_radix(token, 16)
                .ok()
                .filter(|_| token.len() <= 2)
                .ok_or_else(|| self.error(format!("invalid byte `{token}`")))?;
            bytes.push(byte);
            self.try_read(',');
        }
        Ok(bytes)
    }

    fn line(&self) -> usize {
        let end = self.pos.min(self.text.len());
        1 + self.text[..end].bytes().filter(|&b| b == b'\n').count()
    }

    fn error(&self, message: impl Into<String>) -> SnapshotError {
        SnapshotError::Parse {
            line: self.line(),
            message: message.into(),
        }
    }
}
