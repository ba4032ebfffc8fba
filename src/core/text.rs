// This module provides LazyText, the "address plus length" text view that presenters hand
// back to the host. Nothing is read from the inspected process when a LazyText is created:
// bytes are fetched in fixed-size chunks only while the host iterates the characters, so a
// host that truncates a long string never touches the tail. Decoding is UTF-8 in one of two
// modes chosen by the host: Strict stops at the first undecodable sequence and records its
// byte offset, Lenient substitutes U+FFFD for each maximal invalid subsequence using the same
// rules as String::from_utf8_lossy. Chunk boundaries never split a character: the decoder
// keeps a small window and refills it whenever fewer than four bytes remain.

//! Lazily decoded text backed by host memory.

use std::fmt;
use std::str;

use super::error::HostError;
use super::host::MemoryReader;

/// Bytes fetched from the host per read.
const CHUNK_SIZE: usize = 256;

/// Longest UTF-8 encoded character.
const MAX_UTF8_LEN: usize = 4;

/// How invalid UTF-8 is handled while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Stop at the first undecodable byte.
    Strict,
    /// Replace invalid sequences with U+FFFD.
    #[default]
    Lenient,
}

/// A text view over `length` bytes at `address`, decoded on demand.
pub struct LazyText<'a> {
    reader: &'a dyn MemoryReader,
    address: u64,
    length: usize,
}

impl<'a> LazyText<'a> {
    pub fn new(reader: &'a dyn MemoryReader, address: u64, length: usize) -> Self {
        Self {
            reader,
            address,
            length,
        }
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Character iterator. Consumes the view; ask the presenter again to
    /// start over.
    pub fn chars(self, mode: DecodeMode) -> TextChars<'a> {
        TextChars {
            reader: self.reader,
            address: self.address,
            length: self.length,
            fetched: 0,
            consumed: 0,
            window: Vec::new(),
            head: 0,
            mode,
            invalid_at: None,
            done: false,
        }
    }

    /// Decode up to `max_chars` characters into a string.
    pub fn decode(self, mode: DecodeMode, max_chars: Option<usize>) -> Result<DecodedText, HostError> {
        let mut chars = self.chars(mode);
        let mut text = String::new();
        let mut count = 0usize;
        let mut truncated = false;

        for ch in chars.by_ref() {
            if max_chars.is_some_and(|max| count >= max) {
                truncated = true;
                break;
            }
            text.push(ch?);
            count += 1;
        }

        Ok(DecodedText {
            text,
            truncated,
            invalid_at: chars.invalid_at(),
        })
    }

    /// Read all the raw bytes.
    ///
    /// The buffer grows one chunk at a time, so a bogus length fails on the
    /// first unreadable chunk instead of allocating up front.
    pub fn read_bytes(self) -> Result<Vec<u8>, HostError> {
        let mut bytes = Vec::with_capacity(self.length.min(CHUNK_SIZE));
        while bytes.len() < self.length {
            let start = bytes.len();
            let take = (self.length - start).min(CHUNK_SIZE);
            let address = self
                .address
                .checked_add(start as u64)
                .ok_or(HostError::UnreadableMemory {
                    address: self.address,
                    len: self.length,
                })?;
            bytes.resize(start + take, 0);
            self.reader.read_memory(address, &mut bytes[start..])?;
        }
        Ok(bytes)
    }
}

impl fmt::Debug for LazyText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyText")
            .field("address", &format_args!("{:#x}", self.address))
            .field("length", &self.length)
            .finish()
    }
}

/// Materialized result of [`LazyText::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// More characters were available past the limit.
    pub truncated: bool,
    /// Byte offset where strict decoding stopped.
    pub invalid_at: Option<usize>,
}

/// Iterator over the characters of a [`LazyText`].
///
/// Yields `Err` once if the host fails to supply memory, then ends.
pub struct TextChars<'a> {
    reader: &'a dyn MemoryReader,
    address: u64,
    length: usize,
    /// Bytes read from the host so far.
    fetched: usize,
    /// Bytes decoded so far.
    consumed: usize,
    window: Vec<u8>,
    head: usize,
    mode: DecodeMode,
    invalid_at: Option<usize>,
    done: bool,
}

impl TextChars<'_> {
    /// Byte offset of the sequence that stopped strict decoding.
    pub fn invalid_at(&self) -> Option<usize> {
        self.invalid_at
    }

    fn fill(&mut self) -> Result<(), HostError> {
        if self.window.len() - self.head >= MAX_UTF8_LEN || self.fetched == self.length {
            return Ok(());
        }

        self.window.drain(..self.head);
        self.head = 0;

        let take = (self.length - self.fetched).min(CHUNK_SIZE);
        let address = self
            .address
            .checked_add(self.fetched as u64)
            .ok_or(HostError::UnreadableMemory {
                address: self.address,
                len: self.length,
            })?;
        let start = self.window.len();
        self.window.resize(start + take, 0);
        self.reader.read_memory(address, &mut self.window[start..])?;
        self.fetched += take;
        Ok(())
    }

    fn advance(&mut self, n: usize) {
        self.head += n;
        self.consumed += n;
    }
}

impl Iterator for TextChars<'_> {
    type Item = Result<char, HostError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(err) = self.fill() {
            self.done = true;
            return Some(Err(err));
        }

        let available = &self.window[self.head..];
        if available.is_empty() {
            self.done = true;
            return None;
        }

        let probe = &available[..available.len().min(MAX_UTF8_LEN)];
        let (valid_up_to, error_len) = match str::from_utf8(probe) {
            Ok(_) => (probe.len(), None),
            Err(err) => (err.valid_up_to(), err.error_len()),
        };

        if valid_up_to > 0 {
            let ch = str::from_utf8(&probe[..valid_up_to])
                .ok()
                .and_then(|s| s.chars().next())?;
            self.advance(ch.len_utf8());
            return Some(Ok(ch));
        }

        match self.mode {
            DecodeMode::Strict => {
                log::trace!("strict decoding stopped at byte {}", self.consumed);
                self.invalid_at = Some(self.consumed);
                self.done = true;
                None
            }
            DecodeMode::Lenient => {
                // An incomplete sequence can only be cut short by the end of the text.
                let skip = error_len.unwrap_or(probe.len());
                self.advance(skip);
                Some(Ok(char::REPLACEMENT_CHARACTER))
            }
        }
    }
}

impl std::iter::FusedIterator for TextChars<'_> {}
