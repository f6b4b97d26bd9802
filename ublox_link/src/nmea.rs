//! Extraction of ASCII sentences interleaved with binary frames.

use crate::constants::{NMEA_END_CHAR, NMEA_SYNC_CHAR};

/// Iterate over every `$`..`\n` sentence (both inclusive) in `data`, left to right.
///
/// Sentences do not overlap: the search for the next `$` resumes after the
/// previous `\n`. A trailing `$` without a line feed yields nothing.
pub fn sentences(data: &[u8]) -> Sentences<'_> {
    Sentences { rest: data }
}

#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.rest.iter().position(|b| *b == NMEA_SYNC_CHAR)?;
        let Some(len) = self.rest[start..].iter().position(|b| *b == NMEA_END_CHAR) else {
            self.rest = &[];
            return None;
        };
        let end = start + len + 1;
        let sentence = &self.rest[start..end];
        self.rest = &self.rest[end..];
        Some(sentence)
    }
}

impl core::iter::FusedIterator for Sentences<'_> {}
