//! Stateless conversions from source encodings into 16-bit internal units.
//!
//! Sources are treated like C strings: conversion stops at the first zero
//! unit or at the end of the slice, whichever comes first. Nothing here is
//! full Unicode validation; malformed input is substituted or dropped, never
//! reported.
//!
//! Every encoding exposes one entry point, [`SourceEncoding::transcode`]:
//!
//! - `dst == None` probes and returns how many internal units the source
//!   produces.
//! - `dst == Some(buf)` writes up to `buf.len()` units, pads the rest of
//!   `buf` with 0 and returns the number of real units written.

/// Internal character unit.
pub type Char = u16;

/// Substitute for source units that have no internal representation.
pub const BOGUS_SYMBOL: Char = b'?' as Char;

const SURROGATE_LOW_BASE: u32 = 0xDC00;
const SURROGATE_HIGH_BASE: u32 = 0xD800;

/// A source encoding that can be transcoded into internal units.
pub trait SourceEncoding {
    /// One code unit of the source.
    type Unit: Copy;

    /// Convert `src` into `dst`, or probe the output length when `dst` is
    /// `None`.
    fn transcode(dst: Option<&mut [Char]>, src: &[Self::Unit]) -> usize;
}

/// Collects output units, either counting them or writing them.
struct Sink<'a> {
    dst: Option<&'a mut [Char]>,
    written: usize,
}

impl<'a> Sink<'a> {
    fn new(dst: Option<&'a mut [Char]>) -> Self {
        Self { dst, written: 0 }
    }

    /// Emit one unit. Returns `false` once the destination is full.
    #[inline]
    fn push(&mut self, unit: Char) -> bool {
        if let Some(dst) = self.dst.as_deref_mut() {
            match dst.get_mut(self.written) {
                Some(slot) => *slot = unit,
                None => return false,
            }
        }
        self.written += 1;
        true
    }

    /// Emit a surrogate pair for a supplementary code point, in the given
    /// order.
    fn push_pair(&mut self, code_point: u32, low_first: bool) -> bool {
        let offset = code_point - 0x10000;
        let high = (SURROGATE_HIGH_BASE + (offset >> 10)) as Char;
        let low = (SURROGATE_LOW_BASE + (offset & 0x3FF)) as Char;
        if low_first {
            self.push(low) && self.push(high)
        } else {
            self.push(high) && self.push(low)
        }
    }

    fn finish(self) -> usize {
        if let Some(dst) = self.dst {
            if let Some(rest) = dst.get_mut(self.written..) {
                rest.fill(0);
            }
        }
        self.written
    }
}

/// 8-bit single-byte text. Only ASCII survives.
#[derive(Clone, Copy, Debug)]
pub struct Narrow;

impl SourceEncoding for Narrow {
    type Unit = u8;

    fn transcode(dst: Option<&mut [Char]>, src: &[u8]) -> usize {
        let mut sink = Sink::new(dst);
        for &byte in src.iter().take_while(|&&b| b != 0) {
            let unit = if byte < 0x80 {
                byte as Char
            } else {
                BOGUS_SYMBOL
            };
            if !sink.push(unit) {
                break;
            }
        }
        sink.finish()
    }
}

/// UTF-8 multi-byte text.
///
/// Supplementary code points are emitted low surrogate first, then high
/// surrogate. Values in the surrogate gap, overlong or out-of-range 4-byte
/// sequences and truncated sequences are dropped. Lead bytes `>= 0xF8`
/// become [`BOGUS_SYMBOL`].
#[derive(Clone, Copy, Debug)]
pub struct Utf8;

/// Outcome of decoding one multi-byte UTF-8 sequence.
enum Decoded {
    Value(u32),
    /// A non-continuation byte interrupted the sequence; skip the lead.
    Malformed,
    /// Input ended (or hit NUL) mid-sequence.
    Truncated,
}

impl Utf8 {
    /// Decode the `len`-byte sequence starting at `src[0]`.
    fn decode(src: &[u8], len: usize) -> Decoded {
        let lead_bits = match len {
            2 => 0x1F,
            3 => 0x0F,
            _ => 0x07,
        };
        let mut code_point = (src[0] & lead_bits) as u32;
        for k in 1..len {
            match src.get(k) {
                None | Some(0) => return Decoded::Truncated,
                Some(&b) if b & 0xC0 == 0x80 => code_point = (code_point << 6) | (b & 0x3F) as u32,
                Some(_) => return Decoded::Malformed,
            }
        }
        Decoded::Value(code_point)
    }
}

impl SourceEncoding for Utf8 {
    type Unit = u8;

    fn transcode(dst: Option<&mut [Char]>, src: &[u8]) -> usize {
        let mut sink = Sink::new(dst);
        let mut i = 0;
        while let Some(&lead) = src.get(i) {
            if lead == 0 {
                break;
            }
            let len = match lead {
                0x00..=0x7F => 1,
                // Continuation byte without a lead.
                0x80..=0xBF => {
                    i += 1;
                    continue;
                }
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => {
                    if !sink.push(BOGUS_SYMBOL) {
                        break;
                    }
                    i += 1;
                    continue;
                }
            };
            if len == 1 {
                if !sink.push(lead as Char) {
                    break;
                }
                i += 1;
                continue;
            }

            let code_point = match Self::decode(&src[i..], len) {
                Decoded::Value(cp) => cp,
                Decoded::Malformed => {
                    i += 1;
                    continue;
                }
                Decoded::Truncated => break,
            };
            i += len;

            let shortest = match len {
                2 => 0x80,
                3 => 0x800,
                _ => 0x10000,
            };
            let open = match code_point {
                cp if cp < shortest => true,
                0xD800..=0xDFFF => true,
                0x10000..=0x10FFFF => sink.push_pair(code_point, true),
                cp if cp > 0x10FFFF => true,
                _ => sink.push(code_point as Char),
            };
            if !open {
                break;
            }
        }
        sink.finish()
    }
}

/// UTF-16 text; same width as the internal units, copied verbatim.
#[derive(Clone, Copy, Debug)]
pub struct Utf16;

impl SourceEncoding for Utf16 {
    type Unit = u16;

    fn transcode(dst: Option<&mut [Char]>, src: &[u16]) -> usize {
        copy_units(dst, src)
    }
}

/// UTF-32 text.
///
/// Supplementary code points become a standard high/low surrogate pair;
/// surrogate values and values above `0x10FFFF` become [`BOGUS_SYMBOL`].
#[derive(Clone, Copy, Debug)]
pub struct Utf32;

impl SourceEncoding for Utf32 {
    type Unit = u32;

    fn transcode(dst: Option<&mut [Char]>, src: &[u32]) -> usize {
        let mut sink = Sink::new(dst);
        for &unit in src.iter().take_while(|&&u| u != 0) {
            let open = match unit {
                0xD800..=0xDFFF => sink.push(BOGUS_SYMBOL),
                0x0000..=0xFFFF => sink.push(unit as Char),
                0x10000..=0x10FFFF => sink.push_pair(unit, false),
                _ => sink.push(BOGUS_SYMBOL),
            };
            if !open {
                break;
            }
        }
        sink.finish()
    }
}

/// Internal units, copied verbatim.
#[derive(Clone, Copy, Debug)]
pub struct Native;

impl SourceEncoding for Native {
    type Unit = Char;

    fn transcode(dst: Option<&mut [Char]>, src: &[Char]) -> usize {
        copy_units(dst, src)
    }
}

fn copy_units(dst: Option<&mut [Char]>, src: &[Char]) -> usize {
    let len = src.iter().position(|&u| u == 0).unwrap_or(src.len());
    match dst {
        None => len,
        Some(dst) => {
            let n = len.min(dst.len());
            dst[..n].copy_from_slice(&src[..n]);
            dst[n..].fill(0);
            n
        }
    }
}
