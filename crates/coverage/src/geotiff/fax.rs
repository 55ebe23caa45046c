//! CCITT Group 4 (T.6) codec for bilevel rasters.
//!
//! Operates on unpacked samples, one byte per pixel, zero meaning white.
//! Every row is coded against the previous one; the stream ends with an
//! EOFB marker and is padded to a byte boundary.

use crate::{Error, Result};

// T.4 run length codes, (bit pattern, bit count), indexed by run length.
#[rustfmt::skip]
const WHITE_TERMINATING: [(u16, u8); 64] = [
    (0b00110101, 8), (0b000111, 6), (0b0111, 4), (0b1000, 4),
    (0b1011, 4), (0b1100, 4), (0b1110, 4), (0b1111, 4),
    (0b10011, 5), (0b10100, 5), (0b00111, 5), (0b01000, 5),
    (0b001000, 6), (0b000011, 6), (0b110100, 6), (0b110101, 6),
    (0b101010, 6), (0b101011, 6), (0b0100111, 7), (0b0001100, 7),
    (0b0001000, 7), (0b0010111, 7), (0b0000011, 7), (0b0000100, 7),
    (0b0101000, 7), (0b0101011, 7), (0b0010011, 7), (0b0100100, 7),
    (0b0011000, 7), (0b00000010, 8), (0b00000011, 8), (0b00011010, 8),
    (0b00011011, 8), (0b00010010, 8), (0b00010011, 8), (0b00010100, 8),
    (0b00010101, 8), (0b00010110, 8), (0b00010111, 8), (0b00101000, 8),
    (0b00101001, 8), (0b00101010, 8), (0b00101011, 8), (0b00101100, 8),
    (0b00101101, 8), (0b00000100, 8), (0b00000101, 8), (0b00001010, 8),
    (0b00001011, 8), (0b01010010, 8), (0b01010011, 8), (0b01010100, 8),
    (0b01010101, 8), (0b00100100, 8), (0b00100101, 8), (0b01011000, 8),
    (0b01011001, 8), (0b01011010, 8), (0b01011011, 8), (0b01001010, 8),
    (0b01001011, 8), (0b00110010, 8), (0b00110011, 8), (0b00110100, 8),
];

// Indexed by run / 64 - 1, runs 64 up to 1728.
#[rustfmt::skip]
const WHITE_MAKEUP: [(u16, u8); 27] = [
    (0b11011, 5), (0b10010, 5), (0b010111, 6), (0b0110111, 7),
    (0b00110110, 8), (0b00110111, 8), (0b01100100, 8), (0b01100101, 8),
    (0b01101000, 8), (0b01100111, 8), (0b011001100, 9), (0b011001101, 9),
    (0b011010010, 9), (0b011010011, 9), (0b011010100, 9), (0b011010101, 9),
    (0b011010110, 9), (0b011010111, 9), (0b011011000, 9), (0b011011001, 9),
    (0b011011010, 9), (0b011011011, 9), (0b010011000, 9), (0b010011001, 9),
    (0b010011010, 9), (0b011000, 6), (0b010011011, 9),
];

#[rustfmt::skip]
const BLACK_TERMINATING: [(u16, u8); 64] = [
    (0b0000110111, 10), (0b010, 3), (0b11, 2), (0b10, 2),
    (0b011, 3), (0b0011, 4), (0b0010, 4), (0b00011, 5),
    (0b000101, 6), (0b000100, 6), (0b0000100, 7), (0b0000101, 7),
    (0b0000111, 7), (0b00000100, 8), (0b00000111, 8), (0b000011000, 9),
    (0b0000010111, 10), (0b0000011000, 10), (0b0000001000, 10), (0b00001100111, 11),
    (0b00001101000, 11), (0b00001101100, 11), (0b00000110111, 11), (0b00000101000, 11),
    (0b00000010111, 11), (0b00000011000, 11), (0b000011001010, 12), (0b000011001011, 12),
    (0b000011001100, 12), (0b000011001101, 12), (0b000001101000, 12), (0b000001101001, 12),
    (0b000001101010, 12), (0b000001101011, 12), (0b000011010010, 12), (0b000011010011, 12),
    (0b000011010100, 12), (0b000011010101, 12), (0b000011010110, 12), (0b000011010111, 12),
    (0b000001101100, 12), (0b000001101101, 12), (0b000011011010, 12), (0b000011011011, 12),
    (0b000001010100, 12), (0b000001010101, 12), (0b000001010110, 12), (0b000001010111, 12),
    (0b000001100100, 12), (0b000001100101, 12), (0b000001010010, 12), (0b000001010011, 12),
    (0b000000100100, 12), (0b000000110111, 12), (0b000000111000, 12), (0b000000100111, 12),
    (0b000000101000, 12), (0b000001011000, 12), (0b000001011001, 12), (0b000000101011, 12),
    (0b000000101100, 12), (0b000001011010, 12), (0b000001100110, 12), (0b000001100111, 12),
];

#[rustfmt::skip]
const BLACK_MAKEUP: [(u16, u8); 27] = [
    (0b0000001111, 10), (0b000011001000, 12), (0b000011001001, 12), (0b000001011011, 12),
    (0b000000110011, 12), (0b000000110100, 12), (0b000000110101, 12), (0b0000001101100, 13),
    (0b0000001101101, 13), (0b0000001001010, 13), (0b0000001001011, 13), (0b0000001001100, 13),
    (0b0000001001101, 13), (0b0000001110010, 13), (0b0000001110011, 13), (0b0000001110100, 13),
    (0b0000001110101, 13), (0b0000001110110, 13), (0b0000001110111, 13), (0b0000001010010, 13),
    (0b0000001010011, 13), (0b0000001010100, 13), (0b0000001010101, 13), (0b0000001011010, 13),
    (0b0000001011011, 13), (0b0000001100100, 13), (0b0000001100101, 13),
];

// Runs 1792 up to 2560, shared by both colors.
#[rustfmt::skip]
const EXTENDED_MAKEUP: [(u16, u8); 13] = [
    (0b00000001000, 11), (0b00000001100, 11), (0b00000001101, 11), (0b000000010010, 12),
    (0b000000010011, 12), (0b000000010100, 12), (0b000000010101, 12), (0b000000010110, 12),
    (0b000000010111, 12), (0b000000011100, 12), (0b000000011101, 12), (0b000000011110, 12),
    (0b000000011111, 12),
];

const EOL: (u16, u8) = (0b000000000001, 12);
const PASS: (u16, u8) = (0b0001, 4);
const HORIZONTAL: (u16, u8) = (0b001, 3);
// Vertical codes for offsets -3 to 3.
#[rustfmt::skip]
const VERTICAL: [(u16, u8); 7] = [
    (0b0000010, 7), (0b000010, 6), (0b010, 3), (0b1, 1), (0b011, 3), (0b000011, 6), (0b0000011, 7),
];

const WHITE: u8 = 0;

struct BitWriter {
    bytes: Vec<u8>,
    acc: u64,
    nbits: u32,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            acc: 0,
            nbits: 0,
        }
    }

    fn push(&mut self, (code, len): (u16, u8)) {
        self.acc = (self.acc << len) | u64::from(code);
        self.nbits += u32::from(len);
        while self.nbits >= 8 {
            self.nbits -= 8;
            self.bytes.push((self.acc >> self.nbits) as u8);
        }
        self.acc &= (1u64 << self.nbits) - 1;
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.bytes.push((self.acc << (8 - self.nbits)) as u8);
        }
        self.bytes
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0 }
    }

    /// The next `n` bits without consuming them, zero padded past the end.
    fn peek(&self, n: u8) -> u16 {
        let byte = self.pos / 8;
        let mut window: u64 = 0;
        for i in 0..4 {
            window = (window << 8) | u64::from(self.data.get(byte + i).copied().unwrap_or(0));
        }
        ((window >> (32 - u32::from(n) - (self.pos % 8) as u32)) & ((1u64 << n) - 1)) as u16
    }

    fn skip(&mut self, n: u8) {
        self.pos += n as usize;
    }
}

/// Positions where the pixel color changes, assuming an imaginary white
/// pixel before the row. Even indices change to black, odd back to white.
fn transitions(row: &[u8]) -> Vec<usize> {
    let mut result = Vec::new();
    let mut color = WHITE;
    for (i, &px) in row.iter().enumerate() {
        let px = u8::from(px != 0);
        if px != color {
            result.push(i);
            color = px;
        }
    }
    result
}

/// b1 and b2 for the current coding state: the first reference transition
/// right of `a0` toward the color opposite to `a0_color`, and the one after.
fn reference_pair(reference: &[usize], a0: i64, a0_color: u8, width: usize) -> (usize, usize) {
    let parity = usize::from(a0_color != WHITE);
    for (k, &pos) in reference.iter().enumerate() {
        if (pos as i64) > a0 && k % 2 == parity {
            let b2 = reference.get(k + 1).copied().unwrap_or(width);
            return (pos, b2);
        }
    }
    (width, width)
}

fn makeup_code(run: usize, color: u8) -> (u16, u8) {
    if run <= 1728 {
        let table = if color == WHITE { &WHITE_MAKEUP } else { &BLACK_MAKEUP };
        table[run / 64 - 1]
    } else {
        EXTENDED_MAKEUP[(run - 1792) / 64]
    }
}

fn encode_run(writer: &mut BitWriter, mut run: usize, color: u8) {
    while run >= 2624 {
        writer.push(EXTENDED_MAKEUP[12]);
        run -= 2560;
    }
    if run >= 64 {
        writer.push(makeup_code(run / 64 * 64, color));
        run %= 64;
    }
    let table = if color == WHITE { &WHITE_TERMINATING } else { &BLACK_TERMINATING };
    writer.push(table[run]);
}

fn encode_row(writer: &mut BitWriter, current: &[usize], reference: &[usize], width: usize) {
    let mut a0: i64 = -1;
    let mut a0_color = WHITE;
    let mut next = 0;

    loop {
        let a1 = current.get(next).copied().unwrap_or(width);
        let (b1, b2) = reference_pair(reference, a0, a0_color, width);

        if b2 < a1 {
            writer.push(PASS);
            a0 = b2 as i64;
        } else if (a1 as i64 - b1 as i64).unsigned_abs() <= 3 {
            let delta = a1 as i64 - b1 as i64;
            writer.push(VERTICAL[(delta + 3) as usize]);
            a0 = a1 as i64;
            a0_color ^= 1;
            next += 1;
        } else {
            let a2 = current.get(next + 1).copied().unwrap_or(width);
            writer.push(HORIZONTAL);
            encode_run(writer, a1 - a0.max(0) as usize, a0_color);
            encode_run(writer, a2 - a1, a0_color ^ 1);
            a0 = a2 as i64;
            next += 2;
        }

        if a0 >= width as i64 {
            break;
        }
    }
}

/// Encodes unpacked bilevel samples. Nonzero samples count as black.
pub fn encode(samples: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if width == 0 || height == 0 || samples.len() != width * height {
        return Err(Error::SizeMismatch {
            size1: (width, height),
            size2: (samples.len(), 1),
        });
    }

    let mut writer = BitWriter::new();
    let mut reference: Vec<usize> = Vec::new();

    for row in samples.chunks_exact(width) {
        let current = transitions(row);
        encode_row(&mut writer, &current, &reference, width);
        reference = current;
    }

    writer.push(EOL);
    writer.push(EOL);
    Ok(writer.finish())
}

enum Mode {
    Pass,
    Horizontal,
    Vertical(i64),
    EndOfBlock,
}

fn read_mode(reader: &mut BitReader) -> Result<Mode> {
    if reader.peek(1) == 0b1 {
        reader.skip(1);
        return Ok(Mode::Vertical(0));
    }
    match reader.peek(3) {
        0b011 => {
            reader.skip(3);
            return Ok(Mode::Vertical(1));
        }
        0b010 => {
            reader.skip(3);
            return Ok(Mode::Vertical(-1));
        }
        0b001 => {
            reader.skip(3);
            return Ok(Mode::Horizontal);
        }
        _ => {}
    }
    if reader.peek(4) == 0b0001 {
        reader.skip(4);
        return Ok(Mode::Pass);
    }
    match reader.peek(6) {
        0b000011 => {
            reader.skip(6);
            return Ok(Mode::Vertical(2));
        }
        0b000010 => {
            reader.skip(6);
            return Ok(Mode::Vertical(-2));
        }
        _ => {}
    }
    match reader.peek(7) {
        0b0000011 => {
            reader.skip(7);
            return Ok(Mode::Vertical(3));
        }
        0b0000010 => {
            reader.skip(7);
            return Ok(Mode::Vertical(-3));
        }
        _ => {}
    }
    if reader.peek(12) == EOL.0 {
        reader.skip(12);
        return Ok(Mode::EndOfBlock);
    }

    Err(Error::TruncatedData("Corrupt mode code in G4 stream".to_string()))
}

fn read_run(reader: &mut BitReader, color: u8) -> Result<usize> {
    let (terminating, makeup): (&[(u16, u8)], &[(u16, u8)]) = if color == WHITE {
        (&WHITE_TERMINATING, &WHITE_MAKEUP)
    } else {
        (&BLACK_TERMINATING, &BLACK_MAKEUP)
    };

    let mut total = 0usize;
    loop {
        let peeked = reader.peek(13);
        let mut matched = None;

        for (run, &(code, len)) in terminating.iter().enumerate() {
            if peeked >> (13 - len) == code {
                matched = Some((run, len, true));
                break;
            }
        }
        if matched.is_none() {
            for (i, &(code, len)) in makeup.iter().enumerate() {
                if peeked >> (13 - len) == code {
                    matched = Some(((i + 1) * 64, len, false));
                    break;
                }
            }
        }
        if matched.is_none() {
            for (i, &(code, len)) in EXTENDED_MAKEUP.iter().enumerate() {
                if peeked >> (13 - len) == code {
                    matched = Some((1792 + i * 64, len, false));
                    break;
                }
            }
        }

        let Some((run, len, is_terminating)) = matched else {
            return Err(Error::TruncatedData("Corrupt run code in G4 stream".to_string()));
        };

        reader.skip(len);
        total += run;
        if is_terminating {
            return Ok(total);
        }
    }
}

/// Decodes a G4 stream back into unpacked samples, one byte per pixel.
pub fn decode(encoded: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidArgument("Bilevel dimensions must be nonzero".to_string()));
    }

    let corrupt = || Error::TruncatedData("Inconsistent run geometry in G4 stream".to_string());

    let mut reader = BitReader::new(encoded);
    let mut samples = vec![0u8; width * height];
    let mut reference: Vec<usize> = Vec::new();

    for row in samples.chunks_exact_mut(width) {
        let mut current: Vec<usize> = Vec::new();
        let mut a0: i64 = -1;
        let mut a0_color = WHITE;

        loop {
            let (b1, b2) = reference_pair(&reference, a0, a0_color, width);

            match read_mode(&mut reader)? {
                Mode::Pass => {
                    if a0_color != WHITE {
                        row[a0.max(0) as usize..b2].fill(1);
                    }
                    a0 = b2 as i64;
                }
                Mode::Vertical(delta) => {
                    let a1 = b1 as i64 + delta;
                    if a1 <= a0 || a1 > width as i64 {
                        return Err(corrupt());
                    }
                    if a0_color != WHITE {
                        row[a0.max(0) as usize..a1 as usize].fill(1);
                    }
                    if (a1 as usize) < width {
                        current.push(a1 as usize);
                    }
                    a0 = a1;
                    a0_color ^= 1;
                }
                Mode::Horizontal => {
                    let start = a0.max(0) as usize;
                    let a1 = start + read_run(&mut reader, a0_color)?;
                    let a2 = a1 + read_run(&mut reader, a0_color ^ 1)?;
                    if a2 > width {
                        return Err(corrupt());
                    }
                    if a0_color != WHITE {
                        row[start..a1].fill(1);
                    } else {
                        row[a1..a2].fill(1);
                    }
                    if a1 < width {
                        current.push(a1);
                    }
                    if a2 < width {
                        current.push(a2);
                    }
                    a0 = a2 as i64;
                }
                Mode::EndOfBlock => {
                    return Err(Error::TruncatedData("G4 stream ended before the last row".to_string()));
                }
            }

            if a0 >= width as i64 {
                break;
            }
        }

        reference = current;
    }

    Ok(samples)
}
