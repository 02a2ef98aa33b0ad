//! ESC/POS command bytes for Posiflex-compatible receipt printers

use crate::model::{Parameters, Task};
use std::time::Duration;

pub const ESC: u8 = 0x1B;
pub const GS: u8 = 0x1D;
pub const LF: u8 = 0x0A;

/// `ESC !` print mode bits
pub const FONT_BOLD: u8 = 0x08;
pub const FONT_DOUBLE_HEIGHT: u8 = 0x20;
pub const FONT_UNDERLINE: u8 = 0x80;

/// Code page 1251 as numbered by Posiflex firmware
pub const CODE_PAGE_1251_POSIFLEX: i32 = 28;
/// Code page 1251 as numbered by Atol firmware
pub const CODE_PAGE_1251_ATOL: i32 = 6;

/// Pause after a cut so the blade finishes before the next line
pub const CUT_DELAY: Duration = Duration::from_millis(200);

/// Select the code page, then the USA international character set
pub fn begin(code_page: i32) -> Vec<u8> {
    vec![ESC, 0x74, (code_page & 0xFF) as u8, ESC, 0x52, 0x00]
}

/// Disable automatic status back (also clears the printer buffer)
pub fn end() -> [u8; 3] {
    [GS, 0x61, 0x00]
}

/// Partial cut
pub fn cut() -> [u8; 3] {
    [GS, 0x56, 0x01]
}

/// `ESC !` argument for the two built-in fonts
pub fn font_flags(param: &Parameters) -> u8 {
    let mut font = 0u8;
    if param.bold == Some(true) {
        font |= FONT_BOLD;
    }
    if param.double_height == Some(true) {
        font |= FONT_DOUBLE_HEIGHT;
    }
    if param.underline == Some(true) {
        font |= FONT_UNDERLINE;
    }
    font
}

/// Print mode, justification, cp1251 text and a line feed
pub fn text_line(task: &Task) -> Vec<u8> {
    let text = encode_cp1251(&task.data);
    let mut bytes = Vec::with_capacity(text.len() + 7);
    bytes.extend_from_slice(&[
        ESC,
        0x21,
        font_flags(&task.param),
        ESC,
        0x61,
        task.param.alignment_or_default().escpos_code(),
    ]);
    bytes.extend_from_slice(&text);
    bytes.push(LF);
    bytes
}

/// Time the printer needs for a line of `text`, assuming about 36 chars per row
pub fn line_delay(text: &str) -> Duration {
    let chars = text.chars().count() as u64;
    Duration::from_millis(20 * (1 + chars / 12))
}

/// Encode text in Windows-1251; characters outside it become `?`
pub fn encode_cp1251(text: &str) -> Vec<u8> {
    text.chars().map(cp1251_byte).collect()
}

fn cp1251_byte(c: char) -> u8 {
    let code = c as u32;
    match code {
        0x00..=0x7F => code as u8,
        0x0410..=0x044F => (code - 0x0410 + 0xC0) as u8,
        _ => CP1251_HIGH
            .iter()
            .position(|&u| u == code)
            .map(|i| 0x80 + i as u8)
            .unwrap_or(b'?'),
    }
}

/// Unicode code points of bytes 0x80..=0xBF
///
/// 0x98 is unassigned and holds 0, which the ASCII arm always claims first.
const CP1251_HIGH: [u32; 64] = [
    0x0402, 0x0403, 0x201A, 0x0453, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x20AC, 0x2030, 0x0409, 0x2039, 0x040A, 0x040C, 0x040B, 0x040F, //
    0x0452, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x0000, 0x2122, 0x0459, 0x203A, 0x045A, 0x045C, 0x045B, 0x045F, //
    0x00A0, 0x040E, 0x045E, 0x0408, 0x00A4, 0x0490, 0x00A6, 0x00A7, //
    0x0401, 0x00A9, 0x0404, 0x00AB, 0x00AC, 0x00AD, 0x00AE, 0x0407, //
    0x00B0, 0x00B1, 0x0406, 0x0456, 0x0491, 0x00B5, 0x00B6, 0x00B7, //
    0x0451, 0x2116, 0x0454, 0x00BB, 0x0458, 0x0405, 0x0455, 0x0457, //
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alignment;

    #[test]
    fn test_begin_sequence() {
        assert_eq!(begin(28), vec![0x1B, 0x74, 28, 0x1B, 0x52, 0x00]);
        assert_eq!(begin(CODE_PAGE_1251_ATOL)[2], 6);
    }

    #[test]
    fn test_end_and_cut() {
        assert_eq!(end(), [0x1D, 0x61, 0x00]);
        assert_eq!(cut(), [0x1D, 0x56, 0x01]);
    }

    #[test]
    fn test_font_flags() {
        let mut param = Parameters::default();
        assert_eq!(font_flags(&param), 0);
        param.bold = Some(true);
        param.underline = Some(true);
        assert_eq!(font_flags(&param), 0x88);
        param.double_height = Some(true);
        param.bold = Some(false);
        assert_eq!(font_flags(&param), 0xA0);
    }

    #[test]
    fn test_text_line_layout() {
        let task = Task::text("Hi").aligned(Alignment::Center);
        assert_eq!(
            text_line(&task),
            vec![0x1B, 0x21, 0x00, 0x1B, 0x61, 0x01, b'H', b'i', 0x0A]
        );
    }

    #[test]
    fn test_cp1251_cyrillic() {
        assert_eq!(encode_cp1251("Аая"), vec![0xC0, 0xE0, 0xFF]);
        assert_eq!(encode_cp1251("Ёё№"), vec![0xA8, 0xB8, 0xB9]);
    }

    #[test]
    fn test_cp1251_unmappable() {
        assert_eq!(encode_cp1251("a€✓"), vec![b'a', 0x88, b'?']);
    }

    #[test]
    fn test_cp1251_unassigned_slot() {
        assert_eq!(encode_cp1251("\u{FFFF}\u{0098}"), vec![b'?', b'?']);
        assert!(!encode_cp1251("\u{0}").contains(&0x98));
    }

    #[test]
    fn test_line_delay() {
        assert_eq!(line_delay(""), Duration::from_millis(20));
        assert_eq!(line_delay("123456789012"), Duration::from_millis(40));
        assert_eq!(line_delay("Привет"), Duration::from_millis(20));
    }
}
