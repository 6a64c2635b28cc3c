//! Built-in Helvetica faces: resource names, glyph advance widths and
//! WinAnsi encoding. Nothing is embedded, every viewer ships these.

/// Advance widths for printable ASCII (0x20..=0x7E), 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0' - '?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@' - 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P' - '_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`' - 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p' - '~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0' - '?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@' - 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P' - '_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`' - 'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p' - '~'
];

/// Advance widths for the Latin-1 half of WinAnsi (0xA0..=0xFF).
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp - macron
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree - questiondown
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave - Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth - germandbls
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // agrave - idieresis
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // eth - ydieresis
];

const HELVETICA_BOLD_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp - macron
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree - questiondown
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave - Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth - germandbls
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // agrave - idieresis
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // eth - ydieresis
];

/// Unmappable characters are drawn as '?'.
const REPLACEMENT: char = '?';

/// Distance from the top of a line box to the baseline, in em.
pub const ASCENT: f32 = 0.718;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub const ALL: [FontFace; 2] = [FontFace::Regular, FontFace::Bold];

    pub fn base_font(&self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"Helvetica",
            FontFace::Bold => b"Helvetica-Bold",
        }
    }

    /// Name under which the face is registered in page resources.
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"F1",
            FontFace::Bold => b"F2",
        }
    }

    fn widths(&self) -> (&'static [u16; 95], &'static [u16; 96]) {
        match self {
            FontFace::Regular => (&HELVETICA_WIDTHS, &HELVETICA_LATIN1_WIDTHS),
            FontFace::Bold => (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_LATIN1_WIDTHS),
        }
    }

    fn units(&self, c: char) -> u16 {
        let (ascii, latin1) = self.widths();
        match c as u32 {
            code @ 0x20..=0x7E => ascii[(code - 0x20) as usize],
            code @ 0xA0..=0xFF => latin1[(code - 0xA0) as usize],
            _ => ascii[(REPLACEMENT as u32 - 0x20) as usize],
        }
    }

    pub fn char_width(&self, c: char, size: f32) -> f32 {
        self.units(c) as f32 * size / 1000.0
    }

    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, size)).sum()
    }

    /// Cuts `text` to fit `max_width`, ending with "..." when shortened.
    pub fn truncate_to_width(&self, text: &str, size: f32, max_width: f32) -> String {
        if self.text_width(text, size) <= max_width {
            return text.to_string();
        }

        let ellipsis = "...";
        let budget = max_width - self.text_width(ellipsis, size);
        let mut width = 0.0;
        let mut out = String::new();
        for c in text.chars() {
            let w = self.char_width(c, size);
            if width + w > budget {
                break;
            }
            width += w;
            out.push(c);
        }
        out.push_str(ellipsis);
        out
    }
}

/// Encodes text for a WinAnsi simple font. Latin-1 maps through directly,
/// the rest becomes '?'.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => REPLACEMENT as u8,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_afm() {
        assert_eq!(FontFace::Regular.text_width("0", 1000.0), 556.0);
        assert_eq!(FontFace::Regular.text_width("W", 1000.0), 944.0);
        assert_eq!(FontFace::Bold.text_width("i", 1000.0), 278.0);
        assert!((FontFace::Regular.text_width("INVOICE", 20.0) - 20.0 * 4.112).abs() < 1e-2);
    }

    #[test]
    fn latin1_widths_match_afm() {
        assert_eq!(FontFace::Regular.text_width("é", 1000.0), 556.0);
        assert_eq!(FontFace::Regular.text_width("©", 1000.0), 737.0);
        assert_eq!(FontFace::Regular.text_width("Æ", 1000.0), 1000.0);
        assert_eq!(FontFace::Regular.text_width("ç", 1000.0), 500.0);
        assert_eq!(FontFace::Regular.text_width("\u{a0}", 1000.0), 278.0);
        assert_eq!(FontFace::Bold.text_width("ß", 1000.0), 611.0);
        assert_eq!(FontFace::Bold.text_width("Ü", 1000.0), 722.0);
        assert_eq!(FontFace::Bold.text_width("ÿ", 1000.0), 556.0);
        // C a f é
        assert_eq!(FontFace::Regular.text_width("Café", 1000.0), 722.0 + 556.0 + 278.0 + 556.0);
    }

    #[test]
    fn unmappable_characters_measure_as_their_replacement() {
        assert_eq!(
            FontFace::Bold.text_width("→", 10.0),
            FontFace::Bold.text_width("?", 10.0)
        );
        assert_eq!(FontFace::Regular.text_width("\u{2013}", 1000.0), 556.0);
    }

    #[test]
    fn truncation_respects_width() {
        let face = FontFace::Regular;
        let long = "Hardwood flooring install including subfloor prep and trim";
        let cut = face.truncate_to_width(long, 10.0, 100.0);
        assert!(cut.ends_with("..."));
        assert!(face.text_width(&cut, 10.0) <= 100.0 + 1e-3);
        assert_eq!(face.truncate_to_width("Tile", 10.0, 100.0), "Tile");
    }

    #[test]
    fn win_ansi_replaces_unmappable() {
        assert_eq!(encode_win_ansi("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("→"), vec![b'?']);
    }
}
