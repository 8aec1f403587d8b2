// Glyph table: 7×5 bitmaps for every character the calendar can draw.
//
// Rows map to weekdays (top = first day of the week), columns map to weeks.
// The table is static data; `lookup` is the only way in.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Columns per glyph (one column per week).
pub const GLYPH_WIDTH: usize = 5;
/// Rows per glyph (one row per weekday).
pub const GLYPH_HEIGHT: usize = 7;

/// A fixed-size binary bitmap for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph {
    rows: [u8; GLYPH_HEIGHT],
}

impl Glyph {
    /// Build a glyph from row strings where `#` marks a set cell and `.` a
    /// blank one. Malformed rows fail const evaluation.
    pub const fn from_rows(rows: [&str; GLYPH_HEIGHT]) -> Self {
        let mut bits = [0u8; GLYPH_HEIGHT];
        let mut row = 0;
        while row < GLYPH_HEIGHT {
            let cells = rows[row].as_bytes();
            assert!(cells.len() == GLYPH_WIDTH, "glyph rows must be exactly 5 cells wide");
            let mut col = 0;
            while col < GLYPH_WIDTH {
                match cells[col] {
                    b'#' => bits[row] |= 1u8 << (GLYPH_WIDTH - 1 - col),
                    b'.' => {}
                    _ => panic!("glyph cells must be `#` or `.`"),
                }
                col += 1;
            }
            row += 1;
        }
        Self { rows: bits }
    }

    /// Whether the cell at `row` (0..7) and `col` (0..5) is set.
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        if row >= GLYPH_HEIGHT || col >= GLYPH_WIDTH {
            return false;
        }
        self.rows[row] & (1u8 << (GLYPH_WIDTH - 1 - col)) != 0
    }

    /// Number of set cells, i.e. coordinates this glyph produces.
    pub fn set_cells(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|row| *row == 0)
    }
}

/// Shared glyph for characters without their own bitmap: a hollow box.
pub static FALLBACK: Glyph = Glyph::from_rows([
    "#####",
    "#...#",
    "#...#",
    "#...#",
    "#...#",
    "#...#",
    "#####",
]);

/// Look up the glyph for `ch`, normalizing to uppercase first.
///
/// Unsupported characters resolve to [`FALLBACK`] instead of failing, so one
/// odd character degrades a pattern rather than rejecting it.
pub fn lookup(ch: char) -> &'static Glyph {
    table().get(&normalize_char(ch)).unwrap_or(&FALLBACK)
}

/// Whether `ch` (after uppercasing) has a dedicated glyph.
pub fn is_supported(ch: char) -> bool {
    table().contains_key(&normalize_char(ch))
}

/// Every character with a dedicated glyph, in table order.
pub fn supported_characters() -> impl Iterator<Item = char> {
    GLYPH_DATA.iter().map(|(ch, _)| *ch)
}

fn normalize_char(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

fn table() -> &'static HashMap<char, Glyph> {
    static TABLE: OnceLock<HashMap<char, Glyph>> = OnceLock::new();
    TABLE.get_or_init(|| GLYPH_DATA.iter().copied().collect())
}

#[rustfmt::skip]
static GLYPH_DATA: &[(char, Glyph)] = &[
    ('A', Glyph::from_rows([".###.", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"])),
    ('B', Glyph::from_rows(["####.", "#...#", "#...#", "####.", "#...#", "#...#", "####."])),
    ('C', Glyph::from_rows([".###.", "#...#", "#....", "#....", "#....", "#...#", ".###."])),
    ('D', Glyph::from_rows(["####.", "#...#", "#...#", "#...#", "#...#", "#...#", "####."])),
    ('E', Glyph::from_rows(["#####", "#....", "#....", "####.", "#....", "#....", "#####"])),
    ('F', Glyph::from_rows(["#####", "#....", "#....", "####.", "#....", "#....", "#...."])),
    ('G', Glyph::from_rows([".###.", "#...#", "#....", "#.###", "#...#", "#...#", ".###."])),
    ('H', Glyph::from_rows(["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"])),
    ('I', Glyph::from_rows(["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "#####"])),
    ('J', Glyph::from_rows(["..###", "...#.", "...#.", "...#.", "...#.", "#..#.", ".##.."])),
    ('K', Glyph::from_rows(["#...#", "#..#.", "#.#..", "##...", "#.#..", "#..#.", "#...#"])),
    ('L', Glyph::from_rows(["#....", "#....", "#....", "#....", "#....", "#....", "#####"])),
    ('M', Glyph::from_rows(["#...#", "##.##", "#.#.#", "#.#.#", "#...#", "#...#", "#...#"])),
    ('N', Glyph::from_rows(["#...#", "#...#", "##..#", "#.#.#", "#..##", "#...#", "#...#"])),
    ('O', Glyph::from_rows([".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."])),
    ('P', Glyph::from_rows(["####.", "#...#", "#...#", "####.", "#....", "#....", "#...."])),
    ('Q', Glyph::from_rows([".###.", "#...#", "#...#", "#...#", "#.#.#", "#..#.", ".##.#"])),
    ('R', Glyph::from_rows(["####.", "#...#", "#...#", "####.", "#.#..", "#..#.", "#...#"])),
    ('S', Glyph::from_rows([".####", "#....", "#....", ".###.", "....#", "....#", "####."])),
    ('T', Glyph::from_rows(["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."])),
    ('U', Glyph::from_rows(["#...#", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."])),
    ('V', Glyph::from_rows(["#...#", "#...#", "#...#", "#...#", "#...#", ".#.#.", "..#.."])),
    ('W', Glyph::from_rows(["#...#", "#...#", "#...#", "#.#.#", "#.#.#", "#.#.#", ".#.#."])),
    ('X', Glyph::from_rows(["#...#", "#...#", ".#.#.", "..#..", ".#.#.", "#...#", "#...#"])),
    ('Y', Glyph::from_rows(["#...#", "#...#", ".#.#.", "..#..", "..#..", "..#..", "..#.."])),
    ('Z', Glyph::from_rows(["#####", "....#", "...#.", "..#..", ".#...", "#....", "#####"])),
    ('0', Glyph::from_rows([".###.", "#...#", "#..##", "#.#.#", "##..#", "#...#", ".###."])),
    ('1', Glyph::from_rows(["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."])),
    ('2', Glyph::from_rows([".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"])),
    ('3', Glyph::from_rows(["#####", "...#.", "..#..", "...#.", "....#", "#...#", ".###."])),
    ('4', Glyph::from_rows(["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."])),
    ('5', Glyph::from_rows(["#####", "#....", "####.", "....#", "....#", "#...#", ".###."])),
    ('6', Glyph::from_rows(["..##.", ".#...", "#....", "####.", "#...#", "#...#", ".###."])),
    ('7', Glyph::from_rows(["#####", "....#", "...#.", "..#..", ".#...", ".#...", ".#..."])),
    ('8', Glyph::from_rows([".###.", "#...#", "#...#", ".###.", "#...#", "#...#", ".###."])),
    ('9', Glyph::from_rows([".###.", "#...#", "#...#", ".####", "....#", "...#.", ".##.."])),
    (' ', Glyph::from_rows([".....", ".....", ".....", ".....", ".....", ".....", "....."])),
    ('!', Glyph::from_rows(["..#..", "..#..", "..#..", "..#..", "..#..", ".....", "..#.."])),
    ('?', Glyph::from_rows([".###.", "#...#", "....#", "...#.", "..#..", ".....", "..#.."])),
    ('.', Glyph::from_rows([".....", ".....", ".....", ".....", ".....", ".##..", ".##.."])),
    (',', Glyph::from_rows([".....", ".....", ".....", ".....", ".##..", "..#..", ".#..."])),
    (':', Glyph::from_rows([".....", ".##..", ".##..", ".....", ".##..", ".##..", "....."])),
    (';', Glyph::from_rows([".....", ".##..", ".##..", ".....", ".##..", "..#..", ".#..."])),
    ('-', Glyph::from_rows([".....", ".....", ".....", "#####", ".....", ".....", "....."])),
    ('+', Glyph::from_rows([".....", "..#..", "..#..", "#####", "..#..", "..#..", "....."])),
    ('=', Glyph::from_rows([".....", ".....", "#####", ".....", "#####", ".....", "....."])),
    ('_', Glyph::from_rows([".....", ".....", ".....", ".....", ".....", ".....", "#####"])),
    ('\'', Glyph::from_rows(["..#..", "..#..", ".#...", ".....", ".....", ".....", "....."])),
    ('"', Glyph::from_rows([".#.#.", ".#.#.", ".#.#.", ".....", ".....", ".....", "....."])),
    ('/', Glyph::from_rows([".....", "....#", "...#.", "..#..", ".#...", "#....", "....."])),
    ('\\', Glyph::from_rows([".....", "#....", ".#...", "..#..", "...#.", "....#", "....."])),
    ('(', Glyph::from_rows(["...#.", "..#..", ".#...", ".#...", ".#...", "..#..", "...#."])),
    (')', Glyph::from_rows([".#...", "..#..", "...#.", "...#.", "...#.", "..#..", ".#..."])),
    ('<', Glyph::from_rows(["...#.", "..#..", ".#...", "#....", ".#...", "..#..", "...#."])),
    ('>', Glyph::from_rows([".#...", "..#..", "...#.", "....#", "...#.", "..#..", ".#..."])),
    ('#', Glyph::from_rows([".#.#.", ".#.#.", "#####", ".#.#.", "#####", ".#.#.", ".#.#."])),
    ('*', Glyph::from_rows([".....", "..#..", "#.#.#", ".###.", "#.#.#", "..#..", "....."])),
    ('@', Glyph::from_rows([".###.", "#...#", "....#", ".##.#", "#.#.#", "#.#.#", ".###."])),
    ('&', Glyph::from_rows([".##..", "#..#.", "#.#..", ".#...", "#.#.#", "#..#.", ".##.#"])),
    ('%', Glyph::from_rows(["##...", "##..#", "...#.", "..#..", ".#...", "#..##", "...##"])),
    ('$', Glyph::from_rows(["..#..", ".####", "#.#..", ".###.", "..#.#", "####.", "..#.."])),
    ('^', Glyph::from_rows(["..#..", ".#.#.", "#...#", ".....", ".....", ".....", "....."])),
    ('~', Glyph::from_rows([".....", ".....", ".#...", "#.#.#", "...#.", ".....", "....."])),
    ('|', Glyph::from_rows(["..#..", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."])),
    ('[', Glyph::from_rows([".###.", ".#...", ".#...", ".#...", ".#...", ".#...", ".###."])),
    (']', Glyph::from_rows([".###.", "...#.", "...#.", "...#.", "...#.", "...#.", ".###."])),
    ('♥', Glyph::from_rows([".....", ".#.#.", "#####", "#####", ".###.", "..#..", "....."])),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup('a'), lookup('A'));
        assert_eq!(lookup('z'), lookup('Z'));
    }

    #[test]
    fn unknown_characters_share_the_fallback_glyph() {
        assert_eq!(lookup('€'), &FALLBACK);
        assert_eq!(lookup('λ'), &FALLBACK);
        assert!(!is_supported('€'));
    }

    #[test]
    fn space_is_supported_and_blank() {
        assert!(is_supported(' '));
        assert!(lookup(' ').is_blank());
        assert_eq!(lookup(' ').set_cells(), 0);
    }

    #[test]
    fn table_has_one_entry_per_character() {
        let mut seen = std::collections::HashSet::new();
        for ch in supported_characters() {
            assert!(seen.insert(ch), "duplicate glyph for {ch:?}");
        }
        assert_eq!(seen.len(), table().len());
    }

    #[test]
    fn letters_and_digits_are_all_supported() {
        for ch in ('A'..='Z').chain('0'..='9') {
            assert!(is_supported(ch), "missing glyph for {ch}");
            assert_ne!(lookup(ch), &FALLBACK, "{ch} should not render as the fallback");
        }
    }

    #[test]
    fn from_rows_reads_cells_left_to_right() {
        let glyph = Glyph::from_rows(["#....", "....#", ".....", ".....", ".....", ".....", "..#.."]);
        assert!(glyph.is_set(0, 0));
        assert!(!glyph.is_set(0, 4));
        assert!(glyph.is_set(1, 4));
        assert!(glyph.is_set(6, 2));
        assert_eq!(glyph.set_cells(), 3);
    }

    #[test]
    fn is_set_out_of_range_is_false() {
        assert!(!FALLBACK.is_set(7, 0));
        assert!(!FALLBACK.is_set(0, 5));
    }

    #[test]
    fn h_glyph_has_expected_shape() {
        let h = lookup('h');
        for row in 0..GLYPH_HEIGHT {
            assert!(h.is_set(row, 0));
            assert!(h.is_set(row, 4));
            assert_eq!(h.is_set(row, 2), row == 3);
        }
        assert_eq!(h.set_cells(), 17);
    }
}
