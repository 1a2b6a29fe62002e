//! Code 128 decoding over a single run-length-encoded scanline.
//!
//! Each symbol is 11 modules wide, split over 3 bars and 3 spaces; the
//! stop pattern is 13 modules over 4 bars and 3 spaces. A symbol window
//! is normalized to module counts by its own total width, so the decoder
//! is insensitive to absolute bar width.

/// Bar/space module widths for symbol values 0..=105.
/// 103..=105 are the Start A/B/C symbols.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2],
    [2, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 1],
    [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3],
    [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2],
    [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2],
    [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2],
    [1, 2, 2, 1, 3, 2],
    [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2],
    [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1],
    [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1],
    [2, 1, 3, 2, 1, 2],
    [2, 2, 3, 1, 1, 2],
    [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2],
    [3, 2, 1, 2, 2, 1],
    [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2],
    [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3],
    [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1],
    [1, 1, 1, 3, 2, 3],
    [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3],
    [1, 3, 2, 1, 1, 3],
    [1, 3, 2, 3, 1, 1],
    [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3],
    [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3],
    [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3],
    [1, 1, 3, 3, 2, 1],
    [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1],
    [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1],
    [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1],
    [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1],
    [3, 1, 2, 1, 1, 3],
    [3, 1, 2, 3, 1, 1],
    [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1],
    [2, 2, 1, 4, 1, 1],
    [4, 3, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1],
    [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1],
    [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2],
    [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1],
    [1, 4, 2, 1, 1, 2],
    [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4],
    [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2],
    [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2],
    [1, 2, 1, 1, 4, 2],
    [1, 2, 1, 2, 4, 1],
    [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1],
    [4, 1, 1, 2, 1, 2],
    [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1],
    [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1],
    [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3],
    [1, 1, 1, 3, 4, 1],
    [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1],
    [4, 1, 1, 1, 1, 3],
    [4, 1, 1, 3, 1, 1],
    [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1],
    [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1],
    [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
];

const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

/// Try to decode one scanline given as run lengths of alternating
/// colors. `first_is_bar` tells whether `runs[0]` is a bar (black) run.
///
/// Every bar-run offset is tried as a potential start symbol; the first
/// start-to-stop sequence with a valid checksum wins.
pub fn decode_runs(runs: &[u32], first_is_bar: bool) -> Option<String> {
    let first_bar = usize::from(!first_is_bar);
    let mut start = first_bar;
    while start + 6 <= runs.len() {
        if let Some(value) = try_decode_from(runs, start) {
            return Some(value);
        }
        start += 2;
    }
    None
}

fn try_decode_from(runs: &[u32], start: usize) -> Option<String> {
    let start_sym = match_symbol(&runs[start..start + 6])?;
    if !(START_A..=START_C).contains(&start_sym) {
        return None;
    }

    let mut symbols: Vec<u8> = Vec::new();
    let mut pos = start + 6;
    loop {
        if matches_stop(&runs[pos..]) {
            break;
        }
        if pos + 6 > runs.len() {
            return None;
        }
        symbols.push(match_symbol(&runs[pos..pos + 6])?);
        pos += 6;
    }

    // The final symbol before the stop pattern is the checksum.
    let check = symbols.pop()?;
    let mut sum = start_sym as u32;
    for (i, &sym) in symbols.iter().enumerate() {
        sum += sym as u32 * (i as u32 + 1);
    }
    if sum % 103 != check as u32 {
        return None;
    }

    translate(start_sym, &symbols)
}

/// Match a 6-run window against the symbol table by normalizing run
/// widths to module counts (the window itself spans 11 modules).
fn match_symbol(window: &[u32]) -> Option<u8> {
    let total: u32 = window.iter().sum();
    if total < 11 {
        return None;
    }
    let module = total as f32 / 11.0;

    let mut pattern = [0u8; 6];
    for (slot, &run) in pattern.iter_mut().zip(window) {
        let m = (run as f32 / module).round() as i32;
        if !(1..=4).contains(&m) {
            return None;
        }
        *slot = m as u8;
    }
    if pattern.iter().sum::<u8>() != 11 {
        return None;
    }

    PATTERNS.iter().position(|p| *p == pattern).map(|i| i as u8)
}

fn matches_stop(runs: &[u32]) -> bool {
    if runs.len() < 7 {
        return false;
    }
    let window = &runs[..7];
    let total: u32 = window.iter().sum();
    if total < 13 {
        return false;
    }
    let module = total as f32 / 13.0;
    window.iter().zip(STOP).all(|(&run, expected)| {
        (run as f32 / module).round() as i32 == i32::from(expected)
    })
}

/// Expand the raw symbol stream into text, tracking code set switches
/// and single-symbol shifts. FNC symbols are skipped.
fn translate(start_sym: u8, symbols: &[u8]) -> Option<String> {
    let mut set = match start_sym {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        _ => CodeSet::C,
    };
    let mut shifted: Option<CodeSet> = None;
    let mut out = String::new();

    for &sym in symbols {
        let active = shifted.take().unwrap_or(set);
        match active {
            CodeSet::A => match sym {
                0..=63 => out.push((sym + 32) as char),
                64..=95 => out.push((sym - 64) as char),
                98 => shifted = Some(CodeSet::B),
                99 => set = CodeSet::C,
                100 => set = CodeSet::B,
                96 | 97 | 101 | 102 => {}
                _ => return None,
            },
            CodeSet::B => match sym {
                0..=95 => out.push((sym + 32) as char),
                98 => shifted = Some(CodeSet::A),
                99 => set = CodeSet::C,
                101 => set = CodeSet::A,
                96 | 97 | 100 | 102 => {}
                _ => return None,
            },
            CodeSet::C => match sym {
                0..=99 => {
                    out.push((b'0' + sym / 10) as char);
                    out.push((b'0' + sym % 10) as char);
                }
                100 => set = CodeSet::B,
                101 => set = CodeSet::A,
                102 => {}
                _ => return None,
            },
        }
    }

    Some(out)
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::{PATTERNS, STOP};

    /// Run lengths (bar first) for `text` encoded in code set B with a
    /// valid checksum and stop pattern, `unit` pixels per module.
    pub(crate) fn encode_b(text: &str, unit: u32) -> Vec<u32> {
        let mut values: Vec<u8> = vec![104];
        for c in text.chars() {
            let v = (c as u32).checked_sub(32).expect("printable ASCII only");
            assert!(v <= 95, "character out of code set B: {c:?}");
            values.push(v as u8);
        }
        let mut sum = values[0] as u32;
        for (i, &v) in values[1..].iter().enumerate() {
            sum += v as u32 * (i as u32 + 1);
        }
        values.push((sum % 103) as u8);

        let mut runs = Vec::new();
        for v in values {
            runs.extend(PATTERNS[v as usize].iter().map(|&m| m as u32 * unit));
        }
        runs.extend(STOP.iter().map(|&m| m as u32 * unit));
        runs
    }
}
