//! Kanji numeral conversion.
//!
//! Two spellings are accepted: positional digit strings (一四 = 14, 二〇 = 20)
//! and the unit form with 十/百/千 (四十五 = 45, 百二 = 102). Mixed strings such
//! as 三五十 belong to neither and are rejected, which keeps aza names written
//! with numerals from being mistaken for block numbers.

const DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];
const UNITS: [(char, u32); 3] = [('十', 10), ('百', 100), ('千', 1000)];

/// Value of a single kanji digit (〇 through 九).
pub fn kanji_digit(c: char) -> Option<u32> {
    DIGITS.iter().position(|&d| d == c).map(|p| p as u32)
}

fn kanji_unit(c: char) -> Option<u32> {
    UNITS.iter().find(|(u, _)| *u == c).map(|(_, v)| *v)
}

/// True for any character that may appear in a kanji numeral.
pub fn is_kanji_numeral(c: char) -> bool {
    kanji_digit(c).is_some() || kanji_unit(c).is_some()
}

/// Parse a complete kanji numeral string.
pub fn parse_kanji_number(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }

    if s.chars().all(|c| kanji_digit(c).is_some()) {
        return s.chars().try_fold(0u32, |acc, c| {
            acc.checked_mul(10)?.checked_add(kanji_digit(c)?)
        });
    }

    let mut total = 0u32;
    let mut pending: Option<u32> = None;
    let mut last_unit = u32::MAX;

    for c in s.chars() {
        if let Some(d) = kanji_digit(c) {
            // 三五十: two digits before a unit
            if pending.is_some() || d == 0 {
                return None;
            }
            pending = Some(d);
        } else if let Some(unit) = kanji_unit(c) {
            if unit >= last_unit {
                return None;
            }
            total += pending.take().unwrap_or(1) * unit;
            last_unit = unit;
        } else {
            return None;
        }
    }

    Some(total + pending.unwrap_or(0))
}

/// Unit-form kanji spelling of `n` (1 → 一, 10 → 十, 45 → 四十五).
pub fn format_kanji_number(n: u32) -> String {
    if n == 0 {
        return DIGITS[0].to_string();
    }
    if n >= 10_000 {
        return n.to_string().chars().map(|c| DIGITS[c as usize - '0' as usize]).collect();
    }

    let mut out = String::new();
    let mut rest = n;
    for &(unit_char, unit) in UNITS.iter().rev() {
        let count = rest / unit;
        if count > 0 {
            if count > 1 {
                out.push(DIGITS[count as usize]);
            }
            out.push(unit_char);
        }
        rest %= unit;
    }
    if rest > 0 {
        out.push(DIGITS[rest as usize]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional() {
        assert_eq!(parse_kanji_number("一四"), Some(14));
        assert_eq!(parse_kanji_number("二二"), Some(22));
        assert_eq!(parse_kanji_number("一〇"), Some(10));
        assert_eq!(parse_kanji_number("四"), Some(4));
    }

    #[test]
    fn test_unit_form() {
        assert_eq!(parse_kanji_number("十"), Some(10));
        assert_eq!(parse_kanji_number("十一"), Some(11));
        assert_eq!(parse_kanji_number("四十五"), Some(45));
        assert_eq!(parse_kanji_number("百二"), Some(102));
        assert_eq!(parse_kanji_number("二千三百"), Some(2300));
    }

    #[test]
    fn test_rejects_mixed_forms() {
        assert_eq!(parse_kanji_number("三五十"), None);
        assert_eq!(parse_kanji_number("八五十"), None);
        assert_eq!(parse_kanji_number("十百"), None);
        assert_eq!(parse_kanji_number("十十"), None);
        assert_eq!(parse_kanji_number("一の"), None);
        assert_eq!(parse_kanji_number(""), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_kanji_number(1), "一");
        assert_eq!(format_kanji_number(10), "十");
        assert_eq!(format_kanji_number(21), "二十一");
        assert_eq!(format_kanji_number(110), "百十");
        for n in [1, 4, 9, 12, 45, 99, 305, 1024] {
            assert_eq!(parse_kanji_number(&format_kanji_number(n)), Some(n));
        }
    }
}
