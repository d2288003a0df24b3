//! Progress badges (shields.io static badges).

use std::fmt;

/// Badge color, ordered from worst to best so bands compare by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorBand {
    Red,
    Orange,
    Yellow,
    YellowGreen,
    Green,
    BrightGreen,
}

impl ColorBand {
    /// Band for a whole percentage. Values outside `0..=100` are clamped.
    pub fn for_percent(pct: u8) -> ColorBand {
        match pct {
            0..=19 => ColorBand::Red,
            20..=39 => ColorBand::Orange,
            40..=59 => ColorBand::Yellow,
            60..=79 => ColorBand::YellowGreen,
            80..=99 => ColorBand::Green,
            _ => ColorBand::BrightGreen,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorBand::Red => "red",
            ColorBand::Orange => "orange",
            ColorBand::Yellow => "yellow",
            ColorBand::YellowGreen => "yellowgreen",
            ColorBand::Green => "green",
            ColorBand::BrightGreen => "brightgreen",
        }
    }
}

impl fmt::Display for ColorBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round and clamp a stored percentage to the whole number shown on a badge.
pub fn whole_percent(pct: f64) -> u8 {
    if pct.is_nan() {
        return 0;
    }
    pct.clamp(0.0, 100.0).round() as u8
}

/// Escape a label for the badge path segment.
///
/// shields.io reads `-` as a field separator and `_` as a space, so both are
/// doubled; spaces become `_`; URL-reserved characters are percent-encoded.
pub fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '-' => out.push_str("--"),
            '_' => out.push_str("__"),
            ' ' => out.push('_'),
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '&' => out.push_str("%26"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            other => out.push(other),
        }
    }
    out
}

/// Escape Markdown link-text delimiters in the badge alt text.
fn escape_alt(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `![label](https://img.shields.io/badge/<label>-<pct>%25-<color>)`
pub fn badge(label: &str, pct: f64) -> String {
    let whole = whole_percent(pct);
    format!(
        "![{}](https://img.shields.io/badge/{}-{whole}%25-{})",
        escape_alt(label),
        escape_label(label),
        ColorBand::for_percent(whole)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, ColorBand::Red)]
    #[case(19, ColorBand::Red)]
    #[case(20, ColorBand::Orange)]
    #[case(39, ColorBand::Orange)]
    #[case(40, ColorBand::Yellow)]
    #[case(60, ColorBand::YellowGreen)]
    #[case(80, ColorBand::Green)]
    #[case(99, ColorBand::Green)]
    #[case(100, ColorBand::BrightGreen)]
    fn band_thresholds(#[case] pct: u8, #[case] band: ColorBand) {
        assert_eq!(ColorBand::for_percent(pct), band);
    }

    #[test]
    fn band_is_monotone() {
        for p in 0u8..100 {
            assert!(
                ColorBand::for_percent(p) <= ColorBand::for_percent(p + 1),
                "band({p}) > band({})",
                p + 1
            );
        }
        let mut prev = whole_percent(-5.0);
        let mut x = -5.0;
        while x <= 105.0 {
            let cur = whole_percent(x);
            assert!(ColorBand::for_percent(prev) <= ColorBand::for_percent(cur));
            prev = cur;
            x += 0.25;
        }
    }

    #[test]
    fn badge_url_shape() {
        assert_eq!(
            badge("Backend", 45.0),
            "![Backend](https://img.shields.io/badge/Backend-45%25-yellow)"
        );
        assert_eq!(
            badge("AI & ML", 100.0),
            "![AI & ML](https://img.shields.io/badge/AI_%26_ML-100%25-brightgreen)"
        );
    }

    #[test]
    fn brackets_and_parens_do_not_break_the_image_syntax() {
        assert_eq!(
            badge("Cloud (AWS) [beta]", 50.0),
            "![Cloud (AWS) \\[beta\\]](https://img.shields.io/badge/Cloud_%28AWS%29_[beta]-50%25-yellow)"
        );
    }

    #[test]
    fn label_escaping() {
        assert_eq!(escape_label("Security+ prep"), "Security+_prep");
        assert_eq!(escape_label("front-end_dev"), "front--end__dev");
        assert_eq!(escape_label("50/50"), "50%2F50");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(whole_percent(140.0), 100);
        assert_eq!(whole_percent(-3.0), 0);
        assert_eq!(whole_percent(f64::NAN), 0);
        assert_eq!(whole_percent(37.5), 38);
    }
}
