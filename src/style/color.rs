use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const ACCENT_FALLBACK: Rgb = Rgb(34, 211, 238);
pub const ACCENT_2_FALLBACK: Rgb = Rgb(96, 165, 250);

impl Rgb {
    /// Parses `#rrggbb`, `#rgb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`. Alpha
    /// is ignored.
    pub fn parse(input: &str) -> Option<Rgb> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        parse_functional(s)
    }

    pub fn rgba(&self, alpha: f64) -> String {
        format!("rgba({},{},{}, {})", self.0, self.1, self.2, format_alpha(alpha))
    }
}

/// Comma-joined channels, the form used inside `rgba(...)` templates.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

/// Three decimals at most, trailing zeros dropped.
fn format_alpha(alpha: f64) -> String {
    let fixed = format!("{:.3}", alpha.clamp(0.0, 1.0));
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
            parse_hex(&doubled)
        }
        _ => None,
    }
}

fn parse_functional(s: &str) -> Option<Rgb> {
    let lower = s.to_ascii_lowercase();
    let start = lower.find("rgb")?;
    let rest = &lower[start + 3..];
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let body = rest.strip_prefix('(')?;
    let mut channels = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() || digits.len() != part.trim_end_matches(')').len() {
                None
            } else {
                digits.parse::<u32>().ok().map(|v| v.min(255) as u8)
            }
        });
    let r = channels.next()??;
    let g = channels.next()??;
    let b = channels.next()??;
    Some(Rgb(r, g, b))
}
