//! Inline `transition` / `transform` string surgery.

/// Merges two `transition` declarations. Entries are keyed by their
/// lower-cased property name; a later entry replaces an earlier one in place.
pub fn merge_transitions(base: &str, extra: &str) -> String {
    let mut merged: Vec<(String, &str)> = Vec::new();
    for piece in split_top_level(base).chain(split_top_level(extra)) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let prop = piece
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match merged.iter_mut().find(|(p, _)| *p == prop) {
            Some(slot) => slot.1 = piece,
            None => merged.push((prop, piece)),
        }
    }
    merged
        .into_iter()
        .map(|(_, piece)| piece)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits on commas that are not inside parentheses, so timing functions
/// like `cubic-bezier(0.2, 0.8, 0.2, 1)` stay whole.
fn split_top_level(list: &str) -> impl Iterator<Item = &str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&list[start..]);
    pieces.into_iter()
}

/// Appends a transform function to whatever the element already carries.
pub fn append_transform(current: &str, function: &str) -> String {
    let current = current.trim();
    if current.is_empty() || current == "none" {
        function.to_string()
    } else {
        format!("{current} {function}")
    }
}

/// Removes the first `name(...)` call from a transform list. With `arg`
/// set, only a call whose argument matches (ignoring whitespace) is removed.
/// Returns `none` when nothing is left.
pub fn strip_transform(current: &str, name: &str, arg: Option<&str>) -> String {
    let open = format!("{name}(");
    let mut search_from = 0;
    let mut out = current.to_string();
    while let Some(rel) = out[search_from..].find(&open) {
        let start = search_from + rel;
        let Some(close_rel) = out[start..].find(')') else {
            break;
        };
        let end = start + close_rel;
        let inner = &out[start + open.len()..end];
        let matches = arg.map_or(true, |want| squash(inner) == squash(want));
        if matches {
            out.replace_range(start..=end, "");
            break;
        }
        search_from = end + 1;
    }
    let cleaned = out.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        "none".to_string()
    } else {
        cleaned
    }
}

fn squash(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_same_property() {
        let merged = merge_transitions(
            "opacity 200ms linear, color 1s",
            "opacity 600ms ease-out, transform 600ms ease-out",
        );
        assert_eq!(
            merged,
            "opacity 600ms ease-out, color 1s, transform 600ms ease-out"
        );
    }

    #[test]
    fn merge_with_empty_base() {
        assert_eq!(
            merge_transitions("", "box-shadow 220ms ease-out"),
            "box-shadow 220ms ease-out"
        );
        assert_eq!(merge_transitions(" , ", "a 1s"), "a 1s");
    }

    #[test]
    fn merge_keeps_timing_functions_whole() {
        assert_eq!(
            merge_transitions(
                "clip-path 1s linear",
                "clip-path 800ms cubic-bezier(0.2, 0.8, 0.2, 1), opacity 400ms ease-out"
            ),
            "clip-path 800ms cubic-bezier(0.2, 0.8, 0.2, 1), opacity 400ms ease-out"
        );
    }

    #[test]
    fn merge_is_case_insensitive_on_property() {
        assert_eq!(merge_transitions("Opacity 1s", "opacity 2s"), "opacity 2s");
    }

    #[test]
    fn append_transform_respects_none() {
        assert_eq!(append_transform("none", "translateY(18px)"), "translateY(18px)");
        assert_eq!(append_transform("", "scale(1.03)"), "scale(1.03)");
        assert_eq!(
            append_transform("rotate(2deg)", "translateY(18px)"),
            "rotate(2deg) translateY(18px)"
        );
    }

    #[test]
    fn strip_only_matching_argument() {
        assert_eq!(
            strip_transform("rotate(2deg) translateY( 18px )", "translateY", Some("18px")),
            "rotate(2deg)"
        );
        assert_eq!(
            strip_transform("translateY(4px)", "translateY", Some("18px")),
            "translateY(4px)"
        );
        assert_eq!(strip_transform("translateY(18px)", "translateY", Some("18px")), "none");
    }

    #[test]
    fn strip_any_argument() {
        assert_eq!(strip_transform("translateX(14px) scale(2)", "translateX", None), "scale(2)");
        assert_eq!(strip_transform("", "translateX", None), "none");
    }
}
