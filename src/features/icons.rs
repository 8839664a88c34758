//! App icons declared as `<img data-img-base="Name">` are resolved by trying
//! file names until one loads.

use std::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

use crate::dom::Page;
use crate::error::FxResult;
use crate::motion::{unique, Registry};

pub const EXTENSIONS: &[&str] = &["webp", "png", "jpg", "jpeg", "svg"];

/// `"CapCut_Pro"` -> `"cap cut pro"`.
fn spaced_lower(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            prev_lower = false;
            continue;
        }
        if prev_lower && ch.is_ascii_uppercase() {
            out.push(' ');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.extend(ch.to_lowercase());
    }
    out.trim().to_string()
}

/// Base names to try, most literal first.
pub fn candidate_bases(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    let spaced = spaced_lower(raw);
    let words: Vec<&str> = spaced.split_whitespace().collect();
    unique([
        raw.to_string(),
        raw.to_lowercase(),
        spaced.clone(),
        words.join("-"),
        words.concat(),
    ])
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect()
}

/// Every file name to try, in order.
pub fn candidates(raw: &str) -> Vec<String> {
    candidate_bases(raw)
        .iter()
        .flat_map(|base| {
            let encoded = urlencoding::encode(base).into_owned();
            EXTENSIONS.iter().map(move |ext| format!("{encoded}.{ext}"))
        })
        .collect()
}

/// Walks the candidate file names of one icon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IconCursor {
    urls: Vec<String>,
    next: usize,
}

impl IconCursor {
    pub fn new(raw_base: &str) -> Self {
        Self { urls: candidates(raw_base), next: 0 }
    }

    /// The next name to try, or `None` once every candidate has failed.
    pub fn advance(&mut self) -> Option<&str> {
        let url = self.urls.get(self.next)?;
        self.next += 1;
        Some(url)
    }
}

thread_local! {
    static ICONS: RefCell<Registry<HtmlImageElement, IconCursor>> = RefCell::new(Registry::new());
}

fn detach(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
}

fn try_next(img: &HtmlImageElement) {
    let url = ICONS.with(|reg| {
        reg.borrow_mut()
            .get_mut(img)
            .and_then(|cursor| cursor.advance().map(str::to_string))
    });
    match url {
        Some(url) => img.set_src(&url),
        None => detach(img),
    }
}

pub fn init(page: &Page) -> FxResult {
    let images: Vec<HtmlImageElement> = page
        .query_all(&["img[data-img-base]"])
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlImageElement>().ok())
        .collect();

    for img in images {
        let cursor = IconCursor::new(&img.get_attribute("data-img-base").unwrap_or_default());
        if cursor.urls.is_empty() {
            continue;
        }
        if !ICONS.with(|reg| reg.borrow_mut().claim(img.clone(), || cursor)) {
            continue;
        }

        let target = img.clone();
        let on_error = Closure::<dyn FnMut()>::new(move || try_next(&target));
        let target = img.clone();
        let on_load = Closure::<dyn FnMut()>::new(move || detach(&target));
        img.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        img.set_onload(Some(on_load.as_ref().unchecked_ref()));
        on_error.forget();
        on_load.forget();
        try_next(&img);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases_cover_case_and_separators() {
        assert_eq!(
            candidate_bases("AlightMotion"),
            vec!["AlightMotion", "alightmotion", "alight motion", "alight-motion"]
        );
        assert_eq!(
            candidate_bases(" node_video "),
            vec!["node_video", "node video", "node-video", "nodevideo"]
        );
    }

    #[test]
    fn blank_base_has_no_candidates() {
        assert!(candidates("  ").is_empty());
    }

    #[test]
    fn cursor_stops_after_last_candidate() {
        let mut cursor = IconCursor::new("Wink");
        let tried: Vec<String> =
            std::iter::from_fn(|| cursor.advance().map(str::to_string)).collect();
        assert_eq!(tried, candidates("Wink"));
        assert_eq!(cursor.advance(), None);
        assert_eq!(IconCursor::new(" ").advance(), None);
    }

    #[test]
    fn names_are_tried_per_base_then_extension() {
        let urls = candidates("Wink");
        assert_eq!(urls.len(), 2 * EXTENSIONS.len());
        assert_eq!(urls[0], "Wink.webp");
        assert_eq!(urls[4], "Wink.svg");
        assert_eq!(urls[5], "wink.webp");
        assert_eq!(candidates("Cap Cut")[0], "Cap%20Cut.webp");
    }
}
