//! Animated counters: count up to a target the first time they are seen.

use std::cell::RefCell;

use web_sys::HtmlElement;

use crate::dom::observe::observe_once;
use crate::dom::{frames, rect_of, Page};
use crate::error::FxResult;
use crate::motion::easing::{lerp, progress};
use crate::motion::{ease_out_cubic, FrameTask, Registry, TaskState};
use crate::style::viewport::is_in_viewport;

pub const SELECTORS: &[&str] = &["[data-counter]", "[data-count-to]", "[data-target]", ".counter"];

/// Attributes consulted for the target, highest priority first.
const TARGET_ATTRS: &[&str] = &["data-count-to", "data-target", "data-counter"];

pub const MIN_DURATION_MS: u32 = 400;
pub const MAX_DURATION_MS: u32 = 5000;

/// A number as written in markup, with the precision it was written in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Literal {
    pub value: f64,
    pub decimals: usize,
}

/// Parses `1234`, `1,234`, `1,234.5`, `12.75` or `4,5` (decimal comma).
/// Commas followed by exactly three digits group thousands; a single comma
/// followed by one or two digits is a decimal separator.
pub fn parse_literal(raw: &str) -> Option<Literal> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty()
        || !digits.starts_with(|c: char| c.is_ascii_digit())
        || !digits.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return None;
    }

    let normalized = if digits.contains('.') {
        if digits.matches('.').count() > 1 {
            return None;
        }
        let (int_part, _) = digits.split_once('.')?;
        if !is_grouped(int_part) {
            return None;
        }
        digits.replace(',', "")
    } else if digits.contains(',') {
        if is_grouped(digits) {
            digits.replace(',', "")
        } else {
            let (int_part, frac) = digits.split_once(',')?;
            if frac.contains(',') || frac.is_empty() || frac.len() > 2 {
                return None;
            }
            format!("{int_part}.{frac}")
        }
    } else {
        digits.to_string()
    };

    let decimals = normalized.split_once('.').map_or(0, |(_, frac)| frac.len());
    let value: f64 = normalized.parse().ok()?;
    Some(Literal {
        value: if negative { -value } else { value },
        decimals,
    })
}

/// `1`, `12`, `1,234`, `12,345,678` but not `1,23` or `,123`.
fn is_grouped(int_part: &str) -> bool {
    let mut groups = int_part.split(',');
    let Some(head) = groups.next() else {
        return false;
    };
    if head.is_empty() || head.len() > 3 && int_part.contains(',') {
        return false;
    }
    groups.all(|g| g.len() == 3)
}

/// Lenient attribute parsing: leading numeric run only, like `parseFloat`.
pub fn parse_attr(raw: &str) -> Option<Literal> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| {
            let sign = i == 0 && (c == '-' || c == '+');
            !(c.is_ascii_digit() || c == ',' || c == '.' || sign)
        })
        .map_or(raw.len(), |(i, _)| i);
    parse_literal(raw[..end].trim_end_matches([',', '.']))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberFormat {
    pub decimals: usize,
    pub prefix: String,
    pub suffix: String,
}

impl NumberFormat {
    pub fn format(&self, value: f64) -> String {
        let fixed = format!("{:.*}", self.decimals, value.abs());
        let (int_part, frac) = match fixed.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (fixed.clone(), None),
        };
        let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };
        let mut out = format!("{}{}{}", self.prefix, sign, group_thousands(&int_part));
        if let Some(frac) = frac {
            out.push('.');
            out.push_str(&frac);
        }
        out.push_str(&self.suffix);
        out
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Splits `"~1,234 users"` into prefix, number and suffix.
pub fn split_text(text: &str) -> Option<(String, Literal, String)> {
    let text = text.trim();
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let end = text.rfind(|c: char| c.is_ascii_digit())? + 1;
    let literal = parse_literal(&text[start..end])?;
    Some((text[..start].to_string(), literal, text[end..].to_string()))
}

#[derive(Clone, Debug, PartialEq)]
pub struct CounterModel {
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
    pub format: NumberFormat,
    pub started: bool,
}

impl CounterModel {
    /// Builds a model from the element's attributes and text. `attr` looks
    /// up an attribute by name.
    pub fn build(
        attr: impl Fn(&str) -> Option<String>,
        text: &str,
        default_duration_ms: u32,
    ) -> Option<CounterModel> {
        let from_attrs = TARGET_ATTRS
            .iter()
            .find_map(|name| attr(*name).as_deref().and_then(parse_attr));
        let (prefix, target, suffix) = match from_attrs {
            Some(lit) => (String::new(), lit, String::new()),
            None => split_text(text)?,
        };

        let from = attr("data-from")
            .as_deref()
            .and_then(parse_attr)
            .map_or(0.0, |lit| lit.value);
        let duration = attr("data-duration")
            .and_then(|raw| leading_int(&raw))
            .filter(|&ms| ms != 0)
            .unwrap_or(i64::from(default_duration_ms))
            .clamp(i64::from(MIN_DURATION_MS), i64::from(MAX_DURATION_MS));

        Some(CounterModel {
            from,
            to: target.value,
            duration_ms: duration as f64,
            format: NumberFormat { decimals: target.decimals, prefix, suffix },
            started: false,
        })
    }

    pub fn text_at(&self, elapsed_ms: f64) -> String {
        let k = progress(elapsed_ms, self.duration_ms);
        if k >= 1.0 {
            return self.final_text();
        }
        self.format.format(lerp(self.from, self.to, ease_out_cubic(k)))
    }

    pub fn initial_text(&self) -> String {
        self.format.format(self.from)
    }

    pub fn final_text(&self) -> String {
        self.format.format(self.to)
    }
}

fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(raw.len(), |(i, _)| i);
    let run = &raw[..end];
    match run.parse::<i64>() {
        Ok(n) => Some(n),
        // Digits that overflow saturate so the clamp still applies.
        Err(_) if !run.trim_start_matches('-').is_empty() => {
            Some(if run.starts_with('-') { i64::MIN } else { i64::MAX })
        }
        Err(_) => None,
    }
}

/// Per-frame counter animation writing each step through `sink`.
pub struct CounterTask<F> {
    model: CounterModel,
    started_at: Option<f64>,
    sink: F,
}

impl<F: FnMut(&str)> CounterTask<F> {
    pub fn new(model: CounterModel, sink: F) -> Self {
        Self { model, started_at: None, sink }
    }
}

impl<F: FnMut(&str)> FrameTask for CounterTask<F> {
    fn tick(&mut self, now: f64) -> TaskState {
        let t0 = *self.started_at.get_or_insert(now);
        let elapsed = now - t0;
        (self.sink)(&self.model.text_at(elapsed));
        if elapsed >= self.model.duration_ms {
            TaskState::Finished
        } else {
            TaskState::Running
        }
    }
}

thread_local! {
    static COUNTERS: RefCell<Registry<HtmlElement, CounterModel>> = RefCell::new(Registry::new());
}

pub fn init(page: &Page) -> FxResult {
    let mut fresh = Vec::new();
    for el in page.query_all(SELECTORS) {
        if COUNTERS.with(|reg| reg.borrow().contains(&el)) {
            continue;
        }
        let text = el.text_content().unwrap_or_default();
        let duration_ms = page.config.counter_duration_ms;
        let Some(model) = CounterModel::build(|name| el.get_attribute(name), &text, duration_ms)
        else {
            log::debug!("counter: no number in {:?}", text);
            continue;
        };
        el.set_text_content(Some(&model.initial_text()));
        COUNTERS.with(|reg| reg.borrow_mut().claim(el.clone(), || model));
        fresh.push(el);
    }
    if fresh.is_empty() {
        return Ok(());
    }

    let reduced = page.reduced_motion;
    if !page.supports_intersection_observer() {
        for el in &fresh {
            start(el, reduced);
        }
        return Ok(());
    }

    observe_once(&fresh, 0.25, None, move |el| start(el, reduced))?;
    let page = page.clone();
    frames::next_frame(move || {
        let vh = page.viewport_height();
        for el in &fresh {
            if is_in_viewport(&rect_of(el), vh, 0.01) {
                start(el, page.reduced_motion);
            }
        }
    });
    Ok(())
}

fn start(el: &HtmlElement, reduced_motion: bool) {
    let model = COUNTERS.with(|reg| {
        let mut reg = reg.borrow_mut();
        let model = reg.get_mut(el)?;
        if model.started {
            return None;
        }
        model.started = true;
        Some(model.clone())
    });
    let Some(model) = model else { return };

    if reduced_motion {
        el.set_text_content(Some(&model.final_text()));
        return;
    }
    let target = el.clone();
    frames::spawn(CounterTask::new(model, move |text: &str| {
        target.set_text_content(Some(text));
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::VirtualClock;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn literal_parsing() {
        assert_eq!(parse_literal("1,234"), Some(Literal { value: 1234.0, decimals: 0 }));
        assert_eq!(parse_literal("1,234.50"), Some(Literal { value: 1234.5, decimals: 2 }));
        assert_eq!(parse_literal("4,5"), Some(Literal { value: 4.5, decimals: 1 }));
        assert_eq!(parse_literal("12.75"), Some(Literal { value: 12.75, decimals: 2 }));
        assert_eq!(parse_literal("-3"), Some(Literal { value: -3.0, decimals: 0 }));
        assert_eq!(parse_literal("1,2345"), None);
        assert_eq!(parse_literal("1.2.3"), None);
        assert_eq!(parse_literal("abc"), None);
    }

    #[test]
    fn attr_parsing_is_lenient() {
        assert_eq!(parse_attr("250px"), Some(Literal { value: 250.0, decimals: 0 }));
        assert_eq!(parse_attr(" 99.9 "), Some(Literal { value: 99.9, decimals: 1 }));
        assert_eq!(parse_attr("n/a"), None);
    }

    #[test]
    fn formats_with_separators_and_precision() {
        let fmt = NumberFormat { decimals: 0, prefix: String::new(), suffix: " users".into() };
        assert_eq!(fmt.format(1234.0), "1,234 users");
        assert_eq!(fmt.format(999.4), "999 users");
        let fmt = NumberFormat { decimals: 2, prefix: "$".into(), suffix: String::new() };
        assert_eq!(fmt.format(1234567.891), "$1,234,567.89");
        assert_eq!(fmt.format(-0.001), "$0.00");
        assert_eq!(fmt.format(-12.5), "$-12.50");
    }

    #[test]
    fn text_with_prefix_and_suffix() {
        let model = CounterModel::build(attrs(&[]), "  ~1,234 users ", 1400).unwrap();
        assert_eq!(model.to, 1234.0);
        assert_eq!(model.from, 0.0);
        assert_eq!(model.format.prefix, "~");
        assert_eq!(model.format.suffix, " users");
        assert_eq!(model.initial_text(), "~0 users");
        assert_eq!(model.final_text(), "~1,234 users");
    }

    #[test]
    fn attribute_priority_and_duration_clamp() {
        let model = CounterModel::build(
            attrs(&[
                ("data-counter", "5"),
                ("data-target", "10"),
                ("data-count-to", "2.50"),
                ("data-duration", "99999"),
                ("data-from", "1"),
            ]),
            "ignored 7",
            1400,
        )
        .unwrap();
        assert_eq!(model.to, 2.5);
        assert_eq!(model.format.decimals, 2);
        assert_eq!(model.from, 1.0);
        assert_eq!(model.duration_ms, 5000.0);

        let model = CounterModel::build(attrs(&[("data-duration", "10")]), "3", 1400).unwrap();
        assert_eq!(model.duration_ms, 400.0);
        let model = CounterModel::build(attrs(&[("data-duration", "zero")]), "3", 1400).unwrap();
        assert_eq!(model.duration_ms, 1400.0);
    }

    #[test]
    fn oversized_duration_saturates_to_the_maximum() {
        let huge = attrs(&[("data-duration", "99999999999999999999ms")]);
        assert_eq!(CounterModel::build(huge, "3", 1400).unwrap().duration_ms, 5000.0);
        let tiny = attrs(&[("data-duration", "-99999999999999999999")]);
        assert_eq!(CounterModel::build(tiny, "3", 1400).unwrap().duration_ms, 400.0);
        let sign_only = attrs(&[("data-duration", "-")]);
        assert_eq!(CounterModel::build(sign_only, "3", 1400).unwrap().duration_ms, 1400.0);
    }

    #[test]
    fn no_number_no_model() {
        assert!(CounterModel::build(attrs(&[]), "Lots of users", 1400).is_none());
        assert!(CounterModel::build(attrs(&[("data-target", "x")]), "", 1400).is_none());
    }

    #[test]
    fn animation_lands_on_target_regardless_of_start() {
        for from in ["0", "5000", "-20", "1233.9"] {
            let model = CounterModel::build(
                attrs(&[("data-from", from)]),
                "1,234 users",
                1400,
            )
            .unwrap();
            let shown = Rc::new(RefCell::new(Vec::<String>::new()));
            let sink = shown.clone();
            let mut clock = VirtualClock::new(16.0);
            clock.spawn(CounterTask::new(model, move |text: &str| {
                sink.borrow_mut().push(text.to_string())
            }));
            clock.advance(2000.0);
            assert_eq!(clock.active_tasks(), 0);
            assert_eq!(shown.borrow().last().map(String::as_str), Some("1,234 users"));
        }
    }

    #[test]
    fn eased_progress_is_monotonic() {
        let model = CounterModel::build(attrs(&[]), "1000", 1000).unwrap();
        let values: Vec<f64> = (0..=10)
            .map(|i| model.text_at(i as f64 * 100.0).replace(',', "").parse().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[0], 0.0);
        assert_eq!(values[10], 1000.0);
        assert!(values[5] > 500.0);
    }
}
