#![cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;
use site_motion::config::Config;
use site_motion::dom::{style, Page};
use site_motion::features::{
    compare, counter, downloads, footer, icons, learn_cards, mask, progress, reveal, typewriter,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn page(reduced_motion: bool) -> Page {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    Page {
        window,
        document,
        config: Config::default(),
        reduced_motion,
    }
}

fn page_with(config: Config) -> Page {
    Page { config, ..page(false) }
}

fn mount(page: &Page, tag: &str, id: &str, class: &str, text: &str) -> HtmlElement {
    let el: HtmlElement = page.document.create_element(tag).unwrap().dyn_into().unwrap();
    if !id.is_empty() {
        el.set_id(id);
    }
    el.set_class_name(class);
    el.set_text_content(Some(text));
    page.document.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn footer_shows_current_year() {
    let page = page(false);
    let year = mount(&page, "span", "year", "", "1999");
    footer::set_year(&page).unwrap();
    let shown: i32 = year.text_content().unwrap().parse().unwrap();
    assert!(shown >= 2024);
}

#[wasm_bindgen_test]
fn download_links_open_in_new_tab() {
    let page = page(false);
    let link = mount(&page, "a", "download-wink", "", "Wink");
    downloads::init(&page).unwrap();
    assert!(link.get_attribute("href").unwrap().starts_with("https://"));
    assert_eq!(link.get_attribute("target").as_deref(), Some("_blank"));
    assert_eq!(link.get_attribute("rel").as_deref(), Some("noopener noreferrer"));
}

#[wasm_bindgen_test]
fn counter_starts_from_zero_and_keeps_suffix() {
    let page = page(false);
    let el = mount(&page, "span", "", "counter", "1,234 users");
    counter::init(&page).unwrap();
    assert_eq!(el.text_content().as_deref(), Some("0 users"));

    // Already claimed, so a second pass leaves the text alone.
    el.set_text_content(Some("7 users"));
    counter::init(&page).unwrap();
    assert_eq!(el.text_content().as_deref(), Some("7 users"));
}

#[wasm_bindgen_test]
fn reveal_hides_each_element_once() {
    let page = page(false);
    let section = mount(&page, "article", "", "", "body");
    section.style().set_property("transform", "scale(2)").unwrap();

    reveal::init(&page).unwrap();
    reveal::init(&page).unwrap();
    assert_eq!(style(&section, "transform"), "scale(2) translateY(18px)");
    assert_eq!(style(&section, "opacity"), "0");

    reveal::reveal(&section);
    reveal::reveal(&section);
    assert!(reveal::is_revealed(&section));
    assert_eq!(style(&section, "transform"), "scale(2)");
    assert_eq!(style(&section, "opacity"), "1");
}

#[wasm_bindgen_test]
fn icons_are_resolved_once() {
    let page = page(false);
    let img = mount(&page, "img", "", "", "");
    img.set_attribute("data-img-base", "Wink").unwrap();

    icons::init(&page).unwrap();
    assert_eq!(img.get_attribute("src").as_deref(), Some("Wink.webp"));

    img.set_attribute("src", "icons/wink.png").unwrap();
    icons::init(&page).unwrap();
    assert_eq!(img.get_attribute("src").as_deref(), Some("icons/wink.png"));
}

#[wasm_bindgen_test]
async fn reduced_motion_counter_jumps_to_final_text() {
    let page = page(true);
    let el = mount(&page, "span", "", "counter", "1,234 users");
    el.style().set_property("position", "fixed").unwrap();
    el.style().set_property("top", "0").unwrap();

    counter::init(&page).unwrap();
    assert_eq!(el.text_content().as_deref(), Some("0 users"));
    TimeoutFuture::new(150).await;
    assert_eq!(el.text_content().as_deref(), Some("1,234 users"));
}

#[wasm_bindgen_test]
fn reduced_motion_leaves_sections_untouched() {
    let page = page(true);
    let section = mount(&page, "article", "", "", "calm");
    reveal::init(&page).unwrap();
    assert_eq!(style(&section, "opacity"), "");
    assert_eq!(style(&section, "transform"), "");
    assert!(!reveal::is_revealed(&section));
}

#[wasm_bindgen_test]
fn reduced_motion_hides_progress_bar() {
    let page = page(true);
    progress::init(&page).unwrap();
    let bar = page.by_id(progress::BAR_ID).unwrap();
    assert_eq!(style(&bar, "display"), "none");
}

#[wasm_bindgen_test]
fn reduced_motion_fades_heading_in() {
    let page = page(true);
    let heading = mount(&page, "h1", "hero-title", "", "Edit like a pro.");
    typewriter::init(&page).unwrap();
    assert_eq!(heading.text_content().as_deref(), Some("Edit like a pro."));
    assert!(style(&heading, "transition").contains("opacity 250ms ease-out"));
    assert_eq!(style(&heading, "opacity"), "0");
}

#[wasm_bindgen_test]
fn reduced_motion_image_settles_to_original_transform() {
    let page = page(true);
    let img = mount(&page, "img", "", "", "");
    img.style().set_property("transform", "scale(2)").unwrap();

    mask::init(&page).unwrap();
    let hidden_by_clip = style(&img, "clip-path").contains("100%");
    let hidden_by_slide = style(&img, "transform").contains("translateX");
    assert!(hidden_by_clip || hidden_by_slide);

    mask::reveal(&img, true);
    assert_eq!(style(&img, "opacity"), "1");
    assert_eq!(style(&img, "transform"), "scale(2)");
    assert!(!style(&img, "clip-path").contains("100%"));
}

#[wasm_bindgen_test]
fn compare_hint_fades_once() {
    let page = page(false);
    let el = mount(&page, "div", "", "", "drag");
    let hint = compare::Hint::new(Some(el.clone()), 5_000);
    let mut clock = site_motion::motion::VirtualClock::new(16.0);
    hint.dismiss(&mut clock);
    hint.dismiss(&mut clock);
    assert!(el.class_list().contains("hide"));
    assert_eq!(clock.pending_timers(), 1);
    clock.advance(5_016.0);
    assert!(el.parent_node().is_none());
}

#[wasm_bindgen_test]
async fn learn_cards_inject_animation_library_once() {
    let page = page_with(Config {
        animation_library_src: "missing/gsap-absent.js".into(),
        ..Config::default()
    });
    let overview = mount(&page, "section", "overview", "", "");
    let card: HtmlElement = page.document.create_element("div").unwrap().dyn_into().unwrap();
    card.set_class_name("learn-card");
    overview.append_child(&card).unwrap();

    learn_cards::init(&page).unwrap();
    learn_cards::init(&page).unwrap();
    TimeoutFuture::new(50).await;

    let injected = page
        .document
        .query_selector_all("script[src$=\"gsap-absent.js\"]")
        .unwrap();
    assert_eq!(injected.length(), 1);
}
