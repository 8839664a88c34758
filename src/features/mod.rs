pub mod community;
pub mod compare;
pub mod contact;
pub mod counter;
pub mod crossfade;
pub mod downloads;
pub mod footer;
pub mod glow;
pub mod icons;
pub mod learn_cards;
pub mod mask;
pub mod progress;
pub mod reveal;
pub mod typewriter;

use crate::dom::Page;
use crate::error::FxResult;

/// Setup entry point of one page enhancement.
pub type Init = fn(&Page) -> FxResult;

/// Every enhancement, in the order they are applied.
pub const ALL: &[(&str, Init)] = &[
    ("footer-year", footer::set_year),
    ("background", footer::settle_background),
    ("reveal", reveal::init),
    ("counters", counter::init),
    ("glow", glow::init),
    ("progress", progress::init),
    ("image-mask", mask::init),
    ("typewriter", typewriter::init),
    ("downloads", downloads::init),
    ("icons", icons::init),
    ("community-letters", community::split_letters),
    ("community-shimmer", community::shimmer),
    ("compare", compare::init),
    ("contact", contact::init),
    ("crossfade", crossfade::init),
    ("learn-cards", learn_cards::init),
];
