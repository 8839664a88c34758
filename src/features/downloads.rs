//! Points the app download buttons at the right store for the visitor.

use crate::dom::Page;
use crate::error::FxResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub fn from_user_agent(ua: &str) -> Platform {
        let ua = ua.to_ascii_lowercase();
        if ua.contains("android") {
            Platform::Android
        } else if ["iphone", "ipad", "ipod"].iter().any(|d| ua.contains(d)) {
            Platform::Ios
        } else {
            Platform::Web
        }
    }
}

pub struct StoreLinks {
    pub id: &'static str,
    pub android: &'static str,
    pub ios: &'static str,
    pub web: &'static str,
}

impl StoreLinks {
    pub fn for_platform(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::Android => self.android,
            Platform::Ios => self.ios,
            Platform::Web => self.web,
        }
    }
}

pub const APPS: &[StoreLinks] = &[
    StoreLinks {
        id: "download-capcut",
        android: "https://play.google.com/store/apps/details?id=com.lemon.lvoverseas",
        ios: "https://apps.apple.com/app/capcut/id1500855883",
        web: "https://www.capcut.com/",
    },
    StoreLinks {
        id: "download-nodevideo",
        android: "https://play.google.com/store/apps/details?id=com.shallwaystudio.nodevideo",
        ios: "https://apps.apple.com/app/nodevideo/id1574319429",
        web: "https://www.nodevideo.com/",
    },
    StoreLinks {
        id: "download-alightmotion",
        android: "https://play.google.com/store/apps/details?id=com.alightcreative.motion",
        ios: "https://apps.apple.com/app/alight-motion/id1459830568",
        web: "https://www.alightmotion.com/",
    },
    StoreLinks {
        id: "download-wink",
        android: "https://play.google.com/store/apps/details?id=com.wink.video.editor",
        ios: "https://apps.apple.com/app/wink-video-editor/id1522081734",
        web: "https://winkvideo.ai/",
    },
];

pub fn init(page: &Page) -> FxResult {
    let ua = page.window.navigator().user_agent().unwrap_or_default();
    let platform = Platform::from_user_agent(&ua);
    for app in APPS {
        let Some(link) = page.by_id(app.id) else {
            continue;
        };
        link.set_attribute("href", app.for_platform(platform))?;
        link.set_attribute("target", "_blank")?;
        link.set_attribute("rel", "noopener noreferrer")?;
    }
    log::debug!("download links routed for {:?}", platform);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_platform_from_user_agent() {
        let pixel = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36";
        let ipad = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)";
        let mac = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)";
        assert_eq!(Platform::from_user_agent(pixel), Platform::Android);
        assert_eq!(Platform::from_user_agent(ipad), Platform::Ios);
        assert_eq!(Platform::from_user_agent(mac), Platform::Web);
        assert_eq!(Platform::from_user_agent(""), Platform::Web);
    }

    #[test]
    fn every_app_has_three_https_links() {
        for app in APPS {
            for platform in [Platform::Android, Platform::Ios, Platform::Web] {
                assert!(app.for_platform(platform).starts_with("https://"), "{}", app.id);
            }
        }
        assert_eq!(APPS[0].for_platform(Platform::Web), "https://www.capcut.com/");
    }
}
