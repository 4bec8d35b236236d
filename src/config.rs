pub const NAV_SCROLL_THRESHOLD: f64 = 50.0;
pub const REVEAL_THRESHOLD: f64 = 150.0;

pub const DRAG_FORMAT: &str = "text/plain";
pub const DRAG_MARKER: &str = "tile";

pub const ZONE_HOVER_BACKGROUND: &str = "#334155";
pub const ZONE_IDLE_BACKGROUND: &str = "#475569";
pub const ZONE_DONE_BACKGROUND: &str = "#fff";
pub const SNAP_BACK_TRANSITION: &str = "transform 0.3s ease";

pub const SENDING_LABEL: &str = "Sending...";
pub const SENT_LABEL: &str = "Sent!";
pub const THANKS_MESSAGE: &str =
    "Thanks! Your message has been sent successfully. Almas will get back to you soon.";
pub const FAILURE_MESSAGE: &str =
    "Oops! Product submission failed. Please try again or call us directly.";
pub const GENERIC_REJECTION: &str = "Submission failed";

pub const SUCCESS_BACKGROUND: &str = "#dcfce7";
pub const SUCCESS_COLOR: &str = "#166534";
pub const FAILURE_BACKGROUND: &str = "#fee2e2";
pub const FAILURE_COLOR: &str = "#991b1b";

/// Selectors and element ids the controller looks up in the hosting page.
#[derive(Clone, Debug)]
pub struct PageConfig {
    pub nav: &'static str,
    pub hamburger: &'static str,
    pub nav_links: &'static str,
    pub reveal: &'static str,
    pub tile_id: &'static str,
    pub drop_zone_id: &'static str,
    pub submit_id: &'static str,
    pub captcha_success_id: &'static str,
    pub form_id: &'static str,
    pub form_status_id: &'static str,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            nav: "nav",
            hamburger: ".hamburger",
            nav_links: ".nav-links",
            reveal: ".reveal",
            tile_id: "tile-to-drag",
            drop_zone_id: "drop-zone",
            submit_id: "submit-btn",
            captcha_success_id: "captcha-success",
            form_id: "contact-form",
            form_status_id: "form-status",
        }
    }
}
