use rust_i18n::t;
use teloxide::utils::html;
use crate::config::ComposerPolicy;
use crate::domain::{ContentPage, ContentRecord};

/// Turns the result of a content query into the HTML body of the channel announcement.
#[derive(Clone, Debug)]
pub struct Composer {
    brand: String,
    locale: String,
    policy: ComposerPolicy,
}

impl Composer {
    pub fn new(brand: &str, locale: &str, policy: ComposerPolicy) -> Self {
        Self {
            brand: brand.to_owned(),
            locale: locale.to_owned(),
            policy,
        }
    }

    /// `None` means there is nothing worth posting this time.
    pub fn compose(&self, page: &ContentPage) -> Option<String> {
        match (page.is_empty(), self.policy) {
            (true, ComposerPolicy::OnlyNew) => None,
            (true, ComposerPolicy::Always) => Some(self.re_engagement()),
            (false, _) => Some(self.new_content(page)),
        }
    }

    fn new_content(&self, page: &ContentPage) -> String {
        let locale = self.locale.as_str();
        let header = t!("announcement.new_content.header", locale = locale, brand = html::escape(&self.brand.to_uppercase()));
        let lead = match page.records.first().and_then(ContentRecord::display_title) {
            Some(title) => t!("announcement.new_content.lead_titled", locale = locale, title = html::escape(title)),
            None => t!("announcement.new_content.lead_untitled", locale = locale, brand = html::escape(&self.brand)),
        };
        let others = match page.total {
            0 | 1 => String::new(),
            n => t!("announcement.new_content.others", locale = locale, count = n - 1),
        };
        let dropped = t!("announcement.new_content.dropped", locale = locale);
        let call_to_action = t!("announcement.call_to_action", locale = locale);
        format!("{header}\n\n{lead}{others}{dropped}\n\n{call_to_action}")
    }

    fn re_engagement(&self) -> String {
        let locale = self.locale.as_str();
        let header = t!("announcement.re_engagement.header", locale = locale);
        let body = t!("announcement.re_engagement.body", locale = locale, brand = html::escape(&self.brand));
        let call_to_action = t!("announcement.call_to_action", locale = locale);
        format!("{header}\n\n{body}\n\n{call_to_action}")
    }
}
