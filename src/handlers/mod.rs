mod start;

use teloxide::types::User;

pub use start::*;

const DEFAULT_LANG_CODE: &str = "en";

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub fn ensure_lang_code(user: Option<&User>) -> String {
    user.and_then(|u| u.language_code.clone())
        .unwrap_or_else(|| {
            log::debug!("no language_code for {:?}, using the default", user.map(|u| u.id));
            DEFAULT_LANG_CODE.to_owned()
        })
}
