use reqwest::Url;
use rust_i18n::t;
use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, WebAppInfo};
use crate::config::AppConfig;
use crate::handlers::{ensure_lang_code, HandlerResult};
use crate::metrics;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum StartCommands {
    #[command(description = "start")]
    Start(String),
    #[command(description = "watch")]
    Watch,
}

pub async fn start_cmd_handler(bot: Bot, msg: Message, cmd: StartCommands, config: AppConfig) -> HandlerResult {
    let lang_code = ensure_lang_code(msg.from.as_ref());
    let (text, button) = match cmd {
        StartCommands::Start(_) => {
            metrics::CMD_START_COUNTER.inc();
            let text = t!("commands.start.greeting", locale = &lang_code, brand = config.brand);
            let button = t!("commands.start.button", locale = &lang_code, brand = config.brand.to_uppercase());
            (text, button)
        }
        StartCommands::Watch => {
            metrics::CMD_WATCH_COUNTER.inc();
            (t!("commands.watch.prompt", locale = &lang_code), t!("commands.watch.button", locale = &lang_code))
        }
    };

    bot.send_message(msg.chat.id, text)
        .reply_markup(web_app_keyboard(button, &config.web_app_url))
        .await?;
    Ok(())
}

fn web_app_keyboard(label: String, url: &Url) -> InlineKeyboardMarkup {
    let web_app = WebAppInfo { url: url.clone() };
    InlineKeyboardMarkup::new([[InlineKeyboardButton::web_app(label, web_app)]])
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;
    use teloxide::utils::command::BotCommands;
    use super::*;

    #[test]
    fn test_commands_parsing() {
        assert!(matches!(StartCommands::parse("/start", "afrowrld_bot"), Ok(StartCommands::Start(_))));
        assert!(matches!(StartCommands::parse("/start ref42", "afrowrld_bot"), Ok(StartCommands::Start(p)) if p == "ref42"));
        assert!(matches!(StartCommands::parse("/watch", "afrowrld_bot"), Ok(StartCommands::Watch)));
        assert!(StartCommands::parse("/help", "afrowrld_bot").is_err());
    }

    #[test]
    fn test_web_app_keyboard() {
        let url: Url = "https://afrowrld.example/app".parse().unwrap();
        let keyboard = web_app_keyboard("▶️ Watch Now".to_owned(), &url);

        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].kind, InlineKeyboardButtonKind::WebApp(WebAppInfo { url }));
    }

    #[test]
    fn test_texts() {
        assert_eq!(t!("commands.watch.prompt", locale = "en"), "Open Player:");
        assert_eq!(t!("commands.start.button", locale = "de", brand = "AFROWRLD"), "🔥 ENTER AFROWRLD 🔥");
    }
}
