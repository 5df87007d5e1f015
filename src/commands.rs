use rust_i18n::t;
use teloxide::{Bot, RequestError};
use teloxide::requests::Requester;
use teloxide::types::{BotCommand, BotCommandScope};
use teloxide::utils::command::BotCommands;
use crate::handlers::StartCommands;

/// The web app buttons work in private chats only, so the commands are advertised there.
pub async fn set_my_commands(bot: &Bot, lang_code: &str) -> Result<(), RequestError> {
    let personal_commands = vec![
        StartCommands::bot_commands(),
    ];
    set_commands(bot, personal_commands, BotCommandScope::AllPrivateChats, lang_code).await
}

async fn set_commands(bot: &Bot, commands: Vec<Vec<BotCommand>>, scope: BotCommandScope, lang_code: &str) -> Result<(), RequestError> {
    let commands: Vec<BotCommand> = commands
        .concat()
        .into_iter()
        .filter(|cmd| !cmd.description.is_empty())
        .map(|mut cmd| {
            cmd.description = t!(&format!("commands.{}.description", cmd.description), locale = lang_code);
            cmd
        })
        .collect();
    let mut request = bot.set_my_commands(commands);
    request.language_code.replace(lang_code.to_owned());
    request.scope.replace(scope);
    request.await?;
    Ok(())
}
