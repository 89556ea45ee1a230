use crate::model::{Action, InboundEvent, User};

pub const RELEASES_COMMAND: &str = "releases";

pub const WELCOME: &str = "
Welcome to Aerokube chat! We can help in English 🇬🇧, так же как и по-русски 🇷🇺!

Having troubles? Please provide your environment and Aerokube tools versions!

Есть проблемы? Начни вопрос с окружения и используемой версии инструментов Aerokube!
";

/// Map one inbound event to at most one action.
pub fn classify(event: &InboundEvent) -> Option<Action> {
    match event {
        InboundEvent::MembershipChange { chat, new_members }
            if chat.kind.is_group_like() && !new_members.is_empty() =>
        {
            Some(Action::SendWelcome {
                chat_id: chat.id,
                text: welcome_text(new_members),
            })
        }
        InboundEvent::Command {
            chat,
            message_id,
            name,
        } if name == RELEASES_COMMAND => Some(Action::FetchAndReply {
            chat_id: chat.id,
            message_id: *message_id,
        }),
        _ => None,
    }
}

pub fn mention_line(members: &[User]) -> String {
    members
        .iter()
        .map(|user| format!("@{}", user.effective_name()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn welcome_text(members: &[User]) -> String {
    format!("Hey, {}\n{}", mention_line(members), WELCOME)
}

/// Extract the command name from message text: `/name@bot args` -> `name`.
pub fn parse_command(text: &str) -> Option<&str> {
    if !text.starts_with('/') {
        return None;
    }
    let token = text.split_whitespace().next()?.strip_prefix('/')?;
    let name = token.split('@').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
