/// Text commands understood by the bot. Input is expected trimmed and
/// lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddFavorite(String),
    NextDog,
    NextCat,
    ShowFavorites,
    NextPet,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        if let Some(rest) = text.strip_prefix("favorite") {
            return Command::AddFavorite(rest.trim().to_string());
        }
        match text {
            "狗" | "dog" => Command::NextDog,
            "貓" | "cat" => Command::NextCat,
            "收藏" => Command::ShowFavorites,
            _ => Command::NextPet,
        }
    }
}

/// `action=favorite&petID=<id>` postbacks; anything else is ignored.
pub fn parse_postback(data: &str) -> Option<Command> {
    let mut action = None;
    let mut pet_id = None;
    for (key, value) in url::form_urlencoded::parse(data.as_bytes()) {
        match key.as_ref() {
            "action" => action = Some(value.into_owned()),
            "petID" => pet_id = Some(value.into_owned()),
            _ => {}
        }
    }
    match action.as_deref() {
        Some("favorite") => Some(Command::AddFavorite(pet_id.unwrap_or_default())),
        _ => None,
    }
}
