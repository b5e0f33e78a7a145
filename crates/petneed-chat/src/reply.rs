use petneed_core::Pet;

/// Carousel size cap imposed by the messaging platform.
pub const CAROUSEL_LIMIT: usize = 10;
pub const PLACEHOLDER_IMAGE: &str = "https://petneed.me/static/img/petNeedme_full_color.png";

pub const SEARCH_TITLE: &str = "為您找到這些寵物";
pub const FAVORITES_TITLE: &str = "您的收藏清單";
pub const NO_PET: &str = "抱歉，目前沒有找到寵物。";
pub const NO_MATCH: &str = "很抱歉，目前沒有找到符合條件的寵物。";
pub const FAVORITE_ADDED: &str = "已將寵物加入您的收藏！";
pub const FAVORITE_FAILED: &str = "加入收藏失敗，請稍後再試。";
pub const FAVORITES_FAILED: &str = "抱歉，讀取收藏清單時發生錯誤。";
pub const UNSEND_NUDGE: &str = "不要害羞地回收訊息，趕快打狗或是貓來看流浪動物。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Pet(Box<Pet>),
    Carousel { title: String, pets: Vec<Pet> },
    Text(String),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self { Reply::Text(s.into()) }
}
