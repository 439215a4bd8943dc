use serde::Deserialize;
use strum_macros::{Display, EnumIter};

/// A single image record from the search API.
///
/// The feed treats batches of hits as opaque sequences; the fields here are only
/// read by the renderer and when opening a hit in the browser.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageHit {
    pub id: u64,
    #[serde(rename = "pageURL")]
    pub page_url: Option<String>,
    #[serde(rename = "previewURL")]
    pub preview_url: Option<String>,
    #[serde(rename = "webformatURL")]
    pub webformat_url: Option<String>,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    pub tags: Option<String>,
    pub user: Option<String>,
    pub views: Option<u64>,
    pub downloads: Option<u64>,
    pub likes: Option<u64>,
}

impl ImageHit {
    /// Width / height, or `None` for records without dimensions.
    pub fn aspect_ratio(&self) -> Option<f64> {
        match self.image_height {
            0 => None,
            h => Some(self.image_width as f64 / h as f64),
        }
    }
}

/// JSON envelope returned by the search endpoint.
///
/// `hits` stays optional so a 2xx body without it can be reported as malformed
/// instead of silently decoding to an empty page.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_hits: u64,
    pub hits: Option<Vec<ImageHit>>,
}

/// Categories accepted by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Backgrounds,
    Fashion,
    Nature,
    Science,
    Education,
    Feelings,
    Health,
    People,
    Religion,
    Places,
    Animals,
    Industry,
    Computer,
    Food,
    Sports,
    Transportation,
    Travel,
    Buildings,
    Business,
    Music,
}

impl Category {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Backgrounds => "backgrounds",
            Self::Fashion => "fashion",
            Self::Nature => "nature",
            Self::Science => "science",
            Self::Education => "education",
            Self::Feelings => "feelings",
            Self::Health => "health",
            Self::People => "people",
            Self::Religion => "religion",
            Self::Places => "places",
            Self::Animals => "animals",
            Self::Industry => "industry",
            Self::Computer => "computer",
            Self::Food => "food",
            Self::Sports => "sports",
            Self::Transportation => "transportation",
            Self::Travel => "travel",
            Self::Buildings => "buildings",
            Self::Business => "business",
            Self::Music => "music",
        }
    }
}

/// Lifecycle of the feed's most recent fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
    Loaded,
    Failed(crate::internal::feed::FetchFailure),
}

impl FetchState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }
}
