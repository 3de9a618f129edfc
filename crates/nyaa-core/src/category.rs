//! Category taxonomy and search parameter enums for nyaa.si
//!
//! Categories form a closed two-level hierarchy. Each entry maps to the
//! stable `{group}_{subgroup}` identifier used in search URLs
//! (`https://nyaa.si/?c=1_2&q=...`), where parents are `{group}_0` and
//! the root "All" category is `0_0`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A nyaa.si torrent category
///
/// Covers the root "All" category, the six parent categories, and every
/// leaf. The display name matches the text rendered on the torrent page
/// (e.g. `Anime - English-translated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Anime,
    AnimeMusicVideo,
    AnimeEnglishTranslated,
    AnimeNonEnglishTranslated,
    AnimeRaw,
    Audio,
    AudioLossless,
    AudioLossy,
    Literature,
    LiteratureEnglishTranslated,
    LiteratureNonEnglishTranslated,
    LiteratureRaw,
    LiveAction,
    LiveActionEnglishTranslated,
    LiveActionIdolPromotionalVideo,
    LiveActionNonEnglishTranslated,
    LiveActionRaw,
    Pictures,
    PicturesGraphics,
    PicturesPhotos,
    Software,
    SoftwareApplications,
    SoftwareGames,
}

impl Category {
    /// Every category in the taxonomy, in group/subgroup order
    pub const ALL: [Category; 24] = [
        Category::All,
        Category::Anime,
        Category::AnimeMusicVideo,
        Category::AnimeEnglishTranslated,
        Category::AnimeNonEnglishTranslated,
        Category::AnimeRaw,
        Category::Audio,
        Category::AudioLossless,
        Category::AudioLossy,
        Category::Literature,
        Category::LiteratureEnglishTranslated,
        Category::LiteratureNonEnglishTranslated,
        Category::LiteratureRaw,
        Category::LiveAction,
        Category::LiveActionEnglishTranslated,
        Category::LiveActionIdolPromotionalVideo,
        Category::LiveActionNonEnglishTranslated,
        Category::LiveActionRaw,
        Category::Pictures,
        Category::PicturesGraphics,
        Category::PicturesPhotos,
        Category::Software,
        Category::SoftwareApplications,
        Category::SoftwareGames,
    ];

    /// Display name as rendered on the torrent page
    pub fn name(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Anime => "Anime",
            Category::AnimeMusicVideo => "Anime - Anime Music Video",
            Category::AnimeEnglishTranslated => "Anime - English-translated",
            Category::AnimeNonEnglishTranslated => "Anime - Non-English-translated",
            Category::AnimeRaw => "Anime - Raw",
            Category::Audio => "Audio",
            Category::AudioLossless => "Audio - Lossless",
            Category::AudioLossy => "Audio - Lossy",
            Category::Literature => "Literature",
            Category::LiteratureEnglishTranslated => "Literature - English-translated",
            Category::LiteratureNonEnglishTranslated => "Literature - Non-English-translated",
            Category::LiteratureRaw => "Literature - Raw",
            Category::LiveAction => "Live Action",
            Category::LiveActionEnglishTranslated => "Live Action - English-translated",
            Category::LiveActionIdolPromotionalVideo => "Live Action - Idol/Promotional Video",
            Category::LiveActionNonEnglishTranslated => "Live Action - Non-English-translated",
            Category::LiveActionRaw => "Live Action - Raw",
            Category::Pictures => "Pictures",
            Category::PicturesGraphics => "Pictures - Graphics",
            Category::PicturesPhotos => "Pictures - Photos",
            Category::Software => "Software",
            Category::SoftwareApplications => "Software - Applications",
            Category::SoftwareGames => "Software - Games",
        }
    }

    /// The `{group}_{subgroup}` identifier used in search URLs
    pub fn id(&self) -> &'static str {
        match self {
            Category::All => "0_0",
            Category::Anime => "1_0",
            Category::AnimeMusicVideo => "1_1",
            Category::AnimeEnglishTranslated => "1_2",
            Category::AnimeNonEnglishTranslated => "1_3",
            Category::AnimeRaw => "1_4",
            Category::Audio => "2_0",
            Category::AudioLossless => "2_1",
            Category::AudioLossy => "2_2",
            Category::Literature => "3_0",
            Category::LiteratureEnglishTranslated => "3_1",
            Category::LiteratureNonEnglishTranslated => "3_2",
            Category::LiteratureRaw => "3_3",
            Category::LiveAction => "4_0",
            Category::LiveActionEnglishTranslated => "4_1",
            Category::LiveActionIdolPromotionalVideo => "4_2",
            Category::LiveActionNonEnglishTranslated => "4_3",
            Category::LiveActionRaw => "4_4",
            Category::Pictures => "5_0",
            Category::PicturesGraphics => "5_1",
            Category::PicturesPhotos => "5_2",
            Category::Software => "6_0",
            Category::SoftwareApplications => "6_1",
            Category::SoftwareGames => "6_2",
        }
    }

    /// Parent category, derived by zeroing the subgroup component.
    ///
    /// Parents (and "All") are their own parent.
    pub fn parent(&self) -> Category {
        let group = self.id().split('_').next().unwrap_or("0");
        match group {
            "1" => Category::Anime,
            "2" => Category::Audio,
            "3" => Category::Literature,
            "4" => Category::LiveAction,
            "5" => Category::Pictures,
            "6" => Category::Software,
            _ => Category::All,
        }
    }

    /// Looks up a category by its display name (case-insensitive) or
    /// by its `{group}_{subgroup}` identifier (exact match).
    pub fn from_name(name: &str) -> Option<Category> {
        let trimmed = name.trim();
        Category::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed) || c.id() == trimmed)
            .copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Category::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown category: {name}")))
    }
}

/// Behavior when a torrent page carries a category string that is not
/// part of the taxonomy.
///
/// The default is a hard parsing error; `DefaultToAll` reproduces the
/// historical behavior of silently falling back to the "All" category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCategoryPolicy {
    /// Unknown category text is a `Parse` error (default)
    #[default]
    Fail,
    /// Unknown category text resolves to `Category::All`
    DefaultToAll,
}

/// Search result filter (`f` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter {
    #[default]
    NoFilter,
    NoRemakes,
    TrustedOnly,
}

impl Filter {
    /// Value of the `f` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Filter::NoFilter => "0",
            Filter::NoRemakes => "1",
            Filter::TrustedOnly => "2",
        }
    }
}

/// Search sort field (`s` query parameter)
///
/// The upstream query key for submission date is `id`, since page IDs
/// are assigned chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    Comments,
    Size,
    #[default]
    Datetime,
    Seeders,
    Leechers,
    Downloads,
}

impl SortBy {
    /// Value of the `s` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            SortBy::Comments => "comments",
            SortBy::Size => "size",
            SortBy::Datetime => "id",
            SortBy::Seeders => "seeders",
            SortBy::Leechers => "leechers",
            SortBy::Downloads => "downloads",
        }
    }
}

/// Search sort order (`o` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Order {
    Ascending,
    #[default]
    Descending,
}

impl Order {
    /// Value of the `o` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip_is_stable() {
        for category in Category::ALL {
            let first = Category::from_name(category.name());
            let second = Category::from_name(category.name());
            assert_eq!(first, Some(category));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_from_name_accepts_id() {
        assert_eq!(
            Category::from_name("1_2"),
            Some(Category::AnimeEnglishTranslated)
        );
        assert_eq!(Category::from_name("0_0"), Some(Category::All));
    }

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(
            Category::from_name("anime - english-translated"),
            Some(Category::AnimeEnglishTranslated)
        );
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(Category::from_name("Cooking - Recipes"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn test_parent_id_is_zeroed_subgroup() {
        for category in Category::ALL {
            let (group, _) = category.id().split_once('_').expect("well-formed id");
            assert_eq!(category.parent().id(), format!("{group}_0"));
        }
    }

    #[test]
    fn test_parent_of_parent_is_itself() {
        assert_eq!(Category::Anime.parent(), Category::Anime);
        assert_eq!(Category::All.parent(), Category::All);
        assert_eq!(
            Category::SoftwareGames.parent(),
            Category::Software
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = Category::ALL.iter().map(|c| c.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), Category::ALL.len());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Category::AnimeEnglishTranslated).unwrap();
        assert_eq!(json, "\"Anime - English-translated\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::AnimeEnglishTranslated);
    }

    #[test]
    fn test_filter_query_values() {
        assert_eq!(Filter::NoFilter.as_query(), "0");
        assert_eq!(Filter::NoRemakes.as_query(), "1");
        assert_eq!(Filter::TrustedOnly.as_query(), "2");
    }

    #[test]
    fn test_sort_by_datetime_maps_to_id() {
        assert_eq!(SortBy::Datetime.as_query(), "id");
        assert_eq!(SortBy::default(), SortBy::Datetime);
    }

    #[test]
    fn test_order_defaults_descending() {
        assert_eq!(Order::default().as_query(), "desc");
    }
}
