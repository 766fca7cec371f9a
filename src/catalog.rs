//! Content and research type catalog
//!
//! Maps the fixed content and research categories to their display labels
//! and default generation settings. Resolution never fails: slugs that are
//! not part of the catalog are kept verbatim and resolve to a generic label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for content types outside the catalog
pub const GENERIC_CONTENT_LABEL: &str = "Content";

/// Label used for research types outside the catalog
pub const GENERIC_RESEARCH_LABEL: &str = "Research";

/// Word count used for content types outside the catalog
pub const GENERIC_WORD_COUNT: u32 = 500;

/// Category of generated content
///
/// Serialized as its slug (`"blog-post"`, `"ad-copy"`, ...). Unknown slugs
/// round-trip through [`ContentType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    #[default]
    BlogPost,
    SocialCaption,
    EmailCopy,
    ProductDescription,
    AdCopy,
    VideoScript,
    /// A slug the catalog does not know about
    Other(String),
}

impl ContentType {
    /// Every catalogued content type, in menu order
    pub const ALL: [ContentType; 6] = [
        ContentType::BlogPost,
        ContentType::SocialCaption,
        ContentType::EmailCopy,
        ContentType::ProductDescription,
        ContentType::AdCopy,
        ContentType::VideoScript,
    ];

    /// Resolve a slug into a content type
    ///
    /// Matching is case-insensitive and tolerates underscores.
    ///
    /// # Examples
    ///
    /// ```
    /// use copydesk::catalog::ContentType;
    ///
    /// assert_eq!(ContentType::from_slug("blog-post"), ContentType::BlogPost);
    /// assert_eq!(ContentType::from_slug("Ad_Copy"), ContentType::AdCopy);
    /// assert_eq!(ContentType::from_slug("haiku").label(), "Content");
    /// ```
    pub fn from_slug(slug: &str) -> Self {
        match slug.trim().to_lowercase().replace('_', "-").as_str() {
            "blog-post" => Self::BlogPost,
            "social-caption" => Self::SocialCaption,
            "email-copy" => Self::EmailCopy,
            "product-description" => Self::ProductDescription,
            "ad-copy" => Self::AdCopy,
            "video-script" => Self::VideoScript,
            _ => Self::Other(slug.trim().to_string()),
        }
    }

    /// Canonical slug for this type
    pub fn slug(&self) -> &str {
        match self {
            Self::BlogPost => "blog-post",
            Self::SocialCaption => "social-caption",
            Self::EmailCopy => "email-copy",
            Self::ProductDescription => "product-description",
            Self::AdCopy => "ad-copy",
            Self::VideoScript => "video-script",
            Self::Other(slug) => slug,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::BlogPost => "Blog Post",
            Self::SocialCaption => "Social Media Caption",
            Self::EmailCopy => "Email Copy",
            Self::ProductDescription => "Product Description",
            Self::AdCopy => "Ad Copy",
            Self::VideoScript => "Video Script",
            Self::Other(_) => GENERIC_CONTENT_LABEL,
        }
    }

    /// Default target word count for a fresh draft of this type
    pub fn default_word_count(&self) -> u32 {
        match self {
            Self::BlogPost => 1500,
            Self::SocialCaption => 150,
            Self::EmailCopy => 300,
            Self::ProductDescription => 250,
            Self::AdCopy => 100,
            Self::VideoScript => 800,
            Self::Other(_) => GENERIC_WORD_COUNT,
        }
    }

    /// Whether the type is part of the catalog
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        Self::from_slug(&value)
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.slug().to_string()
    }
}

/// Category of a research thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResearchType {
    #[default]
    MarketAnalysis,
    CompetitorResearch,
    AudienceInsights,
    TrendAnalysis,
    KeywordResearch,
    General,
    Other(String),
}

impl ResearchType {
    /// Every catalogued research type, in menu order
    pub const ALL: [ResearchType; 6] = [
        ResearchType::MarketAnalysis,
        ResearchType::CompetitorResearch,
        ResearchType::AudienceInsights,
        ResearchType::TrendAnalysis,
        ResearchType::KeywordResearch,
        ResearchType::General,
    ];

    /// Resolve a slug into a research type, falling back to [`ResearchType::Other`]
    pub fn from_slug(slug: &str) -> Self {
        match slug.trim().to_lowercase().replace('_', "-").as_str() {
            "market-analysis" => Self::MarketAnalysis,
            "competitor-research" => Self::CompetitorResearch,
            "audience-insights" => Self::AudienceInsights,
            "trend-analysis" => Self::TrendAnalysis,
            "keyword-research" => Self::KeywordResearch,
            "general" => Self::General,
            _ => Self::Other(slug.trim().to_string()),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::MarketAnalysis => "market-analysis",
            Self::CompetitorResearch => "competitor-research",
            Self::AudienceInsights => "audience-insights",
            Self::TrendAnalysis => "trend-analysis",
            Self::KeywordResearch => "keyword-research",
            Self::General => "general",
            Self::Other(slug) => slug,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MarketAnalysis => "Market Analysis",
            Self::CompetitorResearch => "Competitor Research",
            Self::AudienceInsights => "Audience Insights",
            Self::TrendAnalysis => "Trend Analysis",
            Self::KeywordResearch => "Keyword Research",
            Self::General => "General Research",
            Self::Other(_) => GENERIC_RESEARCH_LABEL,
        }
    }

    /// Focus areas the research reply is organized around
    pub fn focus_areas(&self) -> &'static [&'static str] {
        match self {
            Self::MarketAnalysis => &["market size", "growth drivers", "segments"],
            Self::CompetitorResearch => &["positioning", "pricing", "messaging gaps"],
            Self::AudienceInsights => &["demographics", "pain points", "channels"],
            Self::TrendAnalysis => &["emerging topics", "seasonality", "momentum"],
            Self::KeywordResearch => &["search intent", "volume", "difficulty"],
            Self::General | Self::Other(_) => &["key findings", "context", "next steps"],
        }
    }
}

impl fmt::Display for ResearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl From<String> for ResearchType {
    fn from(value: String) -> Self {
        Self::from_slug(&value)
    }
}

impl From<ResearchType> for String {
    fn from(value: ResearchType) -> Self {
        value.slug().to_string()
    }
}

/// Voice the generated copy is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Friendly,
    Persuasive,
    Informative,
    Humorous,
}

impl Tone {
    /// Parse a tone name; unknown names yield `None`
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "professional" => Some(Self::Professional),
            "casual" => Some(Self::Casual),
            "friendly" => Some(Self::Friendly),
            "persuasive" => Some(Self::Persuasive),
            "informative" => Some(Self::Informative),
            "humorous" => Some(Self::Humorous),
            _ => None,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Persuasive => "persuasive",
            Self::Informative => "informative",
            Self::Humorous => "humorous",
        };
        write!(f, "{}", name)
    }
}

/// Generation configuration snapshotted into every content session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub tone: Tone,
    pub language: String,
    pub word_count: u32,
    /// Sampling creativity in `0.0..=1.0`
    pub creativity: f32,
    pub seo_optimized: bool,
    pub grammar_check: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
}

impl GenerationSettings {
    /// Default settings for a content type
    ///
    /// # Examples
    ///
    /// ```
    /// use copydesk::catalog::{ContentType, GenerationSettings};
    ///
    /// let settings = GenerationSettings::defaults_for(&ContentType::BlogPost);
    /// assert_eq!(settings.word_count, 1500);
    /// assert!(settings.seo_optimized);
    /// ```
    pub fn defaults_for(content_type: &ContentType) -> Self {
        Self {
            tone: Tone::default(),
            language: "English".to_string(),
            word_count: content_type.default_word_count(),
            creativity: 0.7,
            seo_optimized: true,
            grammar_check: true,
            keywords: Vec::new(),
            target_audience: String::new(),
        }
    }

    /// Switch to another content type, resetting the type-dependent defaults
    pub fn retarget(&mut self, content_type: &ContentType) {
        self.word_count = content_type.default_word_count();
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::defaults_for(&ContentType::default())
    }
}
