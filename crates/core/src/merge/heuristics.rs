//! Keyword heuristics that derive a brand profile from scraped pages alone.

use std::collections::HashSet;

use crate::model::{BrandProfile, BrandSource, PageContent, PageRole, UNKNOWN};

const MAX_VALUE_PROPOSITIONS: usize = 5;
const MAX_CONVERSION_ELEMENTS: usize = 8;

struct IndustryTheme {
    name: &'static str,
    keywords: &'static [&'static str],
    audience: &'static str,
}

const INDUSTRIES: &[IndustryTheme] = &[
    IndustryTheme {
        name: "technology",
        keywords: &["innovation", "digital", "software", "tech", "automation", "cloud", "platform", "saas"],
        audience: "Tech-savvy professionals and businesses",
    },
    IndustryTheme {
        name: "healthcare",
        keywords: &["health", "medical", "wellness", "care", "treatment", "clinic", "patients"],
        audience: "Healthcare professionals and patients",
    },
    IndustryTheme {
        name: "finance",
        keywords: &["financial", "finance", "investment", "wealth", "planning", "banking", "insurance"],
        audience: "Financial professionals and investors",
    },
    IndustryTheme {
        name: "education",
        keywords: &["learning", "knowledge", "training", "courses", "students", "education"],
        audience: "Students and professionals seeking education",
    },
    IndustryTheme {
        name: "retail",
        keywords: &["shopping", "shop", "products", "store", "delivery", "cart"],
        audience: "Online shoppers and retail customers",
    },
    IndustryTheme {
        name: "legal",
        keywords: &["legal", "law", "attorney", "attorneys", "lawyer", "lawyers", "litigation"],
        audience: "Individuals and businesses seeking legal counsel",
    },
    IndustryTheme {
        name: "consulting",
        keywords: &["expertise", "strategy", "solutions", "professional", "advice", "consulting"],
        audience: "Businesses seeking expert guidance",
    },
];

struct Archetype {
    name: &'static str,
    keywords: &'static [&'static str],
    tone: &'static str,
}

const ARCHETYPES: &[Archetype] = &[
    Archetype {
        name: "innovator",
        keywords: &["innovative", "cutting-edge", "technology", "future", "advanced"],
        tone: "Forward-thinking and innovative",
    },
    Archetype {
        name: "caregiver",
        keywords: &["caring", "supportive", "helpful", "nurturing", "compassionate"],
        tone: "Warm and supportive",
    },
    Archetype {
        name: "creator",
        keywords: &["creative", "artistic", "imaginative", "original", "expressive"],
        tone: "Creative and inspiring",
    },
    Archetype {
        name: "explorer",
        keywords: &["adventurous", "bold", "discovery", "freedom", "exploration"],
        tone: "Adventurous and bold",
    },
    Archetype {
        name: "sage",
        keywords: &["wise", "knowledgeable", "expert", "authoritative", "educational"],
        tone: "Authoritative and trustworthy",
    },
    Archetype {
        name: "hero",
        keywords: &["courageous", "determined", "confident", "strong", "leadership"],
        tone: "Confident and powerful",
    },
    Archetype {
        name: "innocent",
        keywords: &["pure", "simple", "honest", "trustworthy", "optimistic"],
        tone: "Pure and trustworthy",
    },
    Archetype {
        name: "magician",
        keywords: &["transformative", "mysterious", "powerful", "visionary", "inspiring"],
        tone: "Transformative and inspiring",
    },
];

/// Lowercased word tokens from titles, meta descriptions and headings.
fn tokens(pages: &[&PageContent]) -> Vec<String> {
    let mut out = Vec::new();
    for page in pages {
        let texts = std::iter::once(page.title.as_str())
            .chain(std::iter::once(page.meta_description.as_str()))
            .chain(page.headings.iter().map(|h| h.text.as_str()));
        for text in texts {
            out.extend(
                text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
                    .map(|word| word.trim_matches('-').to_lowercase())
                    .filter(|word| !word.is_empty()),
            );
        }
    }
    out
}

/// Index of the entry with the most keyword hits; ties go to the earlier entry.
fn best_match<'a>(tokens: &[String], tables: impl Iterator<Item = &'a [&'a str]>) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, keywords) in tables.enumerate() {
        let hits = tokens.iter().filter(|t| keywords.contains(&t.as_str())).count();
        if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
            best = Some((index, hits));
        }
    }
    best.map(|(index, _)| index)
}

fn dedupe_limited<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Infer a brand profile from successfully fetched pages.
///
/// Fields nothing matched stay [`UNKNOWN`]; the source is `Absent` if no field
/// could be derived at all.
pub fn infer_brand(pages: &[&PageContent]) -> BrandProfile {
    let mut brand = BrandProfile::default();
    if pages.is_empty() {
        return brand;
    }

    let words = tokens(pages);

    if let Some(index) = best_match(&words, INDUSTRIES.iter().map(|theme| theme.keywords)) {
        brand.industry = INDUSTRIES[index].name.to_string();
        brand.target_audience = INDUSTRIES[index].audience.to_string();
    }

    if let Some(index) = best_match(&words, ARCHETYPES.iter().map(|archetype| archetype.keywords)) {
        brand.archetype = ARCHETYPES[index].name.to_string();
        brand.tone = ARCHETYPES[index].tone.to_string();
    }

    let lead = pages.iter().find(|page| page.role == PageRole::Home).unwrap_or(&pages[0]);
    brand.value_propositions = dedupe_limited(
        lead.headings.iter().filter(|h| h.level <= 2).map(|h| h.text.as_str()),
        MAX_VALUE_PROPOSITIONS,
    );

    brand.conversion_elements =
        dedupe_limited(pages.iter().flat_map(|page| page.ctas.iter().map(String::as_str)), MAX_CONVERSION_ELEMENTS);

    let derived = brand.industry != UNKNOWN
        || brand.archetype != UNKNOWN
        || !brand.value_propositions.is_empty()
        || !brand.conversion_elements.is_empty();
    if derived {
        brand.source = BrandSource::Heuristic;
    }

    brand
}
