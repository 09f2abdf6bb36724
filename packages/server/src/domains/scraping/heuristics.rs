//! Regex heuristics that turn a scraped organization site into directory fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::domains::organization::OrgType;

/// Name used when no title or heading is found
pub const UNKNOWN_ORGANIZATION: &str = "Unknown Organization";

static RE_NAME: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)<title>([^<]+)</title>").unwrap(),
        Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").unwrap(),
        Regex::new(r"(?i)<h2[^>]*>([^<]+)</h2>").unwrap(),
    ]
});
static RE_NAME_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[-|–]\s*(Home|Welcome|Official Site).*$").unwrap()
});
static RE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:about|description|mission|purpose)[^.]*?([^.]{50,200}\.)").unwrap()
});
static RE_META_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta[^>]*name=["']description["'][^>]*content=["']([^"']+)["']"#).unwrap()
});
static RE_SELF_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:we are|we're|our mission|our purpose)[^.]*?([^.]{30,150}\.)").unwrap()
});
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap()
});
static RE_REQUIREMENTS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?is)(?:requirements|qualifications|eligibility)[^.]*?([^.]{20,200}\.)").unwrap(),
        Regex::new(r"(?is)(?:to apply|application)[^.]*?(?:must|need|require)[^.]*?([^.]{20,150}\.)")
            .unwrap(),
    ]
});
static RE_DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:deadline|due|apply by)[^.]*?(\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\w+ \d{1,2},? \d{4})")
        .unwrap()
});
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Addresses that never reach a person
const SKIPPED_EMAIL_PARTS: [&str; 4] = ["noreply", "no-reply", "privacy", "legal"];

const GREEK_LETTERS: [&str; 7] = ["alpha", "beta", "gamma", "delta", "sigma", "phi", "psi"];

/// Keyword table checked in order; the first type with any hit wins
const TYPE_KEYWORDS: &[(OrgType, &[&str])] = &[
    (OrgType::Fraternity, &["fraternity", "frat", "brotherhood"]),
    (OrgType::Sorority, &["sorority", "sisterhood"]),
    (
        OrgType::Professional,
        &["professional", "career", "industry", "business", "consulting", "finance", "tech", "engineering"],
    ),
    (OrgType::Academic, &["academic", "honor", "research", "study", "scholar", "education"]),
    (OrgType::Service, &["service", "volunteer", "community", "charity", "outreach", "giving"]),
    (OrgType::Recreational, &["recreational", "sports", "fitness", "gaming", "hobby", "outdoor"]),
    (
        OrgType::Religious,
        &["religious", "faith", "christian", "muslim", "jewish", "hindu", "buddhist", "spiritual"],
    ),
    (
        OrgType::Cultural,
        &["cultural", "heritage", "ethnic", "international", "diversity", "multicultural"],
    ),
];

fn clean(fragment: &str) -> String {
    let without_tags = RE_TAG.replace_all(fragment, "");
    RE_SPACE.replace_all(without_tags.trim(), " ").into_owned()
}

/// Organization name from the page title or first heading, site suffixes removed
pub fn extract_name(html: &str) -> String {
    let raw = RE_NAME
        .iter()
        .find_map(|re| re.captures(html))
        .map(|caps| caps[1].trim().to_string());

    match raw {
        Some(name) => {
            let name = RE_NAME_SUFFIX.replace(&name, "").trim().to_string();
            if name.is_empty() {
                UNKNOWN_ORGANIZATION.to_string()
            } else {
                name
            }
        }
        None => UNKNOWN_ORGANIZATION.to_string(),
    }
}

/// Description from about/mission prose, falling back to the meta description
pub fn extract_description(text: &str, html: &str) -> Option<String> {
    let candidates = [
        RE_DESCRIPTION.captures(text),
        RE_META_DESCRIPTION.captures(html),
        RE_SELF_DESCRIPTION.captures(text),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|caps| clean(&caps[1]))
        .find(|description| description.len() > 20)
}

/// First address that is not an automated or policy mailbox
pub fn extract_email(content: &str) -> Option<String> {
    RE_EMAIL
        .find_iter(content)
        .map(|m| m.as_str())
        .find(|email| {
            let lower = email.to_lowercase();
            !SKIPPED_EMAIL_PARTS.iter().any(|skip| lower.contains(skip))
        })
        .map(str::to_string)
}

pub fn extract_requirements(text: &str) -> Option<String> {
    RE_REQUIREMENTS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| clean(&caps[1]))
}

/// A date near "deadline", "due" or "apply by", as written on the page
pub fn extract_deadline(text: &str) -> Option<String> {
    RE_DEADLINE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Organization type by keyword; `None` when nothing in the table matches
pub fn detect_org_type(text: &str, name: &str) -> Option<OrgType> {
    let text = text.to_lowercase();
    let name = name.to_lowercase();
    let hit = |keyword: &str| name.contains(keyword) || text.contains(keyword);

    TYPE_KEYWORDS
        .iter()
        .find(|(org_type, keywords)| {
            let greek = matches!(org_type, OrgType::Fraternity | OrgType::Sorority)
                && GREEK_LETTERS.iter().any(|&k| hit(k));
            greek || keywords.iter().any(|&k| hit(k))
        })
        .map(|(org_type, _)| *org_type)
}
