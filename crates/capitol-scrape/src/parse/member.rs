//! Member page extraction
//!
//! The name span (`LabelLegname`) is the structural anchor; member-ID gaps
//! return the site shell without it, which the engine records as a task
//! failure rather than an absence (the site answers 200 for gaps).

use capitol_common::types::{CommitteeMembership, MemberRecord, MemberTerm};
use capitol_common::{Result, ScrapeError};
use scraper::{ElementRef, Html};

use super::{clean_text, normalize_url, parse_district_info, parse_party_from_name, selector};

/// Parse one member page
pub fn parse(member_id: u32, year: u16, html: &str, base_url: &str) -> Result<MemberRecord> {
    let document = Html::parse_document(html);

    let name_el = document
        .select(&selector("span#LabelLegname"))
        .next()
        .ok_or_else(|| {
            ScrapeError::parse(format!("no member name anchor for {}-{}", member_id, year))
        })?;
    let (party, name) = parse_party_from_name(&name_el.text().collect::<String>());

    let mut term = MemberTerm {
        party,
        title: text_of(&document, "span#LabelSenRep"),
        ..Default::default()
    };

    term.photo_url = document
        .select(&selector("img#memberPhoto"))
        .next()
        .and_then(|el| el.value().attr("src"))
        .and_then(|src| normalize_url(src, base_url));

    if let Some(district_link) = document
        .select(&selector("a#MainContent_memberForm_HyperLinkDistrict"))
        .next()
    {
        let district_text = district_link.text().collect::<String>();
        let (district_type, district_number) = parse_district_info(&district_text);
        term.district_type = district_type;
        term.district_number = district_number;
        term.district_map_url = district_link
            .value()
            .attr("href")
            .and_then(|href| normalize_url(href, base_url));
    }
    term.district_description = text_of(&document, "span#MainContent_memberForm_LabelDistrictDesc");

    term.phone = text_of(&document, "span#MainContent_memberForm_LabelPhone");
    term.email = text_of(&document, "a#MainContent_memberForm_HyperLinkEmail");

    let bio = text_of(&document, "span#MainContent_LabelBio");
    if let Some(experience) = text_of(&document, "span#MainContent_LabelExperience") {
        let (current, previous) = split_experience(&experience);
        term.current_experience = current;
        term.previous_experience = previous;
    }

    Ok(MemberRecord {
        member_id,
        year,
        name: clean_text(&name),
        bio,
        committees: parse_committees(&document, year),
        term,
    })
}

/// Cleaned text content of the first match, if any
fn text_of(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .next()
        .and_then(|el| clean_text(&el.text().collect::<String>()))
}

/// Split an experience blob into current ("(Present)") and previous roles
fn split_experience(text: &str) -> (Option<String>, Option<String>) {
    let mut current = Vec::new();
    let mut previous = Vec::new();

    for line in text.split('\n').filter_map(clean_text) {
        if line.contains("(Present)") {
            current.push(line);
        } else {
            previous.push(line);
        }
    }

    (join_nonempty(current), join_nonempty(previous))
}

fn join_nonempty(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Committee seats for the scanned year
///
/// Two strategies tried in order, first non-empty wins: the committee
/// repeater's own links, then any link whose text names a committee. The
/// year label guards against the page showing a different session's seats.
fn parse_committees(document: &Html, year: u16) -> Vec<CommitteeMembership> {
    let year_matches = document
        .select(&selector("span#MainContent_commYearLbl"))
        .next()
        .map(|el| el.text().collect::<String>().contains(&year.to_string()))
        .unwrap_or(false);
    if !year_matches {
        return Vec::new();
    }

    let strategies: [&dyn Fn(&Html) -> Vec<CommitteeMembership>; 2] =
        [&committees_from_repeater, &committees_from_link_text];
    for strategy in strategies {
        let seats = strategy(document);
        if !seats.is_empty() {
            return seats;
        }
    }
    Vec::new()
}

fn committees_from_repeater(document: &Html) -> Vec<CommitteeMembership> {
    document
        .select(&selector(r#"a[id^="MainContent_committeesRepeater_"]"#))
        .filter_map(committee_from_link)
        .collect()
}

fn committees_from_link_text(document: &Html) -> Vec<CommitteeMembership> {
    document
        .select(&selector("a"))
        .filter(|link| {
            link.text()
                .collect::<String>()
                .to_lowercase()
                .contains("committee")
        })
        .filter_map(committee_from_link)
        .collect()
}

fn committee_from_link(link: ElementRef<'_>) -> Option<CommitteeMembership> {
    let committee_name = clean_text(&link.text().collect::<String>())?;
    Some(CommitteeMembership {
        committee_name,
        position: "Member".to_string(),
    })
}
