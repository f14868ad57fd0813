//! Measure page extraction
//!
//! The header anchor (`MainContent_LinkButtonMeasure`) is the structural
//! anchor that distinguishes a real measure page from the site's generic
//! shell; without it the page is unparseable and the task fails.

use capitol_common::types::{
    CommitteeReport, MeasureRecord, MeasureType, MeasureVersion, StatusEvent,
};
use capitol_common::{Result, ScrapeError};
use scraper::Html;

use super::{
    clean_text, extract_act_number, extract_conference_report, extract_governor_message_number,
    normalize_url, parse_date, selector, version_code,
};

/// Parse one measure page
pub fn parse(
    measure_type: MeasureType,
    number: u32,
    year: u16,
    html: &str,
    base_url: &str,
) -> Result<MeasureRecord> {
    let document = Html::parse_document(html);

    let header = document
        .select(&selector("a#MainContent_LinkButtonMeasure"))
        .next()
        .ok_or_else(|| {
            ScrapeError::parse(format!(
                "no measure header anchor for {}{}-{}",
                measure_type, number, year
            ))
        })?;
    let current_version = clean_text(&header.text().collect::<String>());

    let description = document
        .select(&selector("span#MainContent_LabelMeasureDescription"))
        .next()
        .and_then(|el| clean_text(&el.text().collect::<String>()));

    let mut record = MeasureRecord {
        measure_type,
        number,
        year,
        current_version,
        description,
        introducer: None,
        companion: None,
        package: None,
        current_referral: None,
        act_number: None,
        governor_message_number: None,
        page_url: None,
        pdf_url: None,
        status_events: Vec::new(),
        versions: Vec::new(),
        committee_reports: Vec::new(),
    };

    parse_summary_table(&document, &mut record);

    record.pdf_url = document
        .select(&selector("a#MainContent_PdfLink"))
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| normalize_url(href, base_url));

    record.status_events = parse_status_events(&document);
    record.versions = parse_versions(&document, base_url);
    record.committee_reports = parse_committee_reports(&document, base_url);

    // Act and governor-message numbers live in the status history, not in
    // a dedicated field; the latest mention wins.
    for event in &record.status_events {
        if let Some(act) = extract_act_number(&event.action) {
            record.act_number = Some(act);
        }
        if let Some(msg) = extract_governor_message_number(&event.action) {
            record.governor_message_number = Some(msg);
        }
    }

    Ok(record)
}

/// Label/value pairs from the measure summary table
fn parse_summary_table(document: &Html, record: &mut MeasureRecord) {
    let row_selector = selector("table.MeasureSummaryContent tr");
    let cell_selector = selector("td");

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>())
            .collect();
        if cells.len() < 2 {
            continue;
        }

        let label = cells[0].trim().trim_end_matches(':').to_string();
        let value = clean_text(&cells[1]);

        if label.contains("Companion") {
            record.companion = value;
        } else if label.contains("Package") {
            record.package = value;
        } else if label.contains("Current Referral") {
            record.current_referral = value;
        } else if label.contains("Introducer") {
            record.introducer = value;
        }
    }
}

/// Rows of the status-history grid; rows without a parseable date are
/// dropped, matching the site's occasional decorative rows
fn parse_status_events(document: &Html) -> Vec<StatusEvent> {
    let row_selector = selector("table#MainContent_GridViewStatus tr");
    let cell_selector = selector("td");
    let mut events = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>())
            .collect();
        if cells.len() < 3 {
            continue;
        }

        let Some(date) = parse_date(&cells[0]) else {
            continue;
        };

        let action = clean_text(&cells[2]).unwrap_or_default();
        events.push(StatusEvent {
            date,
            chamber: clean_text(&cells[1]),
            conference_report_number: extract_conference_report(&action),
            action,
        });
    }

    events
}

/// Version links paired with their trailing PDF links
fn parse_versions(document: &Html, base_url: &str) -> Vec<MeasureVersion> {
    let link_selector = selector("div#MainContent_RepeaterVersions a");
    let mut versions: Vec<MeasureVersion> = Vec::new();

    for link in document.select(&link_selector) {
        let id = link.value().attr("id").unwrap_or_default();
        let href = link.value().attr("href");

        if id.starts_with("MainContent_RepeaterVersions_VersionsLink_") {
            let Some(version_name) = clean_text(&link.text().collect::<String>()) else {
                continue;
            };
            versions.push(MeasureVersion {
                version_code: version_code(&version_name),
                version_name,
                html_url: href.and_then(|h| normalize_url(h, base_url)),
                pdf_url: None,
            });
        } else if id.starts_with("MainContent_RepeaterVersions_PdfLink_") {
            if let Some(last) = versions.last_mut() {
                last.pdf_url = href.and_then(|h| normalize_url(h, base_url));
            }
        }
    }

    versions
}

/// Committee report links paired with their trailing PDF links
fn parse_committee_reports(document: &Html, base_url: &str) -> Vec<CommitteeReport> {
    let link_selector = selector("div#MainContent_RepeaterCommRpt a");
    let mut reports: Vec<CommitteeReport> = Vec::new();

    for link in document.select(&link_selector) {
        let id = link.value().attr("id").unwrap_or_default();
        let href = link.value().attr("href");

        if id.starts_with("MainContent_RepeaterCommRpt_CategoryLink_") {
            let Some(report_name) = clean_text(&link.text().collect::<String>()) else {
                continue;
            };
            reports.push(CommitteeReport {
                report_name,
                html_url: href.and_then(|h| normalize_url(h, base_url)),
                pdf_url: None,
            });
        } else if id.starts_with("MainContent_RepeaterCommRpt_PdfLink_") {
            if let Some(last) = reports.last_mut() {
                last.pdf_url = href.and_then(|h| normalize_url(h, base_url));
            }
        }
    }

    reports
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.test";

    fn sample_page() -> String {
        r##"
        <html><body>
        <a id="MainContent_LinkButtonMeasure">SB1300 SD1 HD1 CD1</a>
        <span id="MainContent_LabelMeasureDescription">Relating to taxation.</span>
        <table class="MeasureSummaryContent">
            <tr><td>Introducer(s):</td><td>DELA CRUZ</td></tr>
            <tr><td>Companion:</td><td>HB1234</td></tr>
            <tr><td>Current Referral:</td><td>WAM, JDC</td></tr>
        </table>
        <a id="MainContent_PdfLink" href="/session/SB1300.pdf">PDF</a>
        <table id="MainContent_GridViewStatus">
            <tr><th>Date</th><th>Chamber</th><th>Action</th></tr>
            <tr><td>1/17/2025</td><td>S</td><td>Introduced.</td></tr>
            <tr><td>4/25/2025</td><td>S</td><td>Conf. Com. Rep. No. 96 adopted. Became law as Act 42.</td></tr>
        </table>
        <div id="MainContent_RepeaterVersions">
            <a id="MainContent_RepeaterVersions_VersionsLink_0" href="/session/SB1300_CD1.HTM">SB1300_CD1</a>
            <a id="MainContent_RepeaterVersions_PdfLink_0" href="/session/SB1300_CD1.PDF">PDF</a>
            <a id="MainContent_RepeaterVersions_VersionsLink_1" href="/session/SB1300.HTM">SB1300</a>
        </div>
        <div id="MainContent_RepeaterCommRpt">
            <a id="MainContent_RepeaterCommRpt_CategoryLink_0" href="/session/SSCR96.htm">SB1300_SD1_SSCR96_</a>
            <a id="MainContent_RepeaterCommRpt_PdfLink_0" href="/session/SSCR96.pdf">PDF</a>
        </div>
        </body></html>
        "##
        .to_string()
    }

    #[test]
    fn test_parse_full_measure_page() {
        let record = parse(MeasureType::SB, 1300, 2025, &sample_page(), BASE).unwrap();

        assert_eq!(record.current_version.as_deref(), Some("SB1300 SD1 HD1 CD1"));
        assert_eq!(record.description.as_deref(), Some("Relating to taxation."));
        assert_eq!(record.introducer.as_deref(), Some("DELA CRUZ"));
        assert_eq!(record.companion.as_deref(), Some("HB1234"));
        assert_eq!(record.current_referral.as_deref(), Some("WAM, JDC"));
        assert_eq!(
            record.pdf_url.as_deref(),
            Some("https://example.test/session/SB1300.pdf")
        );

        assert_eq!(record.status_events.len(), 2);
        assert_eq!(record.status_events[0].action, "Introduced.");
        assert_eq!(
            record.status_events[1].conference_report_number.as_deref(),
            Some("96")
        );
        assert_eq!(record.act_number, Some(42));

        assert_eq!(record.versions.len(), 2);
        assert_eq!(record.versions[0].version_name, "SB1300_CD1");
        assert_eq!(record.versions[0].version_code.as_deref(), Some("CD1"));
        assert_eq!(
            record.versions[0].pdf_url.as_deref(),
            Some("https://example.test/session/SB1300_CD1.PDF")
        );
        assert_eq!(record.versions[1].version_code, None);
        assert_eq!(record.versions[1].pdf_url, None);

        assert_eq!(record.committee_reports.len(), 1);
        assert_eq!(record.committee_reports[0].report_name, "SB1300_SD1_SSCR96_");
    }

    #[test]
    fn test_missing_header_anchor_is_parse_error() {
        let result = parse(
            MeasureType::SB,
            1,
            2025,
            "<html><body>site shell</body></html>",
            BASE,
        );
        assert!(matches!(result, Err(ScrapeError::Parse(_))));
    }

    #[test]
    fn test_header_only_page_has_empty_children() {
        let html = r#"<a id="MainContent_LinkButtonMeasure">HB1</a>"#;
        let record = parse(MeasureType::HB, 1, 2025, html, BASE).unwrap();
        assert!(record.status_events.is_empty());
        assert!(record.versions.is_empty());
        assert!(record.committee_reports.is_empty());
        assert_eq!(record.act_number, None);
    }
}
