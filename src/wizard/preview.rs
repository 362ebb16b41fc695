//! Naming preview resolution
//!
//! Every template edit fans out one preview request per example fixture,
//! waits for all of them to settle, and keeps only the fulfilled results.
//! A rejected fixture never cancels or blocks the others; partial results
//! are the normal output. Results keep submission order regardless of
//! completion order.

use std::sync::OnceLock;

use regex::Regex;

use crate::engine::{Engine, GeoLocation, ImageFixture};

use super::error::PreviewError;

/// One resolved preview line for the naming step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPreview {
    pub description: String,
    pub path: String,
}

/// An example fixture: a description plus synthetic metadata chosen to
/// exercise placeholder fallback paths.
#[derive(Debug, Clone)]
pub struct PreviewFixture {
    pub description: &'static str,
    pub metadata: ImageFixture,
}

/// Template tokens the engine understands, with the hint text shown on the
/// naming step.
pub const PLACEHOLDERS: &[(&str, &str)] = &[
    ("year", "The year (YYYY) the photo was taken if available in the EXIF data, otherwise the year the file was created"),
    ("year_taken", "The year (YYYY) the photo was taken if available in the EXIF data, ignored otherwise"),
    ("year_created", "The year (YYYY) the file was created"),
    ("month", "The month (MM) the photo was taken if available in the EXIF data, otherwise the month the file was created"),
    ("month_taken", "The month (MM) the photo was taken if available in the EXIF data, ignored otherwise"),
    ("month_created", "The month (MM) the file was created"),
    ("date", "The date (DD) the photo was taken if available in the EXIF data, otherwise the day the file was created"),
    ("date_taken", "The date (DD) the photo was taken if available in the EXIF data, ignored otherwise"),
    ("date_created", "The date (DD) the file was created"),
    ("parent", "The name of the parent folder the file is in, ignore if it's the same as the start folder"),
    ("parent_if_not_date", "The name of the parent folder the file is in, so long as it's not in a date format, ignored otherwise"),
    ("location_hash", "A hash of the lon/lat coordinates where the photo was taken, if available in the EXIF data, ignored otherwise"),
    ("location_country", "Calculated country based on lon/lat, ignored if cannot determine"),
    ("location_division", "Calculated state/county/province based on lon/lat, ignored if cannot determine"),
    ("location_city", "Calculated city based on lon/lat, ignored if cannot determine"),
    ("location_place", "Calculated place based on lon/lat, ignored if cannot determine"),
];

/// `{token}` occurrences in a template that no placeholder matches. These
/// still resolve engine-side (to nothing), so this is a warning surface,
/// not validation.
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let token = TOKEN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("valid token regex"));

    let mut unknown = Vec::new();
    for capture in token.captures_iter(template) {
        let name = &capture[1];
        if !PLACEHOLDERS.iter().any(|(known, _)| *known == name)
            && !unknown.iter().any(|u| u == name)
        {
            unknown.push(name.to_string());
        }
    }
    unknown
}

/// The fixed fixture set. Paths are prefixed with the chosen destination so
/// previews read like real output locations.
pub fn example_fixtures(destination_prefix: &str) -> Vec<PreviewFixture> {
    vec![
        PreviewFixture {
            description: "With location data, date taken different to created date",
            metadata: ImageFixture {
                filepath: format!("{destination_prefix}Scottish Highlands/IMG_1234.jpg"),
                year: Some("2023".into()),
                year_taken: Some("2023".into()),
                year_created: Some("2023".into()),
                month: Some("04".into()),
                month_taken: Some("04".into()),
                month_created: Some("05".into()),
                date: Some("19".into()),
                date_taken: Some("19".into()),
                date_created: Some("15".into()),
                parent: Some("Scottish Highlands".into()),
                parent_if_not_date: Some("Scottish Highlands".into()),
                location: Some(GeoLocation {
                    hash: Some("gfhptc9m".into()),
                    country: Some("GB".into()),
                    division: Some("Scotland".into()),
                    city: Some("Highlands".into()),
                    place: Some("Beinn Eighe National Nature Reserve".into()),
                }),
            },
        },
        PreviewFixture {
            description: "No data from exif, parent folder is a date format",
            metadata: ImageFixture {
                filepath: format!("{destination_prefix}2011/07/23/IMG_1234.jpg"),
                year: Some("2011".into()),
                year_created: Some("2011".into()),
                month: Some("07".into()),
                month_created: Some("07".into()),
                date: Some("23".into()),
                date_created: Some("23".into()),
                parent: Some("23".into()),
                ..Default::default()
            },
        },
        PreviewFixture {
            description: "Minimal location data, parent folder is a date format, date taken different to created date",
            metadata: ImageFixture {
                filepath: format!("{destination_prefix}DCIM/Camera/2022-09-22/IMG_1234.jpg"),
                year: Some("2022".into()),
                year_taken: Some("2022".into()),
                year_created: Some("2022".into()),
                month: Some("09".into()),
                month_taken: Some("09".into()),
                month_created: Some("09".into()),
                date: Some("22".into()),
                date_taken: Some("22".into()),
                date_created: Some("23".into()),
                parent: Some("2022-09-22".into()),
                location: Some(GeoLocation {
                    hash: Some("9q9hvumk".into()),
                    country: Some("US".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        },
    ]
}

/// Fan out one preview request per fixture, fan in the fulfilled ones.
/// All requests run concurrently on the UI task; output order is fixture
/// submission order.
pub async fn resolve<E: Engine>(
    engine: &E,
    template: &str,
    fixtures: &[PreviewFixture],
) -> Vec<NamingPreview> {
    let requests = fixtures
        .iter()
        .map(|fixture| engine.preview_naming(template, &fixture.metadata, fixture.description));
    let settled = futures::future::join_all(requests).await;

    let mut previews = Vec::with_capacity(fixtures.len());
    for (index, (fixture, outcome)) in fixtures.iter().zip(settled).enumerate() {
        match outcome {
            Ok(path) => previews.push(NamingPreview {
                description: fixture.description.to_string(),
                path,
            }),
            Err(cause) => {
                let err = PreviewError {
                    fixture_id: index,
                    cause,
                };
                tracing::debug!(%err, "fixture omitted from preview");
            }
        }
    }
    previews
}
