//! Location drift check.
//!
//! The commerce API imported its provinces, districts and wards from the
//! public provinces API. This compares the two by division code and reports
//! what is missing, renamed or unknown on the backend side.

use std::collections::HashMap;
use std::time::Duration;

use boutique_core::client::geo::DEFAULT_BASE_URL;
use boutique_core::client::{ApiClient, GeoClient};
use boutique_core::config as env;
use boutique_core::{Division, Listing, Location};
use tracing::{info, warn};

use super::CliError;

const GEO_TIMEOUT: Duration = Duration::from_secs(15);

/// Differences between the backend's rows and the reference list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drift<'a> {
    /// Reference divisions with no backend row.
    pub missing: Vec<&'a Division>,
    /// Same code, different name: (backend, reference).
    pub renamed: Vec<(&'a Location, &'a Division)>,
    /// Backend rows whose code is absent from the reference (or unparseable).
    pub unknown: Vec<&'a Location>,
}

impl Drift<'_> {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.renamed.is_empty() && self.unknown.is_empty()
    }
}

fn location_code(location: &Location) -> Option<i32> {
    location.code.as_deref().and_then(|c| c.trim().parse().ok())
}

/// Match backend rows to reference divisions by code.
#[must_use]
pub fn compare<'a>(backend: &'a [Location], reference: &'a [Division]) -> Drift<'a> {
    let by_code: HashMap<i32, &Location> = backend
        .iter()
        .filter_map(|l| location_code(l).map(|code| (code, l)))
        .collect();
    let reference_codes: HashMap<i32, &Division> =
        reference.iter().map(|d| (d.code, d)).collect();

    let mut drift = Drift::default();
    for division in reference {
        match by_code.get(&division.code) {
            None => drift.missing.push(division),
            Some(location) if location.name.trim() != division.name.trim() => {
                drift.renamed.push((location, division));
            }
            Some(_) => {}
        }
    }
    drift.unknown = backend
        .iter()
        .filter(|l| location_code(l).is_none_or(|code| !reference_codes.contains_key(&code)))
        .collect();
    drift
}

/// Compare all provinces, or the districts of the province with `code`.
///
/// # Errors
///
/// Returns an error if either API fails, the province is not on the
/// backend, or any drift is found.
pub async fn run(api: &ApiClient, code: Option<i32>) -> Result<(), CliError> {
    let geo_url =
        env::optional("PROVINCES_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let geo = GeoClient::new(&geo_url, GEO_TIMEOUT)?;

    let provinces: Listing<Location> = api.get("provinces/", None).await?;
    let (scope, backend, reference) = match code {
        None => (
            "provinces".to_string(),
            provinces.into_items(),
            geo.provinces().await?,
        ),
        Some(code) => {
            let province = provinces
                .items()
                .iter()
                .find(|p| location_code(p) == Some(code))
                .ok_or_else(|| {
                    CliError::Check(format!("province {code} is not on the backend"))
                })?;
            let districts: Listing<Location> = api
                .get(&format!("provinces/{}/districts/", province.id), None)
                .await?;
            (
                format!("districts of {}", province.name),
                districts.into_items(),
                geo.districts(code).await?,
            )
        }
    };

    let drift = compare(&backend, &reference);
    for division in &drift.missing {
        warn!(code = division.code, name = %division.name, "missing on backend");
    }
    for (location, division) in &drift.renamed {
        warn!(
            code = division.code,
            backend = %location.name,
            reference = %division.name,
            "renamed"
        );
    }
    for location in &drift.unknown {
        warn!(id = location.id, code = ?location.code, name = %location.name, "not in reference");
    }

    info!(
        scope = %scope,
        backend = backend.len(),
        reference = reference.len(),
        "comparison finished"
    );
    if drift.is_clean() {
        Ok(())
    } else {
        Err(CliError::Check(format!(
            "{scope}: {} missing, {} renamed, {} unknown",
            drift.missing.len(),
            drift.renamed.len(),
            drift.unknown.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: i32, code: Option<&str>, name: &str) -> Location {
        Location {
            id,
            name: name.to_string(),
            code: code.map(str::to_string),
            code_name: None,
        }
    }

    fn division(code: i32, name: &str) -> Division {
        Division {
            code,
            name: name.to_string(),
            codename: None,
        }
    }

    #[test]
    fn test_compare_reports_each_kind_of_drift() {
        let backend = vec![
            location(1, Some("1"), "Thành phố Hà Nội"),
            location(2, Some("79"), "TP Hồ Chí Minh"),
            location(3, Some("999"), "Test province"),
            location(4, None, "No code"),
        ];
        let reference = vec![
            division(1, "Thành phố Hà Nội"),
            division(79, "Thành phố Hồ Chí Minh"),
            division(48, "Thành phố Đà Nẵng"),
        ];

        let drift = compare(&backend, &reference);
        assert_eq!(drift.missing.iter().map(|d| d.code).collect::<Vec<_>>(), vec![48]);
        assert_eq!(drift.renamed.len(), 1);
        assert_eq!(drift.renamed.first().map(|(l, _)| l.id), Some(2));
        assert_eq!(drift.unknown.iter().map(|l| l.id).collect::<Vec<_>>(), vec![3, 4]);
        assert!(!drift.is_clean());
    }

    #[test]
    fn test_compare_matching_lists_is_clean() {
        let backend = vec![location(1, Some(" 1 "), "Hà Nội ")];
        let reference = vec![division(1, "Hà Nội")];
        assert!(compare(&backend, &reference).is_clean());
    }
}
