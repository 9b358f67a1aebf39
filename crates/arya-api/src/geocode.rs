// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Reverse geocoding against a Nominatim-compatible service.

use anyhow::{Context, Result, bail};
use arya_app::AppError;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::{clean_error_response, connection_error};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "AryaMahasangh/1.0";

const LANGUAGES: [&str; 2] = ["hi", "en"];

const STATE_NAMES: [(&str, &str); 36] = [
    ("उत्तर प्रदेश", "उत्तर प्रदेश"),
    ("हरियाणा", "हरियाणा"),
    ("दिल्ली", "दिल्ली"),
    ("राजस्थान", "राजस्थान"),
    ("मध्य प्रदेश", "मध्य प्रदेश"),
    ("महाराष्ट्र", "महाराष्ट्र"),
    ("गुजरात", "गुजरात"),
    ("बिहार", "बिहार"),
    ("पंजाब", "पंजाब"),
    ("Uttar Pradesh", "उत्तर प्रदेश"),
    ("Haryana", "हरियाणा"),
    ("Delhi", "दिल्ली"),
    ("National Capital Territory", "दिल्ली"),
    ("Rajasthan", "राजस्थान"),
    ("Madhya Pradesh", "मध्य प्रदेश"),
    ("Maharashtra", "महाराष्ट्र"),
    ("Gujarat", "गुजरात"),
    ("Bihar", "बिहार"),
    ("Punjab", "पंजाब"),
    ("West Bengal", "पश्चिम बंगाल"),
    ("Tamil Nadu", "तमिलनाडु"),
    ("Karnataka", "कर्नाटक"),
    ("Kerala", "केरल"),
    ("Andhra Pradesh", "आंध्र प्रदेश"),
    ("Telangana", "तेलंगाना"),
    ("Odisha", "ओडिशा"),
    ("Orissa", "ओडिशा"),
    ("Jharkhand", "झारखंड"),
    ("Chhattisgarh", "छत्तीसगढ़"),
    ("Uttarakhand", "उत्तराखंड"),
    ("Himachal Pradesh", "हिमाचल प्रदेश"),
    ("Jammu", "जम्मू और कश्मीर"),
    ("Kashmir", "जम्मू और कश्मीर"),
    ("Assam", "असम"),
    ("Arunachal Pradesh", "अरुणाचल प्रदेश"),
    ("Goa", "गोवा"),
];

/// Address fields recovered from a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseAddress {
    pub address: String,
    pub state: String,
    pub district: String,
    pub pincode: String,
}

impl ReverseAddress {
    fn is_useful(&self) -> bool {
        !self.address.is_empty() || !self.state.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    state_district: Option<String>,
    county: Option<String>,
    postcode: Option<String>,
}

impl NominatimAddress {
    fn into_reverse(self) -> ReverseAddress {
        let address = [
            self.house_number,
            self.road,
            self.suburb,
            self.city,
            self.town,
            self.village,
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");
        ReverseAddress {
            address,
            state: self.state.as_deref().map(canonical_state).unwrap_or_default(),
            district: self
                .state_district
                .or(self.county)
                .map(|district| district.trim_end_matches(" District").trim().to_owned())
                .unwrap_or_default(),
            pincode: self.postcode.unwrap_or_default(),
        }
    }
}

/// Map a state name in Hindi or English onto its Hindi form. Unknown
/// names map to an empty string.
pub fn canonical_state(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    STATE_NAMES
        .iter()
        .find(|(needle, _)| lowered.contains(&needle.to_lowercase()))
        .map(|(_, hindi)| (*hindi).to_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
    user_agent: String,
    http: HttpClient,
}

impl Geocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("geocoding.base_url must not be empty");
        }
        if user_agent.trim().is_empty() {
            bail!("geocoding.user_agent must not be empty -- Nominatim rejects anonymous clients");
        }
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build geocoding HTTP client")?;
        Ok(Self {
            base_url,
            user_agent: user_agent.to_owned(),
            http,
        })
    }

    pub fn reverse_url(&self, lat: f64, lon: f64, language: &str) -> Result<Url, AppError> {
        Url::parse_with_params(
            &format!("{}/reverse", self.base_url),
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "json".to_owned()),
                ("addressdetails", "1".to_owned()),
                ("accept-language", language.to_owned()),
            ],
        )
        .map_err(|error| AppError::Unknown(format!("build geocoding url: {error}")))
    }

    /// Look up `lat`/`lon`, preferring Hindi names. Rate limiting stops the
    /// lookup rather than falling through to the next language.
    pub fn reverse(&self, lat: f64, lon: f64) -> Result<ReverseAddress, AppError> {
        let mut last_error = None;
        for language in LANGUAGES {
            let url = self.reverse_url(lat, lon, language)?;
            let response = self
                .http
                .get(url)
                .header("User-Agent", &self.user_agent)
                .send()
                .map_err(|error| connection_error(&self.base_url, &error))?;

            let status = response.status();
            if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
                warn!(%status, "geocoder refused request");
                let body = response.text().unwrap_or_default();
                return Err(clean_error_response(status, &body));
            }
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                last_error = Some(clean_error_response(status, &body));
                continue;
            }

            let parsed: NominatimResponse = response
                .json()
                .map_err(|error| AppError::Decode(format!("decode geocoding response: {error}")))?;
            let reverse = parsed.address.unwrap_or_default().into_reverse();
            debug!(language, ?reverse, "reverse geocoded");
            if reverse.is_useful() {
                return Ok(reverse);
            }
        }
        match last_error {
            Some(error) => Err(error),
            None => Ok(ReverseAddress::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NominatimAddress, canonical_state};

    #[test]
    fn states_map_to_hindi() {
        assert_eq!(canonical_state("Haryana"), "हरियाणा");
        assert_eq!(canonical_state("NCT of Delhi"), "दिल्ली");
        assert_eq!(canonical_state("उत्तर प्रदेश"), "उत्तर प्रदेश");
        assert_eq!(canonical_state("Atlantis"), "");
    }

    #[test]
    fn address_parts_join_in_order() {
        let address = NominatimAddress {
            house_number: Some("12".to_owned()),
            road: Some("दयानंद मार्ग".to_owned()),
            city: Some("रोहतक".to_owned()),
            state: Some("हरियाणा".to_owned()),
            county: Some("Rohtak District".to_owned()),
            postcode: Some("124001".to_owned()),
            ..NominatimAddress::default()
        };
        let reverse = address.into_reverse();
        assert_eq!(reverse.address, "12, दयानंद मार्ग, रोहतक");
        assert_eq!(reverse.state, "हरियाणा");
        assert_eq!(reverse.district, "Rohtak");
        assert_eq!(reverse.pincode, "124001");
    }
}
