// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberShort {
    pub id: MemberId,
    pub name: String,
    pub profile_image: String,
    pub place: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyShort {
    pub id: FamilyId,
    pub name: String,
    pub photos: Vec<String>,
    pub address: String,
    pub arya_samaj_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AryaSamajListItem {
    pub id: AryaSamajId,
    pub name: String,
    pub description: String,
    pub formatted_address: String,
    pub member_count: u32,
    pub media_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Session,
    ProtectionSession,
    BodhSession,
    Camp,
    Course,
    Event,
    Campaign,
}

impl ActivityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "SESSION",
            Self::ProtectionSession => "PROTECTION_SESSION",
            Self::BodhSession => "BODH_SESSION",
            Self::Camp => "CAMP",
            Self::Course => "COURSE",
            Self::Event => "EVENT",
            Self::Campaign => "CAMPAIGN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SESSION" => Some(Self::Session),
            "PROTECTION_SESSION" => Some(Self::ProtectionSession),
            "BODH_SESSION" => Some(Self::BodhSession),
            "CAMP" => Some(Self::Camp),
            "COURSE" => Some(Self::Course),
            "EVENT" => Some(Self::Event),
            "CAMPAIGN" => Some(Self::Campaign),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Session => "आर्य प्रशिक्षण सत्र",
            Self::ProtectionSession => "आर्य संरक्षण सत्र",
            Self::BodhSession => "बोध सत्र",
            Self::Camp => "शिविर",
            Self::Course => "कक्षा",
            Self::Event => "कार्यक्रम",
            Self::Campaign => "अभियान",
        }
    }

    /// Training-style activities run over several sittings.
    pub const fn is_multi_session(self) -> bool {
        matches!(self, Self::Session | Self::Course | Self::BodhSession)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityShort {
    pub id: ActivityId,
    pub name: String,
    pub activity_type: ActivityType,
    pub short_description: String,
    pub district: String,
    pub state: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_datetime: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_datetime: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    Upcoming,
    Ongoing,
    Past,
}

impl ActivityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "आगामी",
            Self::Ongoing => "चल रही है",
            Self::Past => "समाप्त",
        }
    }
}

impl ActivityShort {
    pub fn status_at(&self, now: OffsetDateTime) -> ActivityStatus {
        if now < self.start_datetime {
            ActivityStatus::Upcoming
        } else if now <= self.end_datetime {
            ActivityStatus::Ongoing
        } else {
            ActivityStatus::Past
        }
    }
}

/// Identity of an admin list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenKey {
    EkalArya,
    AryaPariwar,
    AryaSamaj,
    Activities,
}

impl ScreenKey {
    pub const ALL: [Self; 4] = [
        Self::EkalArya,
        Self::AryaPariwar,
        Self::AryaSamaj,
        Self::Activities,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EkalArya => "ekal-arya",
            Self::AryaPariwar => "arya-pariwar",
            Self::AryaSamaj => "arya-samaj",
            Self::Activities => "activities",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ekal-arya" | "members" => Some(Self::EkalArya),
            "arya-pariwar" | "families" => Some(Self::AryaPariwar),
            "arya-samaj" => Some(Self::AryaSamaj),
            "activities" => Some(Self::Activities),
            _ => None,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::EkalArya => "एकल आर्य",
            Self::AryaPariwar => "आर्य परिवार",
            Self::AryaSamaj => "आर्य समाज",
            Self::Activities => "गतिविधियाँ",
        }
    }

    pub const fn search_placeholder(self) -> &'static str {
        match self {
            Self::EkalArya => "आर्य का नाम/दूरभाष",
            Self::AryaPariwar => "परिवार का नाम",
            Self::AryaSamaj => "आर्य समाज का नाम",
            Self::Activities => "गतिविधि का नाम",
        }
    }

    pub const fn empty_state_text(self) -> &'static str {
        match self {
            Self::EkalArya => "कोई एकल आर्य नहीं मिले",
            Self::AryaPariwar => "कोई आर्य परिवार नहीं मिले",
            Self::AryaSamaj => "कोई आर्य समाज नहीं मिले",
            Self::Activities => "कोई गतिविधि नहीं मिली",
        }
    }

    pub fn end_of_list_text(self, count: usize) -> String {
        let count = to_devanagari_numerals(&count.to_string());
        match self {
            Self::EkalArya => format!("सभी आर्य सदस्य दिखाए गए({count})"),
            Self::AryaPariwar => format!("सभी आर्य परिवार दिखाए गए({count})"),
            Self::AryaSamaj => format!("सभी आर्य समाज दिखाए गए({count})"),
            Self::Activities => format!("सभी गतिविधियाँ दिखाई गईं({count})"),
        }
    }
}

pub fn to_devanagari_numerals(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch.to_digit(10) {
            Some(digit) => char::from_u32(0x0966 + digit).unwrap_or(ch),
            None => ch,
        })
        .collect()
}
