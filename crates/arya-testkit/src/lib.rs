// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use arya_app::{
    ActivityId, ActivityShort, ActivityType, AppError, AryaSamajId, AryaSamajListItem, Cursor,
    FamilyId, FamilyShort, MemberId, MemberShort, Page, PaginatedRepository,
};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration as StdDuration;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "राम", "श्याम", "सीता", "गीता", "मोहन", "सुरेश", "अनिल", "सुनीता", "विजय", "कमला", "प्रकाश",
    "राधा", "देवेन्द्र", "सावित्री", "हरीश", "उर्मिला",
];
const LAST_NAMES: [&str; 10] = [
    "शर्मा", "आर्य", "वर्मा", "सिंह", "गुप्ता", "यादव", "शास्त्री", "त्यागी", "मलिक", "चौधरी",
];
const PLACES: [(&str, &str); 10] = [
    ("रोहतक", "हरियाणा"),
    ("हिसार", "हरियाणा"),
    ("पानीपत", "हरियाणा"),
    ("दिल्ली", "दिल्ली"),
    ("जयपुर", "राजस्थान"),
    ("अजमेर", "राजस्थान"),
    ("मेरठ", "उत्तर प्रदेश"),
    ("आगरा", "उत्तर प्रदेश"),
    ("इंदौर", "मध्य प्रदेश"),
    ("देहरादून", "उत्तराखंड"),
];
const ROADS: [&str; 6] = [
    "मुख्य मार्ग",
    "स्टेशन रोड",
    "दयानंद मार्ग",
    "गांधी नगर",
    "आर्य नगर",
    "सुभाष चौक",
];
const ACTIVITY_NAMES: [&str; 8] = [
    "साप्ताहिक सत्संग",
    "वार्षिकोत्सव",
    "यज्ञ प्रशिक्षण",
    "युवा चरित्र निर्माण शिविर",
    "वेद प्रचार सप्ताह",
    "संस्कृत कक्षा",
    "नशा मुक्ति अभियान",
    "आर्य प्रशिक्षण सत्र",
];
const DESCRIPTIONS: [&str; 5] = [
    "वैदिक सिद्धांतों का प्रचार एवं प्रसार",
    "समाज सेवा एवं शिक्षा के लिए समर्पित",
    "नियमित यज्ञ एवं सत्संग का आयोजन",
    "युवाओं में संस्कारों का विकास",
    "महर्षि दयानंद के विचारों का प्रसार",
];
const ACTIVITY_TYPES: [ActivityType; 7] = [
    ActivityType::Session,
    ActivityType::ProtectionSession,
    ActivityType::BodhSession,
    ActivityType::Camp,
    ActivityType::Course,
    ActivityType::Event,
    ActivityType::Campaign,
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for list records. Same seed, same records.
#[derive(Debug, Clone)]
pub struct AryaFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl AryaFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn person_name(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        format!("{first} {last}")
    }

    pub fn member(&mut self) -> MemberShort {
        let id = self.id("member");
        let (city, state) = self.place();
        MemberShort {
            id: MemberId::new(id),
            name: self.person_name(),
            profile_image: String::new(),
            place: format!("{city}, {state}"),
        }
    }

    pub fn family(&mut self) -> FamilyShort {
        let id = self.id("family");
        let last = self.pick(&LAST_NAMES);
        let (city, state) = self.place();
        let road = self.pick(&ROADS);
        FamilyShort {
            id: FamilyId::new(id),
            name: format!("{last} परिवार"),
            photos: Vec::new(),
            address: format!("{}, {road}, {city}, {state}", self.int_range(1, 400)),
            arya_samaj_name: format!("आर्य समाज {city}"),
        }
    }

    pub fn arya_samaj(&mut self) -> AryaSamajListItem {
        let id = self.id("samaj");
        let (city, state) = self.place();
        let road = self.pick(&ROADS);
        AryaSamajListItem {
            id: AryaSamajId::new(id),
            name: format!("आर्य समाज {road}, {city}"),
            description: self.pick(&DESCRIPTIONS).to_owned(),
            formatted_address: format!("{road}, {city}, {state}"),
            member_count: self.int_range(5, 250) as u32,
            media_urls: Vec::new(),
        }
    }

    pub fn activity(&mut self) -> ActivityShort {
        let id = self.id("activity");
        let activity_type = ACTIVITY_TYPES[self.rng.int_n(ACTIVITY_TYPES.len())];
        let (district, state) = self.place();
        let start = reference_now() + Duration::days(self.int_range(-120, 120) as i64);
        let days = if activity_type.is_multi_session() {
            self.int_range(3, 21)
        } else {
            self.int_range(0, 2)
        };
        ActivityShort {
            id: ActivityId::new(id),
            name: self.pick(&ACTIVITY_NAMES).to_owned(),
            activity_type,
            short_description: self.pick(&DESCRIPTIONS).to_owned(),
            district: district.to_owned(),
            state: state.to_owned(),
            start_datetime: start,
            end_datetime: start + Duration::days(days as i64) + Duration::hours(3),
        }
    }

    pub fn members(&mut self, count: usize) -> Vec<MemberShort> {
        (0..count).map(|_| self.member()).collect()
    }

    pub fn families(&mut self, count: usize) -> Vec<FamilyShort> {
        (0..count).map(|_| self.family()).collect()
    }

    pub fn arya_samajs(&mut self, count: usize) -> Vec<AryaSamajListItem> {
        (0..count).map(|_| self.arya_samaj()).collect()
    }

    pub fn activities(&mut self, count: usize) -> Vec<ActivityShort> {
        (0..count).map(|_| self.activity()).collect()
    }

    fn id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{:04}", self.next_id);
        self.next_id += 1;
        id
    }

    fn place(&mut self) -> (&'static str, &'static str) {
        PLACES[self.rng.int_n(PLACES.len())]
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (self.rng.next_u64() % (span as u64)) as i64;
        (i64::from(min) + offset) as i32
    }
}

/// Text a scripted repository matches search terms against.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for MemberShort {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for FamilyShort {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for AryaSamajListItem {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ActivityShort {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    List {
        page_size: usize,
        cursor: Option<Cursor>,
    },
    Search {
        term: String,
        page_size: usize,
        cursor: Option<Cursor>,
    },
}

/// In-memory repository over a fixed record set. Pages by offset cursors,
/// matches search terms case-insensitively against [`Named::name`], records
/// every call, and can be told to fail upcoming calls.
#[derive(Debug)]
pub struct ScriptedRepository<T> {
    records: Vec<T>,
    calls: Mutex<Vec<RepoCall>>,
    failures: Mutex<VecDeque<AppError>>,
    latency: Option<StdDuration>,
}

impl<T: Clone + Named> ScriptedRepository<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            latency: None,
        }
    }

    /// Sleep before answering, so loading states stay visible.
    pub fn with_latency(mut self, latency: StdDuration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next(&self, error: AppError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RepoCall::Search { term, .. } => Some(term),
                RepoCall::List { .. } => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, call: RepoCall) -> Result<(), AppError> {
        tracing::trace!(?call, "scripted repository call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        match self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn page_of(
        &self,
        matching: Vec<&T>,
        page_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<T>, AppError> {
        let start = match cursor {
            None => 0,
            Some(cursor) => decode_cursor(cursor)?,
        };
        let end = (start + page_size).min(matching.len());
        let items: Vec<T> = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|record| (*record).clone())
            .collect();
        if end < matching.len() {
            Ok(Page::more(items, encode_cursor(end)))
        } else {
            Ok(Page::last(items))
        }
    }
}

impl<T: Clone + Named> PaginatedRepository<T> for ScriptedRepository<T> {
    fn list_page(&self, page_size: usize, cursor: Option<&Cursor>) -> Result<Page<T>, AppError> {
        self.record(RepoCall::List {
            page_size,
            cursor: cursor.cloned(),
        })?;
        self.page_of(self.records.iter().collect(), page_size, cursor)
    }

    fn search_page(
        &self,
        term: &str,
        page_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Page<T>, AppError> {
        self.record(RepoCall::Search {
            term: term.to_owned(),
            page_size,
            cursor: cursor.cloned(),
        })?;
        let needle = term.to_lowercase();
        let matching = self
            .records
            .iter()
            .filter(|record| record.name().to_lowercase().contains(&needle))
            .collect();
        self.page_of(matching, page_size, cursor)
    }
}

pub fn encode_cursor(offset: usize) -> Cursor {
    Cursor::new(format!("offset:{offset}"))
}

fn decode_cursor(cursor: &Cursor) -> Result<usize, AppError> {
    cursor
        .as_str()
        .strip_prefix("offset:")
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(|| AppError::GraphQl(format!("invalid cursor {cursor}")))
}

/// Midnight UTC on 1 January of the fixture year.
pub fn reference_now() -> OffsetDateTime {
    let date = Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1).unwrap_or(Date::MIN);
    date.with_time(Time::MIDNIGHT).assume_utc()
}
