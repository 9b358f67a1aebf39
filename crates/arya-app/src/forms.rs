// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use time::{Date, OffsetDateTime};

use crate::{ActivityType, AryaSamajId, FieldError, MemberId};

/// Change to one optional column in an update mutation.
///
/// `Unchanged` leaves the key out of the `set` object, `Clear` writes an
/// explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    SetTo(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Unchanged, Self::SetTo)
    }

    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::SetTo(value) => FieldUpdate::SetTo(f(value)),
            Self::Clear => FieldUpdate::Clear,
        }
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::SetTo(value) => Some(value),
            Self::Unchanged | Self::Clear => None,
        }
    }
}

impl<T: Serialize> FieldUpdate<T> {
    pub fn write_into(&self, object: &mut Map<String, Value>, key: &str) -> Result<()> {
        match self {
            Self::Unchanged => {}
            Self::Clear => {
                object.insert(key.to_owned(), Value::Null);
            }
            Self::SetTo(value) => {
                let value = serde_json::to_value(value)
                    .with_context(|| format!("encode update for {key}"))?;
                object.insert(key.to_owned(), value);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "पुरुष",
            Self::Female => "स्त्री",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressInput {
    pub basic_address: String,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub vidhansabha: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberFormInput {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub dob: Option<Date>,
    pub gender: Option<Gender>,
    pub educational_qualification: String,
    pub occupation: String,
    pub introduction: String,
    pub arya_samaj_id: Option<AryaSamajId>,
    pub address: AddressInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyFormInput {
    pub name: String,
    pub arya_samaj_id: Option<AryaSamajId>,
    pub head_member_id: Option<MemberId>,
    pub member_ids: Vec<MemberId>,
    pub address: AddressInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AryaSamajFormInput {
    pub name: String,
    pub description: String,
    pub member_ids: Vec<MemberId>,
    pub address: AddressInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFormInput {
    pub name: String,
    pub activity_type: Option<ActivityType>,
    pub short_description: String,
    pub long_description: String,
    pub start_datetime: Option<OffsetDateTime>,
    pub end_datetime: Option<OffsetDateTime>,
    pub capacity: Option<u32>,
    pub organisation_ids: Vec<AryaSamajId>,
    pub address: AddressInput,
}

/// Partial update for an existing member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberUpdate {
    pub name: FieldUpdate<String>,
    pub phone_number: FieldUpdate<String>,
    pub email: FieldUpdate<String>,
    pub dob: FieldUpdate<Date>,
    pub educational_qualification: FieldUpdate<String>,
    pub occupation: FieldUpdate<String>,
    pub introduction: FieldUpdate<String>,
    pub profile_image: FieldUpdate<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPayload {
    Member(MemberFormInput),
    Family(FamilyFormInput),
    AryaSamaj(AryaSamajFormInput),
    Activity(ActivityFormInput),
}

impl FormPayload {
    /// Every failing field, in form order.
    pub fn errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match self {
            Self::Member(member) => member.check(&mut errors),
            Self::Family(family) => family.check(&mut errors),
            Self::AryaSamaj(samaj) => samaj.check(&mut errors),
            Self::Activity(activity) => activity.check(&mut errors),
        }
        errors
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        match self.errors().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::Required { field });
        return false;
    }
    true
}

fn max_len(errors: &mut Vec<FieldError>, field: &'static str, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        errors.push(FieldError::TooLong { field, max });
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_pincode(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

impl AddressInput {
    fn check(&self, errors: &mut Vec<FieldError>) {
        require(errors, "address", &self.basic_address);
        require(errors, "state", &self.state);
        require(errors, "district", &self.district);
        let pincode = self.pincode.trim();
        if !pincode.is_empty() && !is_valid_pincode(pincode) {
            errors.push(FieldError::InvalidFormat { field: "pincode" });
        }
        if let Some(latitude) = self.latitude
            && !(-90.0..=90.0).contains(&latitude)
        {
            errors.push(FieldError::InvalidFormat { field: "latitude" });
        }
        if let Some(longitude) = self.longitude
            && !(-180.0..=180.0).contains(&longitude)
        {
            errors.push(FieldError::InvalidFormat { field: "longitude" });
        }
    }
}

impl MemberFormInput {
    fn check(&self, errors: &mut Vec<FieldError>) {
        require(errors, "name", &self.name);
        if require(errors, "phone_number", &self.phone_number)
            && !is_valid_phone(self.phone_number.trim())
        {
            errors.push(FieldError::InvalidFormat {
                field: "phone_number",
            });
        }
        let email = self.email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(FieldError::InvalidFormat { field: "email" });
        }
        if self.dob.is_none() {
            errors.push(FieldError::Required { field: "dob" });
        }
        if self.gender.is_none() {
            errors.push(FieldError::Required { field: "gender" });
        }
        self.address.check(errors);
    }
}

impl FamilyFormInput {
    fn check(&self, errors: &mut Vec<FieldError>) {
        require(errors, "name", &self.name);
        if self.member_ids.is_empty() {
            errors.push(FieldError::Required {
                field: "member_ids",
            });
        }
        if let Some(head) = &self.head_member_id
            && !self.member_ids.contains(head)
        {
            errors.push(FieldError::InvalidFormat {
                field: "head_member_id",
            });
        }
        self.address.check(errors);
    }
}

impl AryaSamajFormInput {
    fn check(&self, errors: &mut Vec<FieldError>) {
        require(errors, "name", &self.name);
        require(errors, "description", &self.description);
        self.address.check(errors);
    }
}

impl ActivityFormInput {
    fn check(&self, errors: &mut Vec<FieldError>) {
        if require(errors, "name", &self.name) {
            max_len(errors, "name", &self.name, 100);
        }
        if self.activity_type.is_none() {
            errors.push(FieldError::Required {
                field: "activity_type",
            });
        }
        require(errors, "short_description", &self.short_description);
        if require(errors, "long_description", &self.long_description) {
            max_len(errors, "long_description", &self.long_description, 1000);
        }
        if self.organisation_ids.is_empty() {
            errors.push(FieldError::Required {
                field: "organisation_ids",
            });
        }
        match (self.start_datetime, self.end_datetime) {
            (Some(start), Some(end)) if end < start => errors.push(FieldError::OutOfOrder {
                field: "end_datetime",
                other: "start_datetime",
            }),
            (None, _) => errors.push(FieldError::Required {
                field: "start_datetime",
            }),
            (_, None) => errors.push(FieldError::Required {
                field: "end_datetime",
            }),
            _ => {}
        }
        if self.capacity == Some(0) {
            errors.push(FieldError::InvalidFormat { field: "capacity" });
        }
        self.address.check(errors);
    }
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_unchanged()
            && self.phone_number.is_unchanged()
            && self.email.is_unchanged()
            && self.dob.is_unchanged()
            && self.educational_qualification.is_unchanged()
            && self.occupation.is_unchanged()
            && self.introduction.is_unchanged()
            && self.profile_image.is_unchanged()
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        match &self.name {
            FieldUpdate::Clear => return Err(FieldError::Required { field: "name" }),
            FieldUpdate::SetTo(name) if name.trim().is_empty() => {
                return Err(FieldError::Required { field: "name" });
            }
            _ => {}
        }
        if let Some(phone) = self.phone_number.as_set()
            && !is_valid_phone(phone.trim())
        {
            return Err(FieldError::InvalidFormat {
                field: "phone_number",
            });
        }
        if let Some(email) = self.email.as_set()
            && !is_valid_email(email.trim())
        {
            return Err(FieldError::InvalidFormat { field: "email" });
        }
        Ok(())
    }

    /// The `set` object of an `updateMemberCollection` mutation, with
    /// backend column names.
    pub fn to_set_object(&self) -> Result<Map<String, Value>> {
        let mut set = Map::new();
        self.name.write_into(&mut set, "name")?;
        self.phone_number.write_into(&mut set, "phoneNumber")?;
        self.email.write_into(&mut set, "email")?;
        self.dob
            .clone()
            .map(|dob| dob.to_string())
            .write_into(&mut set, "dob")?;
        self.educational_qualification
            .write_into(&mut set, "educationalQualification")?;
        self.occupation.write_into(&mut set, "occupation")?;
        self.introduction.write_into(&mut set, "introduction")?;
        self.profile_image.write_into(&mut set, "profileImage")?;
        Ok(set)
    }
}
