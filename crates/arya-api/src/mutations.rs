// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use arya_app::{
    AddressId, AddressInput, AppError, FormPayload, MemberFormInput, MemberId, MemberUpdate,
    ScreenKey,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::Client;

const UPDATE_MEMBER: &str = "mutation UpdateMember($id: UUID!, $set: MemberUpdateInput!) { \
    updateMemberCollection(filter: { id: { eq: $id } }, set: $set) { affectedCount } }";

const INSERT_ADDRESS: &str = "mutation InsertAddress($input: AddressInsertInput!) { \
    insertIntoAddressCollection(objects: [$input]) { records { id } } }";

const INSERT_MEMBER: &str = "mutation InsertMember($input: MemberInsertInput!) { \
    insertIntoMemberCollection(objects: [$input]) { records { id } } }";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Affected {
    affected_count: u64,
}

#[derive(Debug, Deserialize)]
struct Inserted {
    records: Vec<InsertedRecord>,
}

#[derive(Debug, Deserialize)]
struct InsertedRecord {
    id: String,
}

/// Backend table behind each list screen, as named in mutation fields.
const fn table_for(screen: ScreenKey) -> &'static str {
    match screen {
        ScreenKey::EkalArya => "Member",
        ScreenKey::AryaPariwar => "Family",
        ScreenKey::AryaSamaj => "AryaSamaj",
        ScreenKey::Activities => "Activities",
    }
}

fn single<T>(mut data: serde_json::Map<String, Value>, field: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    let value = data
        .remove(field)
        .ok_or_else(|| AppError::Decode(format!("response has no {field}")))?;
    serde_json::from_value(value).map_err(|error| AppError::Decode(format!("decode {field}: {error}")))
}

fn first_id(inserted: Inserted, what: &str) -> Result<String, AppError> {
    inserted
        .records
        .into_iter()
        .next()
        .map(|record| record.id)
        .ok_or_else(|| AppError::Unknown(format!("{what} was not created")))
}

fn address_object(address: &AddressInput) -> Value {
    let trimmed = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    };
    json!({
        "basicAddress": trimmed(&address.basic_address),
        "state": trimmed(&address.state),
        "district": trimmed(&address.district),
        "pincode": trimmed(&address.pincode),
        "vidhansabha": trimmed(&address.vidhansabha),
        "latitude": address.latitude,
        "longitude": address.longitude,
    })
}

impl Client {
    /// Apply a partial update. Untouched fields are left out of the `set`
    /// object; cleared fields are sent as `null`.
    pub fn update_member(&self, id: &MemberId, update: &MemberUpdate) -> Result<(), AppError> {
        update.validate()?;
        if update.is_empty() {
            return Ok(());
        }
        let set = update
            .to_set_object()
            .map_err(|error| AppError::Decode(format!("{error:#}")))?;
        let data = self.execute(UPDATE_MEMBER, json!({ "id": id.as_str(), "set": set }))?;
        let affected: Affected = single(data, "updateMemberCollection")?;
        if affected.affected_count == 0 {
            return Err(AppError::from_status(404, ""));
        }
        info!(member = %id, "member updated");
        Ok(())
    }

    pub fn create_address(&self, address: &AddressInput) -> Result<AddressId, AppError> {
        let data = self.execute(INSERT_ADDRESS, json!({ "input": address_object(address) }))?;
        let inserted: Inserted = single(data, "insertIntoAddressCollection")?;
        first_id(inserted, "address").map(AddressId::new)
    }

    /// Insert the address first, then the member pointing at it.
    pub fn create_member(&self, input: &MemberFormInput) -> Result<MemberId, AppError> {
        FormPayload::Member(input.clone()).validate()?;
        let address_id = self.create_address(&input.address)?;

        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_owned())
        };
        let member = json!({
            "name": input.name.trim(),
            "phoneNumber": input.phone_number.trim(),
            "email": optional(&input.email),
            "dob": input.dob.map(|dob| dob.to_string()),
            "gender": input.gender,
            "educationalQualification": optional(&input.educational_qualification),
            "occupation": optional(&input.occupation),
            "introduction": optional(&input.introduction),
            "addressId": address_id.as_str(),
            "aryaSamajId": input.arya_samaj_id.as_ref().map(|id| id.as_str()),
        });
        let id = self
            .execute(INSERT_MEMBER, json!({ "input": member }))
            .and_then(|data| single::<Inserted>(data, "insertIntoMemberCollection"))
            .and_then(|inserted| first_id(inserted, "member").map(MemberId::new));
        match id {
            Ok(id) => {
                info!(member = %id, "member created");
                Ok(id)
            }
            Err(error) => {
                // The address row is only reachable through the member.
                if let Err(cleanup) = self.delete_from("Address", address_id.as_str()) {
                    warn!(address = %address_id, error = %cleanup, "orphaned address left behind");
                }
                Err(error)
            }
        }
    }

    /// Delete one record shown on `screen`.
    pub fn delete_record(&self, screen: ScreenKey, id: &str) -> Result<(), AppError> {
        self.delete_from(table_for(screen), id)?;
        info!(screen = screen.as_str(), id, "record deleted");
        Ok(())
    }

    fn delete_from(&self, table: &str, id: &str) -> Result<(), AppError> {
        let field = format!("deleteFrom{table}Collection");
        let query = format!(
            "mutation Delete($id: UUID!) {{ {field}(filter: {{ id: {{ eq: $id }} }}) {{ affectedCount }} }}"
        );
        let data = self.execute(&query, json!({ "id": id }))?;
        let affected: Affected = single(data, &field)?;
        if affected.affected_count == 0 {
            return Err(AppError::from_status(404, ""));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{address_object, table_for};
    use arya_app::{AddressInput, ScreenKey};
    use serde_json::json;

    #[test]
    fn address_object_nulls_blank_fields() {
        let address = AddressInput {
            basic_address: " 12, मुख्य मार्ग ".to_owned(),
            state: "हरियाणा".to_owned(),
            ..AddressInput::default()
        };
        assert_eq!(
            address_object(&address),
            json!({
                "basicAddress": "12, मुख्य मार्ग",
                "state": "हरियाणा",
                "district": null,
                "pincode": null,
                "vidhansabha": null,
                "latitude": null,
                "longitude": null,
            })
        );
    }

    #[test]
    fn every_screen_has_a_table() {
        assert_eq!(table_for(ScreenKey::AryaPariwar), "Family");
        assert_eq!(table_for(ScreenKey::Activities), "Activities");
    }
}
