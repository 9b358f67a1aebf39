// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Relay-style list queries over the four admin collections.

use arya_app::{
    ActivityId, ActivityShort, ActivityType, AppError, AryaSamajId, AryaSamajListItem, Cursor,
    FamilyId, FamilyShort, MemberId, MemberShort, Page, PaginatedRepository,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::Client;

/// Static description of one paginated collection.
#[derive(Debug, Clone, Copy)]
pub struct Collection {
    pub name: &'static str,
    pub filter_type: &'static str,
    pub search_fields: &'static [&'static str],
    pub node_fields: &'static str,
}

pub const EKAL_ARYA: Collection = Collection {
    name: "memberNotInFamilyCollection",
    filter_type: "MemberNotInFamilyFilter",
    search_fields: &["name", "phoneNumber"],
    node_fields: "id name profileImage district state",
};

pub const FAMILIES: Collection = Collection {
    name: "familyCollection",
    filter_type: "FamilyFilter",
    search_fields: &["name"],
    node_fields: "id name photos \
        address { basicAddress district state pincode } \
        aryaSamaj { name }",
};

pub const ARYA_SAMAJS: Collection = Collection {
    name: "aryaSamajCollection",
    filter_type: "AryaSamajFilter",
    search_fields: &["name"],
    node_fields: "id name description mediaUrls \
        address { basicAddress district state pincode } \
        samajMemberCollection { totalCount }",
};

pub const ACTIVITIES: Collection = Collection {
    name: "activitiesCollection",
    filter_type: "ActivitiesFilter",
    search_fields: &["name"],
    node_fields: "id name type shortDescription district state startDatetime endDatetime",
};

impl Collection {
    pub fn query(&self) -> String {
        format!(
            "query Page($first: Int!, $after: Cursor, $filter: {filter}) {{ \
               {name}(first: $first, after: $after, filter: $filter, \
                      orderBy: [{{ createdAt: DescNullsLast }}]) {{ \
                 edges {{ node {{ {fields} }} }} \
                 pageInfo {{ hasNextPage endCursor }} \
               }} \
             }}",
            filter = self.filter_type,
            name = self.name,
            fields = self.node_fields,
        )
    }

    /// `ilike` filter matching `term` anywhere in any searchable column.
    pub fn search_filter(&self, term: &str) -> Value {
        let pattern = format!("%{}%", term.trim());
        let mut clauses: Vec<Value> = self
            .search_fields
            .iter()
            .map(|field| {
                let mut clause = Map::new();
                clause.insert((*field).to_owned(), json!({ "ilike": pattern }));
                Value::Object(clause)
            })
            .collect();
        if clauses.len() == 1 {
            return clauses.remove(0);
        }
        json!({ "or": clauses })
    }

    pub fn variables(&self, page_size: usize, cursor: Option<&Cursor>, term: Option<&str>) -> Value {
        json!({
            "first": page_size,
            "after": cursor.map(Cursor::as_str),
            "filter": term.map(|term| self.search_filter(term)),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<N> {
    edges: Vec<Edge<N>>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct Edge<N> {
    node: N,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

fn fetch_page<N, T>(
    client: &Client,
    collection: &Collection,
    page_size: usize,
    cursor: Option<&Cursor>,
    term: Option<&str>,
    convert: impl Fn(N) -> Result<T, AppError>,
) -> Result<Page<T>, AppError>
where
    N: DeserializeOwned,
{
    let mut data: Map<String, Value> =
        client.execute(&collection.query(), collection.variables(page_size, cursor, term))?;
    let connection = data
        .remove(collection.name)
        .filter(|value| !value.is_null())
        .ok_or_else(|| AppError::Decode(format!("response has no {}", collection.name)))?;
    let connection: Connection<N> = serde_json::from_value(connection)
        .map_err(|error| AppError::Decode(format!("decode {}: {error}", collection.name)))?;

    let items = connection
        .edges
        .into_iter()
        .map(|edge| convert(edge.node))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        collection = collection.name,
        items = items.len(),
        has_next_page = connection.page_info.has_next_page,
        "fetched page"
    );
    Ok(Page {
        items,
        has_next_page: connection.page_info.has_next_page,
        end_cursor: connection.page_info.end_cursor.map(Cursor::new),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressNode {
    basic_address: Option<String>,
    district: Option<String>,
    state: Option<String>,
    pincode: Option<String>,
}

impl AddressNode {
    /// "basic, district, state pincode" with empty parts dropped.
    fn formatted(&self) -> String {
        let parts: Vec<&str> = [&self.basic_address, &self.district]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let tail = [&self.state, &self.pincode]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let mut formatted = parts.join(", ");
        if !tail.is_empty() {
            if !formatted.is_empty() {
                formatted.push_str(", ");
            }
            formatted.push_str(&tail);
        }
        formatted
    }
}

fn required(value: Option<String>, what: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Decode(format!("missing {what}")))
}

fn join_place(district: Option<String>, state: Option<String>) -> String {
    [district, state]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberNode {
    id: Option<String>,
    name: Option<String>,
    profile_image: Option<String>,
    district: Option<String>,
    state: Option<String>,
}

fn member(node: MemberNode) -> Result<MemberShort, AppError> {
    Ok(MemberShort {
        id: MemberId::new(required(node.id, "member id")?),
        name: required(node.name, "member name")?,
        profile_image: node.profile_image.unwrap_or_default(),
        place: join_place(node.district, node.state),
    })
}

#[derive(Debug, Deserialize)]
struct NamedNode {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyNode {
    id: String,
    name: Option<String>,
    photos: Option<Vec<String>>,
    address: Option<AddressNode>,
    arya_samaj: Option<NamedNode>,
}

fn family(node: FamilyNode) -> Result<FamilyShort, AppError> {
    Ok(FamilyShort {
        id: FamilyId::new(node.id),
        name: node.name.unwrap_or_default(),
        photos: node.photos.unwrap_or_default(),
        address: node.address.unwrap_or_default().formatted(),
        arya_samaj_name: node
            .arya_samaj
            .and_then(|samaj| samaj.name)
            .unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AryaSamajNode {
    id: String,
    name: Option<String>,
    description: Option<String>,
    media_urls: Option<Vec<String>>,
    address: Option<AddressNode>,
    samaj_member_collection: Option<TotalCount>,
}

fn arya_samaj(node: AryaSamajNode) -> Result<AryaSamajListItem, AppError> {
    Ok(AryaSamajListItem {
        id: AryaSamajId::new(node.id),
        name: node.name.unwrap_or_default(),
        description: node.description.unwrap_or_default(),
        formatted_address: node.address.unwrap_or_default().formatted(),
        member_count: node
            .samaj_member_collection
            .map_or(0, |members| members.total_count),
        media_urls: node.media_urls.unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityNode {
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    short_description: Option<String>,
    district: Option<String>,
    state: Option<String>,
    start_datetime: String,
    end_datetime: String,
}

fn parse_datetime(value: &str, what: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|error| AppError::Decode(format!("parse {what} {value:?}: {error}")))
}

fn activity(node: ActivityNode) -> Result<ActivityShort, AppError> {
    let activity_type = ActivityType::parse(&node.kind)
        .ok_or_else(|| AppError::Decode(format!("unknown activity type {:?}", node.kind)))?;
    Ok(ActivityShort {
        id: ActivityId::new(node.id),
        name: node.name.unwrap_or_default(),
        activity_type,
        short_description: node.short_description.unwrap_or_default(),
        district: node.district.unwrap_or_default(),
        state: node.state.unwrap_or_default(),
        start_datetime: parse_datetime(&node.start_datetime, "startDatetime")?,
        end_datetime: parse_datetime(&node.end_datetime, "endDatetime")?,
    })
}

macro_rules! collection_repository {
    ($name:ident, $record:ty, $collection:expr, $convert:path) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            client: Client,
        }

        impl $name {
            pub fn new(client: Client) -> Self {
                Self { client }
            }
        }

        impl PaginatedRepository<$record> for $name {
            fn list_page(
                &self,
                page_size: usize,
                cursor: Option<&Cursor>,
            ) -> Result<Page<$record>, AppError> {
                fetch_page(&self.client, &$collection, page_size, cursor, None, $convert)
            }

            fn search_page(
                &self,
                term: &str,
                page_size: usize,
                cursor: Option<&Cursor>,
            ) -> Result<Page<$record>, AppError> {
                fetch_page(&self.client, &$collection, page_size, cursor, Some(term), $convert)
            }
        }
    };
}

collection_repository!(EkalAryaRepository, MemberShort, EKAL_ARYA, member);
collection_repository!(FamilyRepository, FamilyShort, FAMILIES, family);
collection_repository!(AryaSamajRepository, AryaSamajListItem, ARYA_SAMAJS, arya_samaj);
collection_repository!(ActivityRepository, ActivityShort, ACTIVITIES, activity);

#[cfg(test)]
mod tests {
    use super::{ACTIVITIES, AddressNode, EKAL_ARYA, FAMILIES};
    use arya_app::Cursor;
    use serde_json::json;

    #[test]
    fn member_search_matches_name_or_phone() {
        assert_eq!(
            EKAL_ARYA.search_filter(" राम "),
            json!({ "or": [
                { "name": { "ilike": "%राम%" } },
                { "phoneNumber": { "ilike": "%राम%" } },
            ]})
        );
    }

    #[test]
    fn single_field_search_is_a_plain_filter() {
        assert_eq!(
            FAMILIES.search_filter("शर्मा"),
            json!({ "name": { "ilike": "%शर्मा%" } })
        );
    }

    #[test]
    fn listing_variables_leave_filter_null() {
        let variables = ACTIVITIES.variables(25, Some(&Cursor::new("C1")), None);
        assert_eq!(
            variables,
            json!({ "first": 25, "after": "C1", "filter": null })
        );
    }

    #[test]
    fn query_orders_newest_first() {
        let query = FAMILIES.query();
        assert!(query.contains("familyCollection(first: $first, after: $after"));
        assert!(query.contains("createdAt: DescNullsLast"));
        assert!(query.contains("$filter: FamilyFilter"));
    }

    #[test]
    fn address_formatting_skips_blank_parts() {
        let address = AddressNode {
            basic_address: Some("12, दयानंद मार्ग".to_owned()),
            district: Some(" ".to_owned()),
            state: Some("हरियाणा".to_owned()),
            pincode: Some("124001".to_owned()),
        };
        assert_eq!(address.formatted(), "12, दयानंद मार्ग, हरियाणा 124001");
        assert_eq!(AddressNode::default().formatted(), "");
    }
}
