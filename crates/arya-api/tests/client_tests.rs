// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use arya_api::{ActivityRepository, Client, EkalAryaRepository, Geocoder};
use arya_app::{
    ActivityType, AddressInput, AppError, Cursor, FieldUpdate, Gender, MemberFormInput, MemberId,
    MemberUpdate, NetworkError, PaginatedRepository, ScreenKey,
};
use time::macros::date;
use serde_json::{Value, json};
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

#[derive(Debug)]
struct Captured {
    url: String,
    body: String,
    apikey: Option<String>,
    authorization: Option<String>,
    user_agent: Option<String>,
}

impl Captured {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Answer each incoming request with the next canned `(status, body)`.
fn serve(responses: Vec<(u16, String)>) -> Result<(String, JoinHandle<Vec<Captured>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().expect("request expected");
            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv(name))
                    .map(|header| header.value.as_str().to_owned())
            };
            let apikey = header("apikey");
            let authorization = header("Authorization");
            let user_agent = header("User-Agent");
            let mut request_body = String::new();
            request
                .as_reader()
                .read_to_string(&mut request_body)
                .expect("request body should read");
            captured.push(Captured {
                url: request.url().to_owned(),
                body: request_body,
                apikey,
                authorization,
                user_agent,
            });
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
        captured
    });
    Ok((addr, handle))
}

fn client(addr: &str) -> Result<Client> {
    Client::new(addr, "anon-key", Duration::from_secs(2))
}

#[test]
fn ekal_arya_page_is_decoded_with_cursor() -> Result<()> {
    let body = json!({
        "data": {
            "memberNotInFamilyCollection": {
                "edges": [
                    { "node": { "id": "m-1", "name": "राम शर्मा", "profileImage": null,
                                "district": "रोहतक", "state": "हरियाणा" } },
                    { "node": { "id": "m-2", "name": "सीता आर्य", "profileImage": "https://img/2.webp",
                                "district": null, "state": null } }
                ],
                "pageInfo": { "hasNextPage": true, "endCursor": "C1" }
            }
        }
    });
    let (addr, handle) = serve(vec![(200, body.to_string())])?;

    let repo = EkalAryaRepository::new(client(&addr)?);
    let page = repo.list_page(30, None)?;

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "राम शर्मा");
    assert_eq!(page.items[0].place, "रोहतक, हरियाणा");
    assert_eq!(page.items[1].profile_image, "https://img/2.webp");
    assert!(page.has_next_page);
    assert_eq!(page.end_cursor, Some(Cursor::new("C1")));

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].url, "/graphql/v1");
    assert_eq!(captured[0].apikey.as_deref(), Some("anon-key"));
    assert_eq!(captured[0].authorization.as_deref(), Some("Bearer anon-key"));
    let request = captured[0].json();
    assert_eq!(request["variables"]["first"], json!(30));
    assert_eq!(request["variables"]["filter"], Value::Null);
    Ok(())
}

#[test]
fn search_sends_ilike_filter_and_cursor() -> Result<()> {
    let body = json!({
        "data": {
            "activitiesCollection": {
                "edges": [
                    { "node": { "id": "a-1", "name": "यज्ञ प्रशिक्षण", "type": "COURSE",
                                "shortDescription": "सात दिवसीय", "district": "हिसार",
                                "state": "हरियाणा",
                                "startDatetime": "2026-03-01T09:00:00+05:30",
                                "endDatetime": "2026-03-07T12:00:00+05:30" } }
                ],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            }
        }
    });
    let (addr, handle) = serve(vec![(200, body.to_string())])?;

    let repo = ActivityRepository::new(client(&addr)?);
    let page = repo.search_page("यज्ञ", 15, Some(&Cursor::new("C9")))?;
    assert_eq!(page.items[0].activity_type, ActivityType::Course);
    assert!(!page.has_next_page);
    assert_eq!(page.end_cursor, None);

    let captured = handle.join().expect("server thread should join");
    let request = captured[0].json();
    assert_eq!(request["variables"]["after"], json!("C9"));
    assert_eq!(
        request["variables"]["filter"],
        json!({ "name": { "ilike": "%यज्ञ%" } })
    );
    Ok(())
}

#[test]
fn graphql_errors_surface_first_message() -> Result<()> {
    let body = json!({
        "data": null,
        "errors": [{ "message": "permission denied for view member_not_in_family" }]
    });
    let (addr, handle) = serve(vec![(200, body.to_string())])?;

    let repo = EkalAryaRepository::new(client(&addr)?);
    let error = repo.list_page(30, None).expect_err("graphql error expected");
    assert_eq!(
        error,
        AppError::GraphQl("permission denied for view member_not_in_family".to_owned())
    );
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_failure_maps_to_server_error() -> Result<()> {
    let (addr, handle) = serve(vec![(503, r#"{"message":"upstream down"}"#.to_owned())])?;

    let repo = EkalAryaRepository::new(client(&addr)?);
    let error = repo.list_page(30, None).expect_err("server error expected");
    assert_eq!(error, AppError::Network(NetworkError::Server { code: 503 }));
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_backend_is_a_connection_error() -> Result<()> {
    let repo = EkalAryaRepository::new(Client::new(
        "http://127.0.0.1:1",
        "anon-key",
        Duration::from_millis(200),
    )?);
    let error = repo.list_page(30, None).expect_err("connection error expected");
    assert!(error.is_network(), "unexpected error {error:?}");
    Ok(())
}

#[test]
fn member_update_sends_only_touched_fields() -> Result<()> {
    let body = json!({ "data": { "updateMemberCollection": { "affectedCount": 1 } } });
    let (addr, handle) = serve(vec![(200, body.to_string())])?;

    let update = MemberUpdate {
        occupation: FieldUpdate::SetTo("अध्यापक".to_owned()),
        email: FieldUpdate::Clear,
        ..MemberUpdate::default()
    };
    client(&addr)?.update_member(&MemberId::new("m-1"), &update)?;

    let captured = handle.join().expect("server thread should join");
    let request = captured[0].json();
    assert_eq!(request["variables"]["id"], json!("m-1"));
    assert_eq!(
        request["variables"]["set"],
        json!({ "occupation": "अध्यापक", "email": null })
    );
    Ok(())
}

#[test]
fn empty_member_update_makes_no_request() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", "anon-key", Duration::from_millis(200))?;
    client.update_member(&MemberId::new("m-1"), &MemberUpdate::default())?;
    Ok(())
}

fn new_member() -> MemberFormInput {
    MemberFormInput {
        name: " राम शर्मा ".to_owned(),
        phone_number: "9876543210".to_owned(),
        email: String::new(),
        dob: Some(date!(1990 - 04 - 12)),
        gender: Some(Gender::Male),
        educational_qualification: String::new(),
        occupation: "अध्यापक".to_owned(),
        introduction: String::new(),
        arya_samaj_id: None,
        address: AddressInput {
            basic_address: "12, मुख्य मार्ग".to_owned(),
            state: "हरियाणा".to_owned(),
            district: "रोहतक".to_owned(),
            pincode: "124001".to_owned(),
            ..AddressInput::default()
        },
    }
}

fn inserted(field: &str, id: &str) -> String {
    json!({ "data": { field: { "records": [{ "id": id }] } } }).to_string()
}

#[test]
fn create_address_returns_inserted_id() -> Result<()> {
    let (addr, handle) = serve(vec![(200, inserted("insertIntoAddressCollection", "a-1"))])?;

    let id = client(&addr)?.create_address(&new_member().address)?;
    assert_eq!(id.as_str(), "a-1");

    let captured = handle.join().expect("server thread should join");
    let request = captured[0].json();
    assert_eq!(request["variables"]["input"]["district"], json!("रोहतक"));
    assert_eq!(request["variables"]["input"]["vidhansabha"], Value::Null);
    Ok(())
}

#[test]
fn create_member_links_new_address() -> Result<()> {
    let (addr, handle) = serve(vec![
        (200, inserted("insertIntoAddressCollection", "a-1")),
        (200, inserted("insertIntoMemberCollection", "m-9")),
    ])?;

    let id = client(&addr)?.create_member(&new_member())?;
    assert_eq!(id, MemberId::new("m-9"));

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured.len(), 2);
    assert!(captured[0].body.contains("insertIntoAddressCollection"));
    let member = &captured[1].json()["variables"]["input"];
    assert_eq!(member["name"], json!("राम शर्मा"));
    assert_eq!(member["addressId"], json!("a-1"));
    assert_eq!(member["gender"], json!("MALE"));
    assert_eq!(member["dob"], json!("1990-04-12"));
    assert_eq!(member["email"], Value::Null);
    Ok(())
}

#[test]
fn failed_member_insert_removes_its_address() -> Result<()> {
    let rejected = json!({
        "data": null,
        "errors": [{ "message": "duplicate key value violates unique constraint" }]
    });
    let deleted = json!({ "data": { "deleteFromAddressCollection": { "affectedCount": 1 } } });
    let (addr, handle) = serve(vec![
        (200, inserted("insertIntoAddressCollection", "a-1")),
        (200, rejected.to_string()),
        (200, deleted.to_string()),
    ])?;

    let error = client(&addr)?
        .create_member(&new_member())
        .expect_err("member insert should fail");
    assert_eq!(
        error,
        AppError::GraphQl("duplicate key value violates unique constraint".to_owned())
    );

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured.len(), 3);
    assert!(captured[2].body.contains("deleteFromAddressCollection"));
    assert_eq!(captured[2].json()["variables"]["id"], json!("a-1"));
    Ok(())
}

#[test]
fn invalid_member_is_rejected_before_any_request() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", "anon-key", Duration::from_millis(200))?;
    let member = MemberFormInput {
        name: "  ".to_owned(),
        ..new_member()
    };
    let error = client.create_member(&member).expect_err("blank name should fail");
    assert!(matches!(error, AppError::Validation(_)), "unexpected error {error:?}");
    Ok(())
}

#[test]
fn delete_record_targets_screen_table() -> Result<()> {
    let deleted = json!({ "data": { "deleteFromActivitiesCollection": { "affectedCount": 1 } } });
    let missing = json!({ "data": { "deleteFromFamilyCollection": { "affectedCount": 0 } } });
    let (addr, handle) = serve(vec![(200, deleted.to_string()), (200, missing.to_string())])?;

    let client = client(&addr)?;
    client.delete_record(ScreenKey::Activities, "act-1")?;
    let error = client
        .delete_record(ScreenKey::AryaPariwar, "f-404")
        .expect_err("nothing deleted should fail");
    assert!(
        matches!(error, AppError::Network(NetworkError::Http { code: 404, .. })),
        "unexpected error {error:?}"
    );

    let captured = handle.join().expect("server thread should join");
    assert!(captured[0].body.contains("deleteFromActivitiesCollection"));
    assert_eq!(captured[0].json()["variables"]["id"], json!("act-1"));
    assert!(captured[1].body.contains("deleteFromFamilyCollection"));
    Ok(())
}

#[test]
fn upload_returns_public_url() -> Result<()> {
    let (addr, handle) = serve(vec![(200, r#"{"Key":"profile_image/m-1.webp"}"#.to_owned())])?;

    let url = client(&addr)?.upload("profile_image", "m-1.webp", "image/webp", vec![1, 2, 3])?;
    assert_eq!(
        url,
        format!("{addr}/storage/v1/object/public/profile_image/m-1.webp")
    );

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].url, "/storage/v1/object/profile_image/m-1.webp");
    Ok(())
}

#[test]
fn geocoder_falls_back_to_english() -> Result<()> {
    let hindi = json!({ "address": {} });
    let english = json!({
        "address": {
            "road": "Station Road",
            "town": "Rohtak",
            "state": "Haryana",
            "state_district": "Rohtak District",
            "postcode": "124001"
        }
    });
    let (addr, handle) = serve(vec![
        (200, hindi.to_string()),
        (200, english.to_string()),
    ])?;

    let geocoder = Geocoder::new(&addr, "AryaMahasangh/1.0", Duration::from_secs(2))?;
    let reverse = geocoder.reverse(28.89, 76.6)?;
    assert_eq!(reverse.address, "Station Road, Rohtak");
    assert_eq!(reverse.state, "हरियाणा");
    assert_eq!(reverse.district, "Rohtak");
    assert_eq!(reverse.pincode, "124001");

    let captured = handle.join().expect("server thread should join");
    assert!(captured[0].url.contains("accept-language=hi"));
    assert!(captured[1].url.contains("accept-language=en"));
    assert!(captured[1].url.starts_with("/reverse?lat=28.89&lon=76.6"));
    assert_eq!(captured[0].user_agent.as_deref(), Some("AryaMahasangh/1.0"));
    Ok(())
}

#[test]
fn geocoder_stops_when_rate_limited() -> Result<()> {
    let (addr, handle) = serve(vec![(429, "Too Many Requests".to_owned())])?;

    let geocoder = Geocoder::new(&addr, "AryaMahasangh/1.0", Duration::from_secs(2))?;
    let error = geocoder.reverse(28.89, 76.6).expect_err("rate limit expected");
    assert_eq!(
        error,
        AppError::Network(NetworkError::Http {
            code: 429,
            message: "Too Many Requests".to_owned(),
        })
    );
    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured.len(), 1);
    Ok(())
}
