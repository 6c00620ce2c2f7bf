//! Shared helpers for integration tests
//!
//! `FakePetFriends` is a stateful stand-in for the PetFriends service served
//! by wiremock. It reproduces the behavior the built-in suite pins down,
//! defects included: no validation of names or ages, PNG and GIF uploads
//! rejected, and any user may delete any pet.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use petfriends::common::config::Credentials;
use serde_json::{json, Value};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const EMAIL: &str = "owner@example.com";
pub const PASSWORD: &str = "correct-horse-battery";
pub const KEY: &str = "ea738148a1f19838e1c5d1413877f3691a3731380e733e877b0ae729";
pub const OWNER: &str = "owner";

/// Credentials matching the fake service's single registered user
pub fn credentials() -> Credentials {
    Credentials {
        valid_email: EMAIL.to_string(),
        valid_password: PASSWORD.to_string(),
        invalid_email: "ghost@example.com".to_string(),
        invalid_password: "wrong".to_string(),
    }
}

/// Write the photo fixtures the built-in suite refers to
pub fn write_fixtures(dir: &Path) {
    let files: [(&str, &[u8]); 6] = [
        ("cat1.jpg", b"\xff\xd8\xff\xe0 first cat"),
        ("cat2.jpg", b"\xff\xd8\xff\xe0 second cat, a different one"),
        ("file_7Mb_JPG.jpg", b"\xff\xd8\xff\xe0 stands in for a very large photo"),
        ("dogBIG_JPEG.jpeg", b"\xff\xd8\xff\xe0 big dog"),
        ("tiger_001_PNG.png", b"\x89PNG\r\n\x1a\n tiger"),
        ("dogGIF.gif", b"GIF89a dog"),
    ];
    for (name, bytes) in files {
        std::fs::write(dir.join(name), bytes).expect("Failed to write fixture");
    }
}

#[derive(Debug, Clone)]
pub struct StoredPet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub owner: String,
}

impl StoredPet {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "animal_type": self.animal_type,
            "age": self.age,
            "pet_photo": self.pet_photo,
            "user_id": self.owner,
        })
    }
}

#[derive(Default)]
struct State {
    pets: Vec<StoredPet>,
    next_id: u64,
}

impl State {
    fn insert(
        &mut self,
        name: &str,
        animal_type: &str,
        age: &str,
        photo: &str,
        owner: &str,
    ) -> StoredPet {
        self.next_id += 1;
        let pet = StoredPet {
            id: format!("pet-{:04}", self.next_id),
            name: name.to_string(),
            animal_type: animal_type.to_string(),
            age: age.to_string(),
            pet_photo: photo.to_string(),
            owner: owner.to_string(),
        };
        self.pets.push(pet.clone());
        pet
    }
}

/// Stateful fake of the PetFriends API
#[derive(Clone)]
pub struct FakePetFriends {
    state: Arc<Mutex<State>>,
}

impl FakePetFriends {
    /// Twelve pets of other users followed by two of the registered user
    pub fn new() -> Self {
        let mut state = State::default();
        for i in 0..12 {
            let name = format!("Чужой {}", i);
            state.insert(&name, "дворняга", &i.to_string(), "", "someone-else");
        }
        state.insert("Первый", "кот", "2", "", OWNER);
        state.insert("Второй", "пёс", "7", "", OWNER);

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Start a mock server answering every request from this fake
    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(self.clone())
            .mount(&server)
            .await;
        server
    }

    pub fn pets(&self) -> Vec<StoredPet> {
        self.state.lock().unwrap().pets.clone()
    }

    pub fn own_pets(&self) -> Vec<StoredPet> {
        self.pets().into_iter().filter(|p| p.owner == OWNER).collect()
    }

    pub fn clear_own_pets(&self) {
        self.state.lock().unwrap().pets.retain(|p| p.owner != OWNER);
    }

    fn handle(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().trim_start_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').collect();
        let method = request.method.as_str();

        if (method, segments.as_slice()) == ("GET", ["api", "key"].as_slice()) {
            return if header(request, "email") == Some(EMAIL)
                && header(request, "password") == Some(PASSWORD)
            {
                ResponseTemplate::new(200).set_body_json(json!({ "key": KEY }))
            } else {
                forbidden()
            };
        }

        if header(request, "auth_key") != Some(KEY) {
            return forbidden();
        }

        let mut state = self.state.lock().unwrap();

        match (method, segments.as_slice()) {
            ("GET", ["api", "pets"]) => {
                let mine = request
                    .url
                    .query_pairs()
                    .any(|(k, v)| k == "filter" && v == "my_pets");
                let pets: Vec<Value> = state
                    .pets
                    .iter()
                    .filter(|p| !mine || p.owner == OWNER)
                    .map(StoredPet::to_json)
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({ "pets": pets }))
            }

            ("POST", ["api", "pets"]) => {
                let parts = multipart(request);
                let Some(photo) = photo_part(&parts) else {
                    return bad_request();
                };
                if !photo.is_jpeg() {
                    return bad_request();
                }
                let pet = state.insert(
                    &text_part(&parts, "name"),
                    &text_part(&parts, "animal_type"),
                    &text_part(&parts, "age"),
                    &photo.reference(),
                    OWNER,
                );
                ResponseTemplate::new(200).set_body_json(pet.to_json())
            }

            ("POST", ["api", "create_pet_simple"]) => {
                let form = form(request);
                let pet = state.insert(
                    &form_value(&form, "name"),
                    &form_value(&form, "animal_type"),
                    &form_value(&form, "age"),
                    "",
                    OWNER,
                );
                ResponseTemplate::new(200).set_body_json(pet.to_json())
            }

            ("POST", ["api", "pets", "set_photo", id]) => {
                let parts = multipart(request);
                let Some(photo) = photo_part(&parts) else {
                    return bad_request();
                };
                let Some(pet) = state
                    .pets
                    .iter_mut()
                    .find(|p| p.id == *id && p.owner == OWNER)
                else {
                    return bad_request();
                };
                // Only JPEG makes it through, whatever the docs say
                if !photo.is_jpeg() {
                    return ResponseTemplate::new(500)
                        .set_body_string("<title>500 Internal Server Error</title>");
                }
                pet.pet_photo = photo.reference();
                ResponseTemplate::new(200).set_body_json(pet.to_json())
            }

            ("PUT", ["api", "pets", id]) => {
                let form = form(request);
                let Some(pet) = state
                    .pets
                    .iter_mut()
                    .find(|p| p.id == *id && p.owner == OWNER)
                else {
                    return bad_request();
                };
                pet.name = form_value(&form, "name");
                pet.animal_type = form_value(&form, "animal_type");
                pet.age = form_value(&form, "age");
                ResponseTemplate::new(200).set_body_json(pet.to_json())
            }

            ("DELETE", ["api", "pets", id]) => {
                // Ownership is never checked
                state.pets.retain(|p| p.id != *id);
                ResponseTemplate::new(200).set_body_string("")
            }

            _ => ResponseTemplate::new(404).set_body_string("Not Found"),
        }
    }
}

impl Respond for FakePetFriends {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.handle(request)
    }
}

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

fn forbidden() -> ResponseTemplate {
    ResponseTemplate::new(403).set_body_string("This user wasn't found in database")
}

fn bad_request() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_string("Bad Request")
}

fn form(request: &Request) -> Vec<(String, String)> {
    url::form_urlencoded::parse(&request.body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn form_value(form: &[(String, String)], name: &str) -> String {
    form.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}

/// One part of a multipart/form-data body
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormPart {
    fn is_jpeg(&self) -> bool {
        self.content_type.as_deref() == Some("image/jpeg")
    }

    /// Stable stand-in for the service's base64 photo reference
    fn reference(&self) -> String {
        let sum: u64 = self.data.iter().map(|b| *b as u64).sum();
        format!(
            "data:{};len={};sum={}",
            self.content_type.as_deref().unwrap_or(""),
            self.data.len(),
            sum
        )
    }
}

/// The `pet_photo` part, only when it was sent as a named file
fn photo_part(parts: &[FormPart]) -> Option<&FormPart> {
    parts
        .iter()
        .find(|p| p.name == "pet_photo")
        .filter(|p| p.file_name.as_deref().is_some_and(|n| !n.is_empty()))
}

fn text_part(parts: &[FormPart], name: &str) -> String {
    parts
        .iter()
        .find(|p| p.name == name)
        .map(|p| String::from_utf8_lossy(&p.data).into_owned())
        .unwrap_or_default()
}

fn multipart(request: &Request) -> Vec<FormPart> {
    match header(request, "content-type") {
        Some(content_type) => parse_multipart(content_type, &request.body),
        None => Vec::new(),
    }
}

/// Minimal multipart/form-data parser, enough for what reqwest sends
pub fn parse_multipart(content_type: &str, body: &[u8]) -> Vec<FormPart> {
    let Some(boundary) = content_type.split("boundary=").nth(1) else {
        return Vec::new();
    };
    let delimiter = format!("--{}", boundary.trim_matches('"'));
    let delimiter = delimiter.as_bytes();

    let mut parts = Vec::new();
    let mut rest = match find(body, delimiter) {
        Some(start) => &body[start + delimiter.len()..],
        None => return parts,
    };

    while let Some(end) = find(rest, delimiter) {
        let chunk = &rest[..end];
        rest = &rest[end + delimiter.len()..];

        let chunk = chunk.strip_prefix(b"\r\n").unwrap_or(chunk);
        let chunk = chunk.strip_suffix(b"\r\n").unwrap_or(chunk);
        let Some(header_end) = find(chunk, b"\r\n\r\n") else {
            continue;
        };

        let headers = String::from_utf8_lossy(&chunk[..header_end]);
        let mut part = FormPart {
            name: String::new(),
            file_name: None,
            content_type: None,
            data: chunk[header_end + 4..].to_vec(),
        };
        for line in headers.lines() {
            let lower = line.to_ascii_lowercase();
            if lower.starts_with("content-disposition:") {
                part.name = quoted_param(line, "; name=\"").unwrap_or_default();
                part.file_name = quoted_param(line, "; filename=\"");
            } else if lower.starts_with("content-type:") {
                part.content_type = line.split_once(':').map(|(_, v)| v.trim().to_string());
            }
        }
        parts.push(part);
    }
    parts
}

fn quoted_param(line: &str, prefix: &str) -> Option<String> {
    let start = line.find(prefix)? + prefix.len();
    let len = line[start..].find('"')?;
    Some(line[start..start + len].to_string())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
