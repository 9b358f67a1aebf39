// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use arya_app::AppError;
use tracing::info;
use url::Url;

use crate::{Client, clean_error_response, connection_error};

fn object_url(base_url: &str, prefix: &[&str], bucket: &str, path: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(base_url)
        .map_err(|error| AppError::Unknown(format!("invalid base url {base_url:?}: {error}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| AppError::Unknown(format!("base url {base_url:?} cannot hold a path")))?;
        segments.pop_if_empty();
        segments.extend(prefix);
        segments.push(bucket);
        segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
    }
    Ok(url)
}

impl Client {
    /// Public download URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> Result<String, AppError> {
        object_url(
            self.base_url(),
            &["storage", "v1", "object", "public"],
            bucket,
            path,
        )
        .map(String::from)
    }

    /// Upload `bytes` to `bucket/path` (replacing any existing object) and
    /// return its public URL.
    pub fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        if path.trim_matches('/').is_empty() {
            return Err(AppError::Unknown("upload path must not be empty".to_owned()));
        }
        let url = object_url(self.base_url(), &["storage", "v1", "object"], bucket, path)?;
        let size = bytes.len();
        let response = self
            .authorized(self.http.post(url))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .map_err(|error| connection_error(self.base_url(), &error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        info!(bucket, path, size, "uploaded object");
        self.public_url(bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use crate::Client;
    use std::time::Duration;

    #[test]
    fn public_url_escapes_path_segments() {
        let client = Client::new("https://x.supabase.co", "key", Duration::from_secs(1))
            .expect("client");
        assert_eq!(
            client
                .public_url("profile_image", "members/राम 1.webp")
                .expect("public url"),
            "https://x.supabase.co/storage/v1/object/public/profile_image/members/%E0%A4%B0%E0%A4%BE%E0%A4%AE%201.webp"
        );
    }

    #[test]
    fn empty_upload_path_is_rejected() {
        let client = Client::new("https://x.supabase.co", "key", Duration::from_secs(1))
            .expect("client");
        assert!(client.upload("b", "/", "image/webp", vec![1]).is_err());
    }
}
