#[derive(Debug, thiserror::Error)]
pub enum PhotoStoreError {
    #[error("photo has no usable file name")]
    InvalidName,
    #[error("photo io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist an uploaded photo and return the stored file name.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, PhotoStoreError>;

    async fn remove(&self, file_name: &str) -> Result<(), PhotoStoreError>;
}

/// Strip directories and anything outside `[A-Za-z0-9._-]` from a client
/// supplied file name.
pub fn sanitize_file_name(original_name: &str) -> Option<String> {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// `<unix-millis>-<nanoid>-<sanitized name>`
pub fn unique_file_name(original_name: &str) -> Result<String, PhotoStoreError> {
    let base = sanitize_file_name(original_name).ok_or(PhotoStoreError::InvalidName)?;
    let millis = chrono::Utc::now().timestamp_millis();
    Ok(format!("{}-{}-{}", millis, nanoid::nanoid!(8), base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", Some("photo.png"))]
    #[case("../../etc/passwd", Some("passwd"))]
    #[case("C:\\Users\\ada\\me 1.jpg", Some("me_1.jpg"))]
    #[case(".hidden", Some("hidden"))]
    #[case("dir/", None)]
    #[case("", None)]
    fn sanitizes_client_file_names(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(sanitize_file_name(input).as_deref(), expected);
    }

    #[test]
    fn unique_names_keep_the_original_suffix() {
        let a = unique_file_name("ada.png").unwrap();
        let b = unique_file_name("ada.png").unwrap();
        assert!(a.ends_with("-ada.png"));
        assert_ne!(a, b);
    }
}
