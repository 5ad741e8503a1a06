use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

/// Path segment under which generated (screen quality) images are stored
pub const GENERATED_PREFIX: &str = "generated/";

/// Path segment under which print-ready images are stored
pub const PRINT_PREFIX: &str = "print/";

const PUBLIC_OBJECT_PATH: &str = "/storage/v1/object/public";

// Characters escaped in object keys; `/` separates key segments and stays
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Maps object keys to and from public Supabase storage URLs.
///
/// `https://xxx.supabase.co/storage/v1/object/public/recipes/generated/g1/file.png`
/// has the object key `generated/g1/file.png` in bucket `recipes`.
#[derive(Debug, Clone)]
pub struct PublicUrlLayout {
    base_url: String,
    bucket: String,
}

impl PublicUrlLayout {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url,
            PUBLIC_OBJECT_PATH,
            self.bucket,
            utf8_percent_encode(key, KEY_ENCODE_SET)
        )
    }

    /// Extract the object key from a public URL of this bucket.
    ///
    /// Only the path is matched, so URLs served through another host
    /// (custom domain, CDN) still resolve. The key is percent-decoded.
    pub fn object_key(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let prefix = format!("{}/{}/", PUBLIC_OBJECT_PATH, self.bucket);
        let encoded = url.path().strip_prefix(&prefix)?;
        let key = percent_decode_str(encoded).decode_utf8().ok()?;
        if key.is_empty() {
            None
        } else {
            Some(key.into_owned())
        }
    }
}

/// Map a generated image key to its print key.
///
/// Only the first `generated/` path segment is replaced:
/// `generated/g1/generated/x.png` becomes `print/g1/generated/x.png`.
/// Returns `None` when the key has no `generated/` segment, so a print
/// asset can never overwrite its source.
pub fn to_print_path(key: &str) -> Option<String> {
    key.match_indices(GENERATED_PREFIX)
        .map(|(idx, _)| idx)
        .find(|&idx| idx == 0 || key.as_bytes()[idx - 1] == b'/')
        .map(|idx| {
            format!(
                "{}{}{}",
                &key[..idx],
                PRINT_PREFIX,
                &key[idx + GENERATED_PREFIX.len()..]
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PublicUrlLayout {
        PublicUrlLayout::new("https://project.supabase.co/", "recipes")
    }

    #[test]
    fn test_print_path_replaces_leading_prefix() {
        assert_eq!(
            to_print_path("generated/g1/file.png").as_deref(),
            Some("print/g1/file.png")
        );
    }

    #[test]
    fn test_print_path_replaces_first_occurrence_only() {
        assert_eq!(
            to_print_path("generated/g1/generated/x.png").as_deref(),
            Some("print/g1/generated/x.png")
        );
    }

    #[test]
    fn test_print_path_nested_segment() {
        assert_eq!(
            to_print_path("tenant/generated/x.png").as_deref(),
            Some("tenant/print/x.png")
        );
    }

    #[test]
    fn test_print_path_ignores_partial_segment() {
        assert_eq!(
            to_print_path("regenerated/generated/x.png").as_deref(),
            Some("regenerated/print/x.png")
        );
        assert_eq!(to_print_path("regenerated/x.png"), None);
        assert_eq!(to_print_path("uploads/x.png"), None);
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            layout().public_url("print/g1/file.png"),
            "https://project.supabase.co/storage/v1/object/public/recipes/print/g1/file.png"
        );
    }

    #[test]
    fn test_object_key_from_public_url() {
        let url = "https://project.supabase.co/storage/v1/object/public/recipes/generated/g1/file.png";
        assert_eq!(
            layout().object_key(url).as_deref(),
            Some("generated/g1/file.png")
        );
    }

    #[test]
    fn test_object_key_strips_query() {
        let url = "https://cdn.example.com/storage/v1/object/public/recipes/generated/a.png?t=123";
        assert_eq!(layout().object_key(url).as_deref(), Some("generated/a.png"));
    }

    #[test]
    fn test_object_key_rejects_other_buckets() {
        let url = "https://project.supabase.co/storage/v1/object/public/avatars/generated/a.png";
        assert_eq!(layout().object_key(url), None);
        assert_eq!(layout().object_key("https://replicate.delivery/out.png"), None);
    }

    #[test]
    fn test_object_key_is_percent_decoded() {
        let url = "https://project.supabase.co/storage/v1/object/public/recipes/generated/g1/caf%C3%A9%20soup.png";
        assert_eq!(
            layout().object_key(url).as_deref(),
            Some("generated/g1/café soup.png")
        );
    }

    #[test]
    fn test_object_key_ignores_marker_in_query() {
        let url = "https://replicate.delivery/out.png?from=/storage/v1/object/public/recipes/generated/a.png";
        assert_eq!(layout().object_key(url), None);
        assert_eq!(layout().object_key("not a url"), None);
    }

    #[test]
    fn test_public_url_encodes_key() {
        assert_eq!(
            layout().public_url("print/g1/my soup#2.png"),
            "https://project.supabase.co/storage/v1/object/public/recipes/print/g1/my%20soup%232.png"
        );
    }

    #[test]
    fn test_round_trip_encoded_key() {
        let layout = layout();
        let key = "print/g1/café soup?.png";
        assert_eq!(layout.object_key(&layout.public_url(key)).as_deref(), Some(key));
    }

    #[test]
    fn test_round_trip_key() {
        let layout = layout();
        let key = "print/g1/file.png";
        assert_eq!(layout.object_key(&layout.public_url(key)).as_deref(), Some(key));
    }
}
