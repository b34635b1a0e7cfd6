//! Property-based tests for main image staging
//!
//! Tests invariants:
//! - Image files of at most 5 MiB are staged with a preview
//! - Anything larger is rejected with `TooLarge`
//! - A rejection never replaces the current selection
//! - Non-image MIME types are rejected regardless of size

use proptest::prelude::*;

use crate::core::campaign::wizard::{ImageFile, MediaError, MediaStaging, MAX_IMAGE_BYTES};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_image_mime() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("image/jpeg".to_string()),
        Just("image/png".to_string()),
        Just("image/gif".to_string()),
        Just("image/webp".to_string()),
    ]
}

fn arb_other_mime() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("application/pdf".to_string()),
        Just("application/octet-stream".to_string()),
        Just("text/plain".to_string()),
        Just("video/mp4".to_string()),
        Just(String::new()),
    ]
}

/// Sizes clustered around the limit, where off-by-one mistakes live.
fn arb_size_near_limit() -> impl Strategy<Value = u64> {
    let max = MAX_IMAGE_BYTES;
    prop_oneof![
        (max - 4096)..=max,
        (max + 1)..=(max + 4096),
        Just(max),
        Just(max + 1),
    ]
}

fn file(mime: &str, size: u64) -> ImageFile {
    ImageFile::new("upload.bin", mime, vec![0u8; size as usize])
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: Acceptance is exactly `size <= MAX_IMAGE_BYTES`
    #[test]
    fn prop_size_boundary(
        mime in arb_image_mime(),
        size in arb_size_near_limit()
    ) {
        let mut staging = MediaStaging::new();
        let result = staging.select_file(file(&mime, size));

        if size <= MAX_IMAGE_BYTES {
            prop_assert!(result.is_ok());
            prop_assert!(staging.staged().is_some());
            let expected_prefix = format!("data:{};base64,", mime);
            prop_assert!(staging.preview_uri().unwrap().starts_with(&expected_prefix));
        } else {
            prop_assert_eq!(
                result,
                Err(MediaError::TooLarge { size, max: MAX_IMAGE_BYTES })
            );
            prop_assert!(staging.staged().is_none());
        }
    }

    /// Property: A rejected file never displaces the staged one
    #[test]
    fn prop_rejection_keeps_selection(
        mime in arb_image_mime(),
        extra in 1u64..=4096
    ) {
        let mut staging = MediaStaging::new();
        staging.select_file(file(&mime, 16)).unwrap();

        let too_big = file(&mime, MAX_IMAGE_BYTES + extra);
        prop_assert!(staging.select_file(too_big).is_err());
        prop_assert_eq!(staging.staged().unwrap().file.size(), 16);
        prop_assert!(staging.error().is_some());
    }

    /// Property: Non-image types are rejected at any size
    #[test]
    fn prop_non_image_rejected(
        mime in arb_other_mime(),
        size in 0u64..=2048
    ) {
        let mut staging = MediaStaging::new();
        let result = staging.select_file(file(&mime, size));

        let is_not_an_image = matches!(result, Err(MediaError::NotAnImage { .. }));
        prop_assert!(is_not_an_image);
        prop_assert!(staging.staged().is_none());
    }
}
