//! Request DTOs
//!
//! Data structures for API request bodies and query strings.
//!
//! PATCH bodies follow one convention: an absent field is left alone, an
//! empty string clears an optional text field, and `null` clears an
//! optional non-text field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::{
    BannerVariant, ListQuery, MediaKind, ReleaseType, TrackCredit, TrackMetadata, UserRole,
};
use crate::shared::serde_ids;
use crate::shared::validation::url_or_empty;

/// Longest accepted track, 24 hours.
pub const MAX_DURATION_MS: i32 = 86_400_000;

/// Deserialize a present field (including `null`) as `Some(..)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Lowercase letters, digits, `_`, `.` and `-`.
fn validate_username(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'.' | b'-'));
    if ok {
        Ok(())
    } else {
        Err(error(
            "username",
            "Username may only contain lowercase letters, digits, '_', '.' and '-'",
        ))
    }
}

/// `CC XXX YY NNNNN`: country, registrant, year, designation.
pub fn validate_isrc(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let bytes = value.as_bytes();
    let ok = bytes.len() == 12
        && bytes[..2].iter().all(u8::is_ascii_alphabetic)
        && bytes[2..5].iter().all(u8::is_ascii_alphanumeric)
        && bytes[5..].iter().all(u8::is_ascii_digit);
    if ok {
        Ok(())
    } else {
        Err(error("isrc", "ISRC must look like CCXXXYYNNNNN"))
    }
}

/// Officially assigned ISO-3166-1 alpha-2 codes.
const ISO_COUNTRY_CODES: &str = "\
    AD AE AF AG AI AL AM AO AQ AR AS AT AU AW AX AZ BA BB BD BE BF BG BH BI BJ BL BM BN BO \
    BQ BR BS BT BV BW BY BZ CA CC CD CF CG CH CI CK CL CM CN CO CR CU CV CW CX CY CZ DE DJ \
    DK DM DO DZ EC EE EG EH ER ES ET FI FJ FK FM FO FR GA GB GD GE GF GG GH GI GL GM GN GP \
    GQ GR GS GT GU GW GY HK HM HN HR HT HU ID IE IL IM IN IO IQ IR IS IT JE JM JO JP KE KG \
    KH KI KM KN KP KR KW KY KZ LA LB LC LI LK LR LS LT LU LV LY MA MC MD ME MF MG MH MK ML \
    MM MN MO MP MQ MR MS MT MU MV MW MX MY MZ NA NC NE NF NG NI NL NO NP NR NU NZ OM PA PE \
    PF PG PH PK PL PM PN PR PS PT PW PY QA RE RO RS RU RW SA SB SC SD SE SG SH SI SJ SK SL \
    SM SN SO SR SS ST SV SX SY SZ TC TD TF TG TH TJ TK TL TM TN TO TR TT TV TW TZ UA UG UM \
    US UY UZ VA VC VE VG VI VN VU WF WS YE YT ZA ZM ZW";

/// ISO-3166 alpha-2 code, or empty to clear. Input is uppercased on the way in.
fn validate_country(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || ISO_COUNTRY_CODES.split_whitespace().any(|code| code == value) {
        Ok(())
    } else {
        Err(error("country", "Country must be a two-letter ISO code"))
    }
}

/// Required text with surrounding whitespace removed, so length rules see
/// what gets stored.
fn trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

fn trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|v| v.map(|s| s.trim().to_string()))
}

fn country_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|v| v.map(|s| s.trim().to_ascii_uppercase()))
}

// =============================================================================
// Auth & profile
// =============================================================================

/// Login request. `identifier` is an email address or a username.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    #[validate(length(min = 1, max = 255, message = "Email or username is required"))]
    pub identifier: String,

    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
}

/// Update own profile
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 2, max = 32, message = "Username must be 2-32 characters"),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    #[validate(custom(function = "url_or_empty"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

/// Admin: create an account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 2, max = 32, message = "Username must be 2-32 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,

    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// `?search=&limit=&offset=`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        ListQuery::new(params.search, params.limit, params.offset)
    }
}

// =============================================================================
// Artists & groups
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArtistRequest {
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub slug: Option<String>,

    #[validate(length(max = 5000, message = "Bio must be at most 5000 characters"))]
    pub bio: Option<String>,

    #[serde(default, deserialize_with = "country_code")]
    #[validate(custom(function = "validate_country"))]
    pub country: Option<String>,

    #[validate(custom(function = "url_or_empty"))]
    pub website_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateArtistRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub slug: Option<String>,

    #[validate(length(max = 5000, message = "Bio must be at most 5000 characters"))]
    pub bio: Option<String>,

    #[serde(default, deserialize_with = "country_code")]
    #[validate(custom(function = "validate_country"))]
    pub country: Option<String>,

    #[validate(custom(function = "url_or_empty"))]
    pub website_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub slug: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 1900, max = 2100, message = "Formed year must be 1900-2100"))]
    pub formed_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub slug: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(range(min = 1900, max = 2100, message = "Formed year must be 1900-2100"))]
    pub formed_year: Option<Option<i32>>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct GroupMemberInput {
    #[serde(deserialize_with = "serde_ids::id")]
    pub artist_id: i64,

    #[validate(length(max = 100, message = "Role must be at most 100 characters"))]
    pub role: Option<String>,
}

/// Replace a group's members; order becomes position.
#[derive(Debug, Deserialize, Validate)]
pub struct SetGroupMembersRequest {
    #[validate(length(max = 200, message = "At most 200 members"), nested)]
    pub members: Vec<GroupMemberInput>,
}

// =============================================================================
// Tracks
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrackRequest {
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,

    pub slug: Option<String>,

    #[validate(range(min = 1, max = 86_400_000, message = "Duration must be 1 ms to 24 h"))]
    pub duration_ms: Option<i32>,

    #[validate(custom(function = "validate_isrc"))]
    pub isrc: Option<String>,

    #[serde(default)]
    pub explicit: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTrackRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: Option<String>,

    pub slug: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(range(min = 1, max = 86_400_000, message = "Duration must be 1 ms to 24 h"))]
    pub duration_ms: Option<Option<i32>>,

    #[validate(custom(function = "validate_isrc"))]
    pub isrc: Option<String>,

    pub explicit: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TrackArtistInput {
    #[serde(deserialize_with = "serde_ids::id")]
    pub artist_id: i64,

    #[serde(default)]
    pub credit: TrackCredit,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetTrackArtistsRequest {
    #[validate(length(max = 50, message = "At most 50 credited artists"))]
    pub artists: Vec<TrackArtistInput>,
}

/// Register an uploaded audio object against a track.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterAudioRequest {
    #[validate(length(min = 1, max = 1024, message = "Key is required"))]
    pub key: String,

    #[validate(length(min = 1, max = 255, message = "Content type is required"))]
    pub content_type: String,

    #[validate(range(min = 1, message = "Size must be positive"))]
    pub size: i64,

    #[validate(length(equal = 64, message = "Content hash must be 64 hex characters"))]
    pub content_hash: String,
}

// =============================================================================
// Releases
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReleaseRequest {
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,

    pub slug: Option<String>,

    #[serde(default)]
    pub release_type: ReleaseType,

    pub release_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Label must be at most 200 characters"))]
    pub label: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReleaseRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: Option<String>,

    pub slug: Option<String>,

    pub release_type: Option<ReleaseType>,

    #[serde(default, deserialize_with = "nullable")]
    pub release_date: Option<Option<NaiveDate>>,

    #[validate(length(max = 200, message = "Label must be at most 200 characters"))]
    pub label: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub published: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReleaseTrackInput {
    #[serde(deserialize_with = "serde_ids::id")]
    pub track_id: i64,

    #[validate(range(min = 1, max = 99, message = "Disc number must be 1-99"))]
    pub disc_number: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetReleaseTracksRequest {
    #[validate(length(max = 500, message = "At most 500 tracks"), nested)]
    pub tracks: Vec<ReleaseTrackInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetReleaseArtistsRequest {
    #[serde(deserialize_with = "serde_ids::ids")]
    #[validate(length(max = 50, message = "At most 50 credited artists"))]
    pub artist_ids: Vec<i64>,
}

// =============================================================================
// Banners
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBannerRequest {
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message: String,

    #[serde(default)]
    pub variant: BannerVariant,

    #[validate(custom(function = "url_or_empty"))]
    pub link_url: Option<String>,

    #[validate(length(max = 100, message = "Link label must be at most 100 characters"))]
    pub link_label: Option<String>,

    pub is_active: Option<bool>,

    pub starts_at: Option<DateTime<Utc>>,

    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBannerRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message: Option<String>,

    pub variant: Option<BannerVariant>,

    #[validate(custom(function = "url_or_empty"))]
    pub link_url: Option<String>,

    #[validate(length(max = 100, message = "Link label must be at most 100 characters"))]
    pub link_label: Option<String>,

    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "nullable")]
    pub starts_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "nullable")]
    pub ends_at: Option<Option<DateTime<Utc>>>,
}

// =============================================================================
// Media
// =============================================================================

/// Ask for a presigned upload URL.
#[derive(Debug, Deserialize, Validate)]
pub struct PresignUploadRequest {
    pub kind: MediaKind,

    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,

    #[validate(length(min = 1, max = 255, message = "Content type is required"))]
    pub content_type: String,

    pub size: i64,
}

/// Register an uploaded image against its owner.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterImageRequest {
    #[validate(length(min = 1, max = 1024, message = "Key is required"))]
    pub key: String,

    #[validate(length(min = 1, max = 255, message = "Content type is required"))]
    pub content_type: String,

    pub size: i64,

    #[validate(range(min = 1, max = 20000, message = "Width must be 1-20000"))]
    pub width: Option<i32>,

    #[validate(range(min = 1, max = 20000, message = "Height must be 1-20000"))]
    pub height: Option<i32>,

    #[validate(length(max = 500, message = "Alt text must be at most 500 characters"))]
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderImagesRequest {
    #[serde(deserialize_with = "serde_ids::ids")]
    pub image_ids: Vec<i64>,
}

/// One file of a bulk track upload, as seen by the browser.
///
/// Per-file problems (bad MIME type, malformed hash) are reported in the
/// analysis instead of failing the whole request.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BulkFileInput {
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,

    pub content_type: String,

    pub size: i64,

    pub content_hash: String,

    /// Tags the browser read from the file itself
    #[serde(default)]
    pub tags: Option<TrackMetadata>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkAnalyzeRequest {
    #[validate(length(min = 1, message = "At least one file is required"), nested)]
    pub files: Vec<BulkFileInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BulkCommitItem {
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,

    pub content_type: String,

    pub size: i64,

    pub content_hash: String,

    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,

    #[serde(default, deserialize_with = "serde_ids::ids")]
    pub artist_ids: Vec<i64>,

    #[validate(range(min = 1, max = 86_400_000, message = "Duration must be 1 ms to 24 h"))]
    pub duration_ms: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkCommitRequest {
    #[validate(length(min = 1, message = "At least one file is required"), nested)]
    pub files: Vec<BulkCommitItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("USRC17607839", true)]
    #[test_case("usrc17607839", true)]
    #[test_case("GB-AAA-12-34567", false)]
    #[test_case("USRC1760783", false)]
    #[test_case("1SRC17607839", false)]
    #[test_case("", true)]
    fn test_isrc(value: &str, valid: bool) {
        assert_eq!(validate_isrc(value).is_ok(), valid);
    }

    #[test]
    fn test_login_accepts_email_alias() {
        let req: LoginRequest =
            serde_json::from_value(json!({"email": "a@b.c", "password": "x"})).unwrap();
        assert_eq!(req.identifier, "a@b.c");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_profile_username_rules() {
        let req = UpdateProfileRequest {
            username: Some("Bad Name".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateProfileRequest {
            username: Some("good.name_1".into()),
            avatar_url: Some("".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_artist_validation() {
        let ok: CreateArtistRequest = serde_json::from_value(json!({
            "name": "Daft Punk", "country": "FR", "website_url": "https://daftpunk.com"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: CreateArtistRequest = serde_json::from_value(json!({
            "name": "", "country": "France", "website_url": "daftpunk.com"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("country"));
        assert!(fields.contains_key("website_url"));
    }

    #[test_case("fr", Some("FR"), true ; "lowercase is uppercased")]
    #[test_case(" GB ", Some("GB"), true ; "padded")]
    #[test_case("", Some(""), true ; "empty clears")]
    #[test_case("ZZ", Some("ZZ"), false ; "unassigned code")]
    #[test_case("EU", Some("EU"), false ; "reserved code")]
    fn test_country_codes(input: &str, stored: Option<&str>, valid: bool) {
        let req: UpdateArtistRequest =
            serde_json::from_value(json!({ "country": input })).unwrap();
        assert_eq!(req.country.as_deref(), stored);
        assert_eq!(req.validate().is_ok(), valid);
    }

    #[test]
    fn test_blank_text_is_rejected_after_trimming() {
        let banner: CreateBannerRequest =
            serde_json::from_value(json!({ "message": "   " })).unwrap();
        assert_eq!(banner.message, "");
        assert!(banner.validate().unwrap_err().field_errors().contains_key("message"));

        let update: UpdateBannerRequest =
            serde_json::from_value(json!({ "message": "\t\n" })).unwrap();
        assert!(update.validate().is_err());

        let artist: CreateArtistRequest =
            serde_json::from_value(json!({ "name": "  Daft Punk  " })).unwrap();
        assert_eq!(artist.name, "Daft Punk");
        assert!(artist.validate().is_ok());

        let track: UpdateTrackRequest = serde_json::from_value(json!({ "title": " " })).unwrap();
        assert!(track.validate().is_err());

        let absent: UpdateTrackRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.title, None);
    }

    #[test]
    fn test_nullable_distinguishes_absent_and_null() {
        let absent: UpdateGroupRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.formed_year, None);

        let null: UpdateGroupRequest = serde_json::from_value(json!({"formed_year": null})).unwrap();
        assert_eq!(null.formed_year, Some(None));

        let set: UpdateGroupRequest = serde_json::from_value(json!({"formed_year": 1999})).unwrap();
        assert_eq!(set.formed_year, Some(Some(1999)));
    }

    #[test]
    fn test_formed_year_range() {
        let req = CreateGroupRequest {
            name: "X".into(),
            slug: None,
            description: None,
            formed_year: Some(1850),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_track_duration_range() {
        let req: CreateTrackRequest =
            serde_json::from_value(json!({"title": "T", "duration_ms": 0})).unwrap();
        assert!(req.validate().is_err());

        let req: CreateTrackRequest =
            serde_json::from_value(json!({"title": "T", "duration_ms": MAX_DURATION_MS})).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_member_ids_accept_strings() {
        let req: SetGroupMembersRequest = serde_json::from_value(json!({
            "members": [{"artist_id": "123"}, {"artist_id": 456, "role": "drums"}]
        }))
        .unwrap();
        assert_eq!(req.members[0].artist_id, 123);
        assert_eq!(req.members[1].role.as_deref(), Some("drums"));
    }

    #[test]
    fn test_release_type_defaults_to_album() {
        let req: CreateReleaseRequest =
            serde_json::from_value(json!({"title": "Discovery", "release_date": "2001-03-12"}))
                .unwrap();
        assert_eq!(req.release_type, ReleaseType::Album);
        assert!(req.release_date.is_some());
    }

    #[test]
    fn test_register_audio_hash_length() {
        let req: RegisterAudioRequest = serde_json::from_value(json!({
            "key": "audio/x.mp3", "content_type": "audio/mpeg", "size": 10, "content_hash": "abc"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bulk_analyze_requires_files() {
        let req: BulkAnalyzeRequest = serde_json::from_value(json!({"files": []})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_params_into_query() {
        let query: ListQuery = ListParams {
            search: Some(" abc ".into()),
            limit: Some(500),
            offset: None,
        }
        .into();
        assert_eq!(query.search.as_deref(), Some("abc"));
        assert_eq!(query.limit, 100);
    }
}
