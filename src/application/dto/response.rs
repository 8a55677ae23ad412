//! Response DTOs
//!
//! Data structures for API response bodies. IDs are serialized as strings
//! and timestamps as RFC 3339.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::application::services::{ArtistDetail, GroupDetail, ReleaseDetail, TrackDetail};
use crate::domain::{
    Artist, ArtistSummary, Group, GroupMember, Image, NotificationBanner, Release, ReleaseTrack,
    Track, TrackArtist, User,
};

fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            role: user.role.as_str().to_string(),
            created_at: ts(user.created_at),
            updated_at: ts(user.updated_at),
        }
    }
}

/// Login response. The token is also set as a cookie.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

// =============================================================================
// Artists & groups
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub website_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Artist> for ArtistResponse {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id.to_string(),
            name: artist.name,
            slug: artist.slug,
            bio: artist.bio,
            country: artist.country,
            website_url: artist.website_url,
            created_at: ts(artist.created_at),
            updated_at: ts(artist.updated_at),
        }
    }
}

/// Compact reference to an artist
#[derive(Debug, Serialize)]
pub struct ArtistRefResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<ArtistSummary> for ArtistRefResponse {
    fn from(summary: ArtistSummary) -> Self {
        Self {
            id: summary.artist_id.to_string(),
            name: summary.name,
            slug: summary.slug,
        }
    }
}

/// Compact reference to a group
#[derive(Debug, Serialize)]
pub struct GroupRefResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<Group> for GroupRefResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name,
            slug: group.slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetailResponse {
    #[serde(flatten)]
    pub artist: ArtistResponse,
    pub groups: Vec<GroupRefResponse>,
    pub images: Vec<ImageResponse>,
}

impl From<ArtistDetail> for ArtistDetailResponse {
    fn from(detail: ArtistDetail) -> Self {
        Self {
            artist: detail.artist.into(),
            groups: detail.groups.into_iter().map(Into::into).collect(),
            images: detail.images.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub formed_year: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name,
            slug: group.slug,
            description: group.description,
            formed_year: group.formed_year,
            created_at: ts(group.created_at),
            updated_at: ts(group.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupMemberResponse {
    pub artist_id: String,
    pub name: String,
    pub slug: String,
    pub role: Option<String>,
    pub position: i32,
}

impl From<GroupMember> for GroupMemberResponse {
    fn from(member: GroupMember) -> Self {
        Self {
            artist_id: member.artist_id.to_string(),
            name: member.name,
            slug: member.slug,
            role: member.role,
            position: member.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupDetailResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub members: Vec<GroupMemberResponse>,
    pub images: Vec<ImageResponse>,
}

impl From<GroupDetail> for GroupDetailResponse {
    fn from(detail: GroupDetail) -> Self {
        Self {
            group: detail.group.into(),
            members: detail.members.into_iter().map(Into::into).collect(),
            images: detail.images.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Tracks & releases
// =============================================================================

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub duration_ms: Option<i32>,
    pub isrc: Option<String>,
    pub explicit: bool,
    pub audio_status: String,
    pub audio_url: Option<String>,
    pub content_hash: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Track> for TrackResponse {
    fn from(track: Track) -> Self {
        Self {
            id: track.id.to_string(),
            title: track.title,
            slug: track.slug,
            duration_ms: track.duration_ms,
            isrc: track.isrc,
            explicit: track.explicit,
            audio_status: track.audio_status.as_str().to_string(),
            audio_url: track.audio_url,
            content_hash: track.content_hash,
            mime_type: track.mime_type,
            file_size: track.file_size,
            created_at: ts(track.created_at),
            updated_at: ts(track.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackArtistResponse {
    pub artist_id: String,
    pub name: String,
    pub slug: String,
    pub credit: String,
    pub position: i32,
}

impl From<TrackArtist> for TrackArtistResponse {
    fn from(artist: TrackArtist) -> Self {
        Self {
            artist_id: artist.artist_id.to_string(),
            name: artist.name,
            slug: artist.slug,
            credit: artist.credit.as_str().to_string(),
            position: artist.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackDetailResponse {
    #[serde(flatten)]
    pub track: TrackResponse,
    pub artists: Vec<TrackArtistResponse>,
}

impl From<TrackDetail> for TrackDetailResponse {
    fn from(detail: TrackDetail) -> Self {
        Self {
            track: detail.track.into(),
            artists: detail.artists.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub release_type: String,
    pub release_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Release> for ReleaseResponse {
    fn from(release: Release) -> Self {
        Self {
            id: release.id.to_string(),
            title: release.title,
            slug: release.slug,
            release_type: release.release_type.as_str().to_string(),
            release_date: release.release_date,
            label: release.label,
            description: release.description,
            published: release.published,
            created_at: ts(release.created_at),
            updated_at: ts(release.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReleaseTrackResponse {
    pub track_id: String,
    pub title: String,
    pub slug: String,
    pub duration_ms: Option<i32>,
    pub disc_number: i32,
    pub position: i32,
}

impl From<ReleaseTrack> for ReleaseTrackResponse {
    fn from(track: ReleaseTrack) -> Self {
        Self {
            track_id: track.track_id.to_string(),
            title: track.title,
            slug: track.slug,
            duration_ms: track.duration_ms,
            disc_number: track.disc_number,
            position: track.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReleaseDetailResponse {
    #[serde(flatten)]
    pub release: ReleaseResponse,
    pub artists: Vec<ArtistRefResponse>,
    pub tracks: Vec<ReleaseTrackResponse>,
    pub images: Vec<ImageResponse>,
}

impl From<ReleaseDetail> for ReleaseDetailResponse {
    fn from(detail: ReleaseDetail) -> Self {
        Self {
            release: detail.release.into(),
            artists: detail.artists.into_iter().map(Into::into).collect(),
            tracks: detail.tracks.into_iter().map(Into::into).collect(),
            images: detail.images.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Banners & images
// =============================================================================

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub id: String,
    pub message: String,
    pub variant: String,
    pub link_url: Option<String>,
    pub link_label: Option<String>,
    pub is_active: bool,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NotificationBanner> for BannerResponse {
    fn from(banner: NotificationBanner) -> Self {
        Self {
            id: banner.id.to_string(),
            message: banner.message,
            variant: banner.variant.as_str().to_string(),
            link_url: banner.link_url,
            link_label: banner.link_label,
            is_active: banner.is_active,
            starts_at: banner.starts_at.map(ts),
            ends_at: banner.ends_at.map(ts),
            created_at: ts(banner.created_at),
            updated_at: ts(banner.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub key: String,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub content_type: String,
    pub size: i64,
    pub position: i32,
    pub created_at: String,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id.to_string(),
            owner_kind: image.owner_kind.as_str().to_string(),
            owner_id: image.owner_id.to_string(),
            key: image.storage_key,
            url: image.url,
            alt_text: image.alt_text,
            width: image.width,
            height: image.height,
            content_type: image.content_type,
            size: image.size_bytes,
            position: image.position,
            created_at: ts(image.created_at),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
}
