use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::seed::mapper::FractalParameters;

/// Size classes a caller may request, smallest to largest.
///
/// Unknown inputs parse to the default class ([`SizeClass::M`]) rather than
/// failing; the resolution lookup itself is total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// 500x281.
    Xs,
    /// 1000x563.
    S,
    /// 2000x1125 (default).
    M,
    /// 3000x1688.
    L,
    /// 4000x2250, privileged.
    Xl,
    /// 5000x2813, privileged.
    Xxl,
}

impl SizeClass {
    /// Parse a case-insensitive size class name, falling back to the default
    /// class for anything unrecognized.
    pub fn parse_or_default(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "xs" => Self::Xs,
            "s" => Self::S,
            "m" => Self::M,
            "l" => Self::L,
            "xl" => Self::Xl,
            "xxl" => Self::Xxl,
            _ => Self::M,
        }
    }

    /// Lowercase wire name, used in cache keys and task bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::S => "s",
            Self::M => "m",
            Self::L => "l",
            Self::Xl => "xl",
            Self::Xxl => "xxl",
        }
    }

    /// Fixed lookup from size class to pixel dimensions.
    pub fn resolution(self) -> Resolution {
        let (width, height) = match self {
            Self::Xs => (500, 281),
            Self::S => (1000, 563),
            Self::M => (2000, 1125),
            Self::L => (3000, 1688),
            Self::Xl => (4000, 2250),
            Self::Xxl => (5000, 2813),
        };
        Resolution { width, height }
    }

    /// Minimum privilege a requester must hold for this class.
    ///
    /// Largest classes are restricted to the `admin` group, the smallest
    /// require at least an authenticated identity, and mid-range classes are
    /// open.
    pub fn required_privilege(self) -> Privilege {
        match self {
            Self::Xl | Self::Xxl => Privilege::Group(ADMIN_GROUP),
            Self::Xs | Self::S => Privilege::Authenticated,
            Self::M | Self::L => Privilege::Open,
        }
    }
}

/// Group name that unlocks the privileged size classes.
pub const ADMIN_GROUP: &str = "admin";

/// Minimum requester privilege attached to a size class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Privilege {
    /// Anyone, including anonymous requesters.
    Open,
    /// Any authenticated identity (claims present, groups may be empty).
    Authenticated,
    /// Membership in a specific group.
    Group(&'static str),
}

/// Pixel dimensions of a rendered artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Deterministic string identifying a renderable request at minute
/// granularity: `lower(region)_lower(city)_lower(size)_time-bucket`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// View the key as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object-store key for the published artifact (`<key>.png`).
    pub fn file_key(&self) -> String {
        format!("{}.png", self.0)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// UTC wall clock truncated to minute granularity (`%Y-%m-%d-%H-%M`).
///
/// Requests within the same minute for one location/size collapse onto one
/// cache key; the next minute rolls over to a fresh key, so cached artifacts
/// never go stale, they simply age out.
pub fn time_bucket(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d-%H-%M").to_string()
}

/// One render request, immutable once created.
///
/// Doubles as the task-queue body, so it is serde-serializable end to end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Region or country name as the caller sent it.
    pub region: String,
    /// City name as the caller sent it.
    pub city: String,
    /// Requested size class.
    pub size_class: SizeClass,
    /// Minute-granularity time bucket fixed at request creation.
    pub time_bucket: String,
    /// Group memberships extracted from the caller's identity token.
    ///
    /// `None` means anonymous; `Some(vec![])` means authenticated with no
    /// groups.
    pub requester_claims: Option<Vec<String>>,
}

impl GenerationRequest {
    /// Build a request stamped with the current UTC minute bucket.
    pub fn new(
        region: impl Into<String>,
        city: impl Into<String>,
        size_class: SizeClass,
        requester_claims: Option<Vec<String>>,
    ) -> Self {
        Self::with_time_bucket(region, city, size_class, requester_claims, time_bucket(Utc::now()))
    }

    /// Build a request with an explicit time bucket.
    pub fn with_time_bucket(
        region: impl Into<String>,
        city: impl Into<String>,
        size_class: SizeClass,
        requester_claims: Option<Vec<String>>,
        time_bucket: String,
    ) -> Self {
        Self {
            region: region.into(),
            city: city.into(),
            size_class,
            time_bucket,
            requester_claims,
        }
    }

    /// Derive the deterministic cache key for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey(format!(
            "{}_{}_{}_{}",
            self.region.to_lowercase(),
            self.city.to_lowercase(),
            self.size_class.as_str(),
            self.time_bucket
        ))
    }

    /// True if the requester presented any identity at all.
    pub fn is_authenticated(&self) -> bool {
        self.requester_claims.is_some()
    }

    /// True if the requester's claims include `group`.
    pub fn has_group(&self, group: &str) -> bool {
        self.requester_claims
            .as_deref()
            .is_some_and(|groups| groups.iter().any(|g| g == group))
    }
}

/// Write-once record describing one successfully published artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Object-store key of the published PNG.
    pub file_key: String,
    /// Region as requested.
    pub region: String,
    /// City as requested.
    pub city: String,
    /// Size class as requested.
    pub size_class: SizeClass,
    /// Pixel dimensions actually rendered.
    pub resolution: Resolution,
    /// Julia constant the renderer used (table entry or fallback).
    pub params_used: FractalParameters,
    /// Iteration budget the renderer used.
    pub max_iter: u16,
    /// RFC 3339 publication timestamp.
    pub generated_at: String,
}

impl GenerationMetadata {
    /// Format a publication timestamp the way stored records expect it.
    pub fn timestamp(now: DateTime<Utc>) -> String {
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
