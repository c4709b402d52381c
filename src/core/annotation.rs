//! Dive-site annotations supplied by the host.
//!
//! Annotations are immutable values. The host replaces the whole ordered
//! list on every data change; the core never edits one in place.

use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

macro_rules! attribute_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Attribute value written into map features
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

attribute_enum! {
    pub enum AnnotationKind {
        Site => "site",
        Wreck => "wreck",
    }
}

attribute_enum! {
    /// The diver's relationship to a site.
    pub enum SiteStatus {
        Logged => "logged",
        Saved => "saved",
        Planned => "planned",
        Baseline => "baseline",
    }
}

attribute_enum! {
    pub enum Difficulty {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Expert => "expert",
        Other => "other",
    }
}

attribute_enum! {
    pub enum SiteType {
        Reef => "reef",
        Wreck => "wreck",
        Wall => "wall",
        Cave => "cave",
        Shore => "shore",
        Drift => "drift",
        Generic => "generic",
    }
}

/// A single dive site (or wreck) placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub coordinate: LatLng,
    pub kind: AnnotationKind,
    pub status: SiteStatus,
    pub difficulty: Difficulty,
    pub site_type: SiteType,
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub wishlist: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Annotation {
    /// A baseline reef site with every flag cleared
    pub fn site(id: impl Into<String>, coordinate: LatLng) -> Self {
        Self {
            id: id.into(),
            coordinate,
            kind: AnnotationKind::Site,
            status: SiteStatus::Baseline,
            difficulty: Difficulty::Other,
            site_type: SiteType::Reef,
            visited: false,
            wishlist: false,
            selected: false,
        }
    }

    pub fn with_status(mut self, status: SiteStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_site_type(mut self, site_type: SiteType) -> Self {
        self.site_type = site_type;
        if site_type == SiteType::Wreck {
            self.kind = AnnotationKind::Wreck;
        }
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn visited(mut self, visited: bool) -> Self {
        self.visited = visited;
        self
    }

    pub fn wishlisted(mut self, wishlist: bool) -> Self {
        self.wishlist = wishlist;
        self
    }
}
