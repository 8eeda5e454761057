use serde::Deserialize;
use uuid::Uuid;

/// One response from `POST /generate_response`. Every field is optional;
/// each one present is the full new value of that slice of state, not a
/// delta to merge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    pub response_message: Option<String>,
    pub location_names: Option<Vec<Location>>,
    pub stores: Option<Vec<StoreRecord>>,
    pub route: Option<RouteSet>,
    pub station: Option<Station>,
    pub waypoints: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: String,
    pub location: LatLng,
}

/// Origin/destination anchor of a route.
#[derive(Debug, Clone, Deserialize)]
pub struct Station {
    pub name: String,
    pub location: LatLng,
}

/// A store as the backend sends it over the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub photo: String,
}

/// A store after ingestion. Names are not guaranteed unique, so each
/// store gets its own id when a snapshot is taken in.
#[derive(Debug, Clone)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub rating: f64,
    pub address: String,
    pub website: String,
    pub photo: String,
}

// Identity is the ingestion id; display names may collide
impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl From<StoreRecord> for Store {
    fn from(record: StoreRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: record.name,
            rating: record.rating,
            address: record.address,
            website: record.website,
            photo: record.photo,
        }
    }
}

/// The `route` field of a response: route alternatives as computed by
/// the backend's directions call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSet {
    #[serde(default)]
    pub routes: Vec<RouteAlternative>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteAlternative {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
}

/// Directions-style value pair: human text plus the raw number
/// (meters for distance, seconds for duration).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: i64,
}

impl RouteAlternative {
    pub fn total_distance_meters(&self) -> i64 {
        self.legs.iter().map(|leg| leg.distance.value).sum()
    }

    pub fn total_duration_secs(&self) -> i64 {
        self.legs.iter().map(|leg| leg.duration.value).sum()
    }

    /// One-line label for the alternatives list, e.g. "R168 (34.2 km, 55 min)".
    pub fn label(&self) -> String {
        let name = if self.summary.is_empty() {
            "Route"
        } else {
            &self.summary
        };
        format!(
            "{} ({}, {})",
            name,
            format_distance(self.total_distance_meters()),
            format_duration(self.total_duration_secs())
        )
    }
}

pub fn format_distance(meters: i64) -> String {
    if meters >= 1000 {
        format!("{:.1} km", meters as f64 / 1000.0)
    } else {
        format!("{} m", meters)
    }
}

pub fn format_duration(secs: i64) -> String {
    let minutes = secs / 60;
    if minutes >= 60 {
        format!("{} h {} min", minutes / 60, minutes % 60)
    } else {
        format!("{} min", minutes)
    }
}

/// Whether a waypoint corresponds to a known location. Unknown stops are
/// drawn with the warning marker in the itinerary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Known,
    Unknown,
}

/// A waypoint is a known stop when some returned location name contains
/// it. Waypoint strings and location names come from different backend
/// steps and only overlap by substring.
pub fn classify_stop(waypoint: &str, locations: &[Location]) -> StopKind {
    if locations.iter().any(|loc| loc.name.contains(waypoint)) {
        StopKind::Known
    } else {
        StopKind::Unknown
    }
}

/// The store card to inline under a waypoint, if the waypoint names a
/// returned store exactly.
pub fn store_for_waypoint<'a>(waypoint: &str, stores: &'a [Store]) -> Option<&'a Store> {
    stores.iter().find(|store| store.name == waypoint)
}
