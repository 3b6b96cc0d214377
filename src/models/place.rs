use serde::{Serialize, Serializer};
use sqlx::FromRow;

/// A visit joined with its location, as listed under `/users/{id}/visits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Place {
    pub mark: u8,
    pub visited_at: i32,
    pub place: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Places {
    pub visits: Vec<Place>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, FromRow)]
pub struct AverageMark {
    #[serde(serialize_with = "serialize_avg")]
    pub avg: f64,
}

// Marks live in 0..=5, so whole averages are written as plain integers.
fn serialize_avg<S>(avg: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if avg.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(avg) {
        serializer.serialize_u8(*avg as u8)
    } else {
        serializer.serialize_f64(*avg)
    }
}
