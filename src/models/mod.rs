pub mod filter;
pub mod location;
pub mod place;
pub mod user;
pub mod visit;

pub use filter::{AverageFilter, AverageKey, VisitFilter, VisitKey};
pub use location::{Location, LocationPatch};
pub use place::{AverageMark, Place, Places};
pub use user::{Gender, User, UserPatch};
pub use visit::{Visit, VisitPatch};

use serde::{Deserialize, Deserializer};

// Patch fields: a missing key falls back to `#[serde(default)]`, while an
// explicit `null` reaches `T::deserialize` and is rejected.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
