pub mod animal;
pub mod auth;
pub mod filter;
pub mod forms;
pub mod normalize;
pub mod records;

pub use animal::{Animal, AnimalStatus, ParseEnumError, Sex, Size, Species};
pub use auth::{Credentials, Session, User};
pub use filter::FilterCriteria;
pub use forms::{AdoptionForm, ProfileForm, ReportForm, ValidationError, VolunteerForm};
pub use normalize::{normalize_animal, normalize_photos};
