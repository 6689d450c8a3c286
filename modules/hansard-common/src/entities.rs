//! Gold-layer entities and the verifiability contract that guards them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An entity whose extracted fields may be overwritten by AI only while no
/// human has verified it. The flag itself is set outside this system.
pub trait VerifiableEntity {
    fn is_manually_verified(&self) -> bool;

    /// Provenance pointer to the most recent log that actually updated this
    /// entity. None until the first applied AI update.
    fn latest_extraction_log_id(&self) -> Option<i64>;

    fn can_be_updated_by_ai(&self) -> bool {
        !self.is_manually_verified()
    }

    /// Record provenance after a successful apply. Never touches the
    /// manually-verified flag.
    fn update_from_extraction_log(&mut self, log_id: i64);
}

macro_rules! impl_verifiable {
    ($ty:ty) => {
        impl VerifiableEntity for $ty {
            fn is_manually_verified(&self) -> bool {
                self.is_manually_verified
            }

            fn latest_extraction_log_id(&self) -> Option<i64> {
                self.latest_extraction_log_id
            }

            fn update_from_extraction_log(&mut self, log_id: i64) {
                self.latest_extraction_log_id = Some(log_id);
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Politician {
    pub id: i64,
    pub name: String,
    pub furigana: Option<String>,
    pub district: Option<String>,
    pub profile_page_url: Option<String>,
    pub party_id: Option<i64>,
    pub is_manually_verified: bool,
    pub latest_extraction_log_id: Option<i64>,
}

/// A speaker string as it appears in minutes, with its resolved politician
/// linkage once the matching engine has produced one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speaker {
    pub id: i64,
    pub name: String,
    pub speaker_type: Option<String>,
    pub political_party_name: Option<String>,
    pub position: Option<String>,
    pub politician_id: Option<i64>,
    pub is_manually_verified: bool,
    pub latest_extraction_log_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: i64,
    pub speech: String,
    pub speaker_name: String,
    pub sequence_number: Option<i32>,
    pub speaker_id: Option<i64>,
    pub chapter_id: Option<i64>,
    pub is_manually_verified: bool,
    pub latest_extraction_log_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParliamentaryGroupMembership {
    pub id: i64,
    pub politician_id: i64,
    pub group_id: i64,
    pub role: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_manually_verified: bool,
    pub latest_extraction_log_id: Option<i64>,
}

impl_verifiable!(Politician);
impl_verifiable!(Speaker);
impl_verifiable!(Statement);
impl_verifiable!(ParliamentaryGroupMembership);

#[cfg(test)]
mod tests {
    use super::*;

    fn politician() -> Politician {
        Politician {
            id: 1,
            name: "山田太郎".to_string(),
            furigana: None,
            district: None,
            profile_page_url: None,
            party_id: None,
            is_manually_verified: false,
            latest_extraction_log_id: None,
        }
    }

    #[test]
    fn unverified_entity_is_updatable() {
        let p = politician();
        assert!(p.can_be_updated_by_ai());
    }

    #[test]
    fn verified_entity_is_not_updatable() {
        let mut p = politician();
        p.is_manually_verified = true;
        assert!(!p.can_be_updated_by_ai());
    }

    #[test]
    fn provenance_pointer_does_not_touch_verified_flag() {
        let mut p = politician();
        p.update_from_extraction_log(99);
        assert_eq!(p.latest_extraction_log_id(), Some(99));
        assert!(!p.is_manually_verified());
    }
}
