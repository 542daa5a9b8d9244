use serde::Serialize;
use std::fmt;

use crate::StudentProfile;

/// Profile fields a student must fill in before the profile counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    MatricNo,
    Programme,
    Year,
    Phone,
}

pub const REQUIRED_FIELDS: [RequiredField; 4] = [
    RequiredField::MatricNo,
    RequiredField::Programme,
    RequiredField::Year,
    RequiredField::Phone,
];

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::MatricNo => "matric_no",
            RequiredField::Programme => "programme",
            RequiredField::Year => "year",
            RequiredField::Phone => "phone",
        }
    }

    fn value<'a>(&self, profile: &'a StudentProfile) -> Option<&'a str> {
        match self {
            RequiredField::MatricNo => profile.matric_no.as_deref(),
            RequiredField::Programme => profile.programme.as_deref(),
            RequiredField::Year => profile.year.as_deref(),
            RequiredField::Phone => profile.phone.as_deref(),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required fields that are absent or blank, in declaration order.
pub fn missing_fields(profile: &StudentProfile) -> Vec<RequiredField> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| field.value(profile).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

/// `false` when no profile is loaded: without data there is nothing to
/// judge, and the completion prompt must stay hidden.
pub fn is_incomplete(profile: Option<&StudentProfile>) -> bool {
    match profile {
        Some(profile) => !missing_fields(profile).is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserProfile;

    fn complete_profile() -> StudentProfile {
        let mut profile = StudentProfile::new(UserProfile::new("u1", "Aina", "aina@example.edu"));
        profile.matric_no = Some("A20EC0001".into());
        profile.programme = Some("CS".into());
        profile.year = Some("2".into());
        profile.phone = Some("0123456789".into());
        profile
    }

    #[test]
    fn test_absent_profile_is_not_incomplete() {
        assert!(!is_incomplete(None));
    }

    #[test]
    fn test_complete_profile() {
        let profile = complete_profile();
        assert!(!is_incomplete(Some(&profile)));
        assert!(missing_fields(&profile).is_empty());
    }

    #[test]
    fn test_each_required_field_makes_profile_incomplete() {
        for field in REQUIRED_FIELDS {
            let mut empty = complete_profile();
            let mut absent = complete_profile();
            match field {
                RequiredField::MatricNo => {
                    empty.matric_no = Some(String::new());
                    absent.matric_no = None;
                }
                RequiredField::Programme => {
                    empty.programme = Some(String::new());
                    absent.programme = None;
                }
                RequiredField::Year => {
                    empty.year = Some(String::new());
                    absent.year = None;
                }
                RequiredField::Phone => {
                    empty.phone = Some(String::new());
                    absent.phone = None;
                }
            }
            assert!(is_incomplete(Some(&empty)), "empty {} not detected", field);
            assert!(is_incomplete(Some(&absent)), "absent {} not detected", field);
            assert_eq!(missing_fields(&empty), vec![field]);
        }
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let mut profile = complete_profile();
        profile.phone = Some("   ".into());
        assert_eq!(missing_fields(&profile), vec![RequiredField::Phone]);
    }

    #[test]
    fn test_fresh_profile_misses_everything() {
        let profile = StudentProfile::new(UserProfile::new("u2", "Ben", "ben@example.edu"));
        assert_eq!(missing_fields(&profile), REQUIRED_FIELDS.to_vec());
    }
}
