//! Basic agent-level definitions: age groups, school types, disease status
//! values, and the grade partition shared by initialization and the school
//! interaction kernel.

use serde::{Deserialize, Serialize};

/// Number of age groups ([`AgeGroup`]).
pub const NUM_AGE_GROUPS: usize = 6;
/// Number of school types ([`SchoolType`]).
pub const NUM_SCHOOL_TYPES: usize = 6;
/// Number of hospitalization age buckets ([`HospAgeGroup`]).
pub const NUM_HOSP_AGE_GROUPS: usize = 3;
/// Families per home neighborhood cluster.
pub const FAMILIES_PER_CLUSTER: i32 = 4;

/// Age group of an agent. "Child" means under 18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AgeGroup {
    U5 = 0,
    A5to17,
    A18to29,
    A30to49,
    A50to64,
    O65,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; NUM_AGE_GROUPS] = [
        AgeGroup::U5,
        AgeGroup::A5to17,
        AgeGroup::A18to29,
        AgeGroup::A30to49,
        AgeGroup::A50to64,
        AgeGroup::O65,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_child(self) -> bool {
        self <= AgeGroup::A5to17
    }

    /// The coarser bucket used for hospitalization lengths and outcomes.
    #[must_use]
    pub fn hosp_group(self) -> HospAgeGroup {
        match self {
            AgeGroup::O65 => HospAgeGroup::O65,
            AgeGroup::A50to64 => HospAgeGroup::A50to64,
            _ => HospAgeGroup::U50,
        }
    }
}

/// Age buckets for hospitalization days; note that these are distinct from
/// the six-way [`AgeGroup`] used everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HospAgeGroup {
    U50 = 0,
    A50to64,
    O65,
}

impl HospAgeGroup {
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// School type, indexing the school transmission tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchoolType {
    None = 0,
    College,
    High,
    Middle,
    Elem,
    Daycare,
}

impl SchoolType {
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

// grade definitions
// 0: childcare,
// 1-7: public preschool through 5th, 8-10: public 6th-8th,
// 11-14: public 9th-12th,
// 15-21: private preschool through 5th, 22-24: private 6th-8th,
// 25-28: private 9th-12th,
// 29: undergrad, 30: grad

/// Deterministic partition of school grades into school types.
#[must_use]
pub fn school_type_of_grade(grade: i32) -> SchoolType {
    if grade == 0 {
        return SchoolType::Daycare;
    }
    if (1..=7).contains(&grade) || (15..=21).contains(&grade) {
        return SchoolType::Elem;
    }
    if (8..=10).contains(&grade) || (22..=24).contains(&grade) {
        return SchoolType::Middle;
    }
    if (11..=14).contains(&grade) || (25..=28).contains(&grade) {
        return SchoolType::High;
    }
    if grade >= 29 {
        return SchoolType::College;
    }
    SchoolType::None
}

/// Disease status of an agent for one disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Status {
    /// Never infected.
    Never = 0,
    Infected,
    /// No longer infected; immunity counts down in `disease_counter`.
    Immune,
    /// Immunity expired; can be infected again.
    Susceptible,
    Dead,
}

/// Symptom class of an infected agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SymptomStatus {
    /// Not yet symptomatic, but will be.
    Presymptomatic = 0,
    Symptomatic,
    /// Will remain symptom-free until recovery.
    Asymptomatic,
}

/// Channels of the per-community statistics grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatChannel {
    Hospitalization = 0,
    Icu,
    Ventilator,
    Death,
}

/// Number of [`StatChannel`] values.
pub const NUM_STAT_CHANNELS: usize = 4;

/// Integer agent attributes that interaction kernels group by. Used to key
/// the lazily cached `max_group` values that size the dense counter arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GroupAttr {
    Family = 0,
    Nborhood,
    WorkNborhood,
    Workgroup,
    Naics,
    SchoolId,
    SchoolGrade,
}

/// Number of [`GroupAttr`] values.
pub const NUM_GROUP_ATTRS: usize = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_partition_is_total() {
        for grade in 0..=30 {
            let t = school_type_of_grade(grade);
            assert_ne!(t, SchoolType::None, "grade {grade} unassigned");
        }
        assert_eq!(school_type_of_grade(0), SchoolType::Daycare);
        assert_eq!(school_type_of_grade(7), SchoolType::Elem);
        assert_eq!(school_type_of_grade(15), SchoolType::Elem);
        assert_eq!(school_type_of_grade(10), SchoolType::Middle);
        assert_eq!(school_type_of_grade(24), SchoolType::Middle);
        assert_eq!(school_type_of_grade(14), SchoolType::High);
        assert_eq!(school_type_of_grade(28), SchoolType::High);
        assert_eq!(school_type_of_grade(29), SchoolType::College);
        assert_eq!(school_type_of_grade(30), SchoolType::College);
    }

    #[test]
    fn child_boundary() {
        assert!(AgeGroup::U5.is_child());
        assert!(AgeGroup::A5to17.is_child());
        assert!(!AgeGroup::A18to29.is_child());
    }

    #[test]
    fn hosp_groups() {
        assert_eq!(AgeGroup::U5.hosp_group(), HospAgeGroup::U50);
        assert_eq!(AgeGroup::A30to49.hosp_group(), HospAgeGroup::U50);
        assert_eq!(AgeGroup::A50to64.hosp_group(), HospAgeGroup::A50to64);
        assert_eq!(AgeGroup::O65.hosp_group(), HospAgeGroup::O65);
    }
}
