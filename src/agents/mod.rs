//! Agent data model: definitions, the tiled structure-of-arrays store, and
//! per-tile community indexing.

pub mod community;
pub mod defs;
pub mod store;

pub use community::CommunityIndex;
pub use defs::{
    school_type_of_grade, AgeGroup, GroupAttr, HospAgeGroup, SchoolType, StatChannel, Status,
    SymptomStatus, FAMILIES_PER_CLUSTER, NUM_AGE_GROUPS, NUM_GROUP_ATTRS, NUM_HOSP_AGE_GROUPS,
    NUM_SCHOOL_TYPES, NUM_STAT_CHANNELS,
};
pub use store::{AgentAttributes, AgentRow, AgentStore, DiseaseCols, DiseaseRowState, Tile};
