pub mod character;
pub mod payload;

pub use character::{Character, Skill, SkillQueueEntry};
pub use payload::{
    DetailCharacter, DetailEntry, DetailFields, DetailsPayload, FlagField, PayloadError,
    ProgressField, RosterGroup, RosterPayload,
};
