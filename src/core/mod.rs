//! Core reframing building blocks: subject detection, geometry planning,
//! backdrop synthesis, composition, enhancement, resize/padding and save
//! helpers. These are internal primitives consumed by the high-level `api`
//! module.
pub mod params;
pub mod processing;
