// Heuristic lookup tables, kept explicit and unit-tested so each table can
// be extended without touching pipeline control flow.

pub mod boilerplate;
pub mod diagnosis;
pub mod exclusions;
pub mod vocabulary;
