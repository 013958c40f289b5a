// School-record reconciliation pipeline.
//
// Raw per-subdistrict JSON exports (four education levels) and their
// matching "kegiatan" activity files are extracted, normalized into one
// canonical school shape, merged with first-wins deduplication, and handed
// to the export layer as a flat entity list plus diagnostics.
pub mod extract;
pub mod fields;
pub mod geography;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
