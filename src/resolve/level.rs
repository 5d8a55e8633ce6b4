//! Resolution level assignment.

use super::{BlockMatch, Matched};
use crate::dictionary::BlockRecord;
use crate::models::Level;

/// Deepest level reached by `matched`.
pub fn assign(matched: &Matched) -> Level {
    if let Some(block) = &matched.block {
        return block_level(block.components, block.record.as_ref());
    }
    if matched.town.is_some() {
        Level::Town
    } else if matched.city.is_some() {
        Level::City
    } else if matched.prefecture.is_some() {
        Level::Prefecture
    } else {
        Level::Unmatched
    }
}

/// Level for `components` tokenized block parts, `record` being the longest
/// leading run the dictionary knows.
pub fn block_level(components: usize, record: Option<&BlockRecord>) -> Level {
    match record {
        Some(r) if r.components >= components => Level::RecordedParcel,
        Some(r) if r.components == 1 => Level::RecordedBlock,
        Some(_) => Level::RecordedPrefix,
        None if components <= 1 => Level::Block,
        None => Level::BlockDetail,
    }
}

impl BlockMatch {
    pub(crate) fn level(&self) -> Level {
        block_level(self.components, self.record.as_ref())
    }
}
