//! Level diff classification
//!
//! Merges the size of a price level in the current and next snapshot into
//! bar categories for the current blend factor.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use super::{BarKind, ClassifiedBar};
use crate::snapshot::{ScrubState, Side, Snapshot};

/// How one price level on one side changes between two snapshots
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelChange {
    /// Only present in the current snapshot
    Unchanged { last: f64 },
    /// Present in both, shrinking toward the next size
    Shrinking { last: f64, removed: f64 },
    /// Present in both, growing (or equal); `ghost` is the part still to grow
    Growing { last: f64, added: f64, ghost: Option<f64> },
    /// Only present in the next snapshot
    Appearing { next: f64, ghost: Option<f64> },
}

impl LevelChange {
    /// Classify a level from its sizes in the current and next snapshot.
    ///
    /// Ghost portions are only produced while `blend < 1`.
    pub fn between(last: Option<f64>, next: Option<f64>, blend: f64) -> Option<Self> {
        let predicting = blend < 1.0;
        match (last, next) {
            (Some(last), Some(next)) => {
                let delta = (last - next) * blend;
                if delta > 0.0 {
                    Some(LevelChange::Shrinking {
                        last: last - delta,
                        removed: delta,
                    })
                } else {
                    Some(LevelChange::Growing {
                        last,
                        added: -delta,
                        ghost: predicting.then(|| next - last + delta),
                    })
                }
            }
            (Some(last), None) => Some(LevelChange::Unchanged { last }),
            (None, Some(next)) => Some(LevelChange::Appearing {
                next: next * blend,
                ghost: predicting.then(|| next * (1.0 - blend)),
            }),
            (None, None) => None,
        }
    }

    /// Emit the bars for this change at `price` on `side`
    pub fn emit(self, side: Side, price: f64, out: &mut Vec<ClassifiedBar>) {
        let mut push = |kind, size| out.push(ClassifiedBar::new(side, kind, price, size));
        match self {
            LevelChange::Unchanged { last } => push(BarKind::Last, last),
            LevelChange::Shrinking { last, removed } => {
                push(BarKind::Last, last);
                push(BarKind::NegativeDiff, removed);
            }
            LevelChange::Growing { last, added, ghost } => {
                push(BarKind::Last, last);
                push(BarKind::PositiveDiff, added);
                if let Some(ghost) = ghost {
                    push(BarKind::Ghost, ghost);
                }
            }
            LevelChange::Appearing { next, ghost } => {
                push(BarKind::Next, next);
                if let Some(ghost) = ghost {
                    push(BarKind::Ghost, ghost);
                }
            }
        }
    }
}

type LevelKey = (OrderedFloat<f64>, Side);

/// Classify every price level of a scrub state.
///
/// Bars are ordered by price, then side. A duplicated level within one
/// snapshot keeps its first occurrence.
pub fn classify(state: &ScrubState<'_>) -> Vec<ClassifiedBar> {
    classify_pair(state.current, state.next, state.blend)
}

pub(crate) fn classify_pair(
    current: &Snapshot,
    next: Option<&Snapshot>,
    blend: f64,
) -> Vec<ClassifiedBar> {
    let mut levels: BTreeMap<LevelKey, (Option<f64>, Option<f64>)> = BTreeMap::new();

    for level in &current.levels {
        let slot = levels
            .entry((OrderedFloat(level.price), level.side))
            .or_default();
        slot.0.get_or_insert(level.size);
    }
    for level in next.iter().flat_map(|snapshot| snapshot.levels.iter()) {
        let slot = levels
            .entry((OrderedFloat(level.price), level.side))
            .or_default();
        slot.1.get_or_insert(level.size);
    }

    let mut bars = Vec::with_capacity(levels.len() * 2);
    for ((OrderedFloat(price), side), (last, next)) in levels {
        if let Some(change) = LevelChange::between(last, next, blend) {
            change.emit(side, price, &mut bars);
        }
    }
    bars
}
