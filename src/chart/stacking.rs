//! Diverging stack layout
//!
//! Asks accumulate rightward from zero and bids leftward, in category order,
//! independently at each price level.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use super::{AxisDomain, BarCategory, ChartFrame, ChartScales, ClassifiedBar, LayoutRect, SizeScale};
use crate::error::{DepthChartError, Result};
use crate::snapshot::Side;

/// A bar's extent in signed size units (bids negative)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedBar {
    pub category: BarCategory,
    pub price: f64,
    pub from: f64,
    pub to: f64,
}

/// Stack bars per price level around zero
pub fn stack(bars: &[ClassifiedBar]) -> Result<Vec<StackedBar>> {
    let mut by_price: BTreeMap<OrderedFloat<f64>, Vec<&ClassifiedBar>> = BTreeMap::new();
    for bar in bars {
        if bar.category.side() != bar.side {
            return Err(DepthChartError::UnknownCategory(format!(
                "{} on {:?} side at price {}",
                bar.category, bar.side, bar.price
            )));
        }
        by_price.entry(OrderedFloat(bar.price)).or_default().push(bar);
    }

    let mut stacked = Vec::with_capacity(bars.len());
    for (OrderedFloat(price), mut level) in by_price {
        level.sort_by_key(|bar| bar.category.order());

        let mut ask_offset = 0.0;
        let mut bid_offset = 0.0;
        for bar in level {
            let offset = match bar.side {
                Side::Ask => &mut ask_offset,
                Side::Bid => &mut bid_offset,
            };
            let from = *offset;
            *offset = match bar.side {
                Side::Ask => from + bar.size,
                Side::Bid => from - bar.size,
            };
            stacked.push(StackedBar {
                category: bar.category,
                price,
                from,
                to: *offset,
            });
        }
    }
    Ok(stacked)
}

/// Stack bars and map their extents through `scale`
pub fn layout_with<S: SizeScale + ?Sized>(
    bars: &[ClassifiedBar],
    scale: &S,
) -> Result<Vec<LayoutRect>> {
    let rects = stack(bars)?
        .into_iter()
        .map(|bar| {
            let from = scale.size_to_x(bar.from);
            let to = scale.size_to_x(bar.to);
            LayoutRect {
                x_start: from.min(to),
                x_end: from.max(to),
                price: bar.price,
                category: bar.category,
            }
        })
        .collect();
    Ok(rects)
}

/// Lay out bars against a domain inside a chart frame
pub fn layout(
    bars: &[ClassifiedBar],
    domain: &AxisDomain,
    frame: &ChartFrame,
) -> Result<Vec<LayoutRect>> {
    let scales = ChartScales::new(domain, frame);
    layout_with(bars, &scales.size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::scale::MockSizeScale;
    use crate::chart::BarKind;

    fn bar(side: Side, kind: BarKind, price: f64, size: f64) -> ClassifiedBar {
        ClassifiedBar::new(side, kind, price, size)
    }

    #[test]
    fn test_opposite_sides_diverge() {
        let bars = vec![
            bar(Side::Ask, BarKind::Last, 100.0, 5.0),
            bar(Side::Bid, BarKind::Last, 100.0, 3.0),
        ];

        let mut scale = MockSizeScale::new();
        scale
            .expect_size_to_x()
            .returning(|size| 500.0 + size * 10.0);

        let rects = layout_with(&bars, &scale).unwrap();
        let bid = rects.iter().find(|r| r.category == BarCategory::LastBid).unwrap();
        let ask = rects.iter().find(|r| r.category == BarCategory::LastAsk).unwrap();

        assert_eq!((bid.x_start, bid.x_end), (470.0, 500.0));
        assert_eq!((ask.x_start, ask.x_end), (500.0, 550.0));
        assert!(bid.x_end <= ask.x_start);
        assert_eq!(ask.width() / bid.width(), 5.0 / 3.0);
    }

    #[test]
    fn test_stack_follows_category_order() {
        // deliberately out of order
        let bars = vec![
            bar(Side::Ask, BarKind::Ghost, 101.0, 3.0),
            bar(Side::Ask, BarKind::PositiveDiff, 101.0, 3.0),
            bar(Side::Ask, BarKind::Last, 101.0, 4.0),
        ];
        let stacked = stack(&bars).unwrap();
        let extents: Vec<_> = stacked
            .iter()
            .map(|bar| (bar.category, bar.from, bar.to))
            .collect();
        assert_eq!(
            extents,
            vec![
                (BarCategory::LastAsk, 0.0, 4.0),
                (BarCategory::PositiveAskDiff, 4.0, 7.0),
                (BarCategory::NextAskGhost, 7.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_absent_categories_do_not_shift() {
        let bars = vec![
            bar(Side::Bid, BarKind::Next, 99.0, 2.0),
            bar(Side::Bid, BarKind::Ghost, 99.0, 1.0),
        ];
        let stacked = stack(&bars).unwrap();
        assert_eq!((stacked[0].from, stacked[0].to), (0.0, -2.0));
        assert_eq!((stacked[1].from, stacked[1].to), (-2.0, -3.0));
    }

    #[test]
    fn test_price_levels_stack_independently() {
        let bars = vec![
            bar(Side::Ask, BarKind::Last, 101.0, 4.0),
            bar(Side::Ask, BarKind::Last, 102.0, 1.0),
        ];
        let stacked = stack(&bars).unwrap();
        assert!(stacked.iter().all(|bar| bar.from == 0.0));
    }

    #[test]
    fn test_mismatched_side_is_rejected() {
        let bars = vec![ClassifiedBar {
            category: BarCategory::LastAsk,
            price: 100.0,
            size: 1.0,
            side: Side::Bid,
        }];
        assert!(matches!(
            stack(&bars),
            Err(DepthChartError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_layout_against_domain() {
        let bars = vec![
            bar(Side::Ask, BarKind::Last, 100.0, 10.0),
            bar(Side::Bid, BarKind::Last, 100.0, 10.0),
        ];
        let domain = AxisDomain::new(10.0, 99.0, 101.0);
        let rects = layout(&bars, &domain, &ChartFrame::default()).unwrap();

        let ask = rects.iter().find(|r| r.category == BarCategory::LastAsk).unwrap();
        let bid = rects.iter().find(|r| r.category == BarCategory::LastBid).unwrap();
        assert_eq!(ask.x_start, 500.0);
        assert_eq!(bid.x_end, 500.0);
        assert!(ask.x_end < 850.0);
        assert!(bid.x_start > 150.0);
    }
}
