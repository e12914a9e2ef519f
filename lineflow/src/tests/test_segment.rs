// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::tests::utils::{FailingDevice, FixedMetrics, LETTER, SPACE, assert_near, ctx, plain};
use crate::{
    BreakReason, BreakWeight, FontId, HitPoint, InsertionValidity, RunStyle, SegmentBuilder,
    StyledTextBuilder, TextSource as _,
};

fn at(offset: usize) -> HitPoint {
    HitPoint {
        offset,
        associate_previous: false,
    }
}

fn whole_segment<'a, S: crate::TextSource + ?Sized>(
    builder: &SegmentBuilder<'a, S, crate::UnicodeProperties>,
    source: &S,
) -> crate::Segment<'a, S, crate::UnicodeProperties> {
    builder.build(
        0,
        source.len(),
        BreakWeight::Mandatory,
        BreakWeight::Mandatory,
        BreakReason::None,
        true,
    )
}

#[test]
fn width_excludes_trailing_whitespace() {
    let ctx = ctx();
    let text = plain("hello  ");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);
    assert_near(seg.width(&FixedMetrics).unwrap(), 5.0 * LETTER);
    assert_near(seg.full_width(&FixedMetrics).unwrap(), 5.0 * LETTER + 2.0 * SPACE);
}

#[test]
fn extent_takes_the_tallest_run() {
    let ctx = ctx();
    let small = RunStyle::default();
    let large = RunStyle {
        font: FontId(1),
        font_size: 24.0,
        ..RunStyle::default()
    };
    let mut b = StyledTextBuilder::new();
    b.push("ab", small);
    b.push("cd", large);
    let text = b.build();
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);

    let (width, height) = seg.extent(&FixedMetrics).unwrap();
    assert_near(width, 2.0 * LETTER + 2.0 * LETTER * 2.0);
    assert_near(height, 24.0 * 0.8 + 24.0 * 0.2);
    assert_near(seg.ascent(&FixedMetrics).unwrap(), 24.0 * 0.8);
}

#[test]
fn set_lim_discards_cached_layout() {
    let ctx = ctx();
    let text = plain("abcdef");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);

    assert!(!seg.is_measured());
    assert_near(seg.width(&FixedMetrics).unwrap(), 6.0 * LETTER);
    assert!(seg.is_measured());

    seg.set_lim(3);
    assert!(!seg.is_measured());
    assert_near(seg.width(&FixedMetrics).unwrap(), 3.0 * LETTER);
    assert_eq!(seg.range(), 0..3);
}

#[test]
fn set_direction_info_discards_cached_layout() {
    let ctx = ctx();
    let text = plain("abc");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);
    assert!(!seg.is_rtl());

    seg.width(&FixedMetrics).unwrap();
    seg.set_direction_info(1);
    assert!(!seg.is_measured());
    assert!(seg.is_rtl());
    assert_eq!(seg.bidi_level(), 1);
}

#[test]
fn point_to_char_uses_half_advance() {
    let ctx = ctx();
    let text = plain("abcd");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);

    // Left half of 'a'.
    let hit = seg.point_to_char(&FixedMetrics, 3.0).unwrap();
    assert_eq!(hit.offset, 0);
    assert!(!hit.associate_previous);

    // Right half of 'a' rounds up to the caret after it.
    let hit = seg.point_to_char(&FixedMetrics, 5.0).unwrap();
    assert_eq!(hit.offset, 1);
    assert!(hit.associate_previous);

    // Past the end clamps to the final caret.
    let hit = seg.point_to_char(&FixedMetrics, 1000.0).unwrap();
    assert_eq!(hit.offset, 4);
    assert!(hit.associate_previous);

    // Before the start clamps to the first caret.
    let hit = seg.point_to_char(&FixedMetrics, -5.0).unwrap();
    assert_eq!(hit.offset, 0);
}

#[test]
fn point_to_char_mirrors_in_rtl() {
    let ctx = ctx();
    let mut b = StyledTextBuilder::new();
    b.push_bidi("abc", RunStyle::default(), 1);
    let text = b.build();
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);
    assert!(seg.is_rtl());

    // Leftmost pixel is the logical end of a right-to-left run.
    let hit = seg.point_to_char(&FixedMetrics, 1.0).unwrap();
    assert_eq!(hit.offset, 3);
    assert!(hit.associate_previous);

    // Rightmost glyph's right half is the logical start.
    let hit = seg.point_to_char(&FixedMetrics, 23.0).unwrap();
    assert_eq!(hit.offset, 0);
    assert!(!hit.associate_previous);
}

#[test]
fn char_to_point_round_trips_ltr() {
    let ctx = ctx();
    let text = plain("abcd");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);
    for offset in 0..=4 {
        let x = seg.char_to_point(&FixedMetrics, offset).unwrap();
        assert_near(x, offset as f32 * LETTER);
    }
}

#[test]
fn char_to_point_flips_in_rtl() {
    let ctx = ctx();
    let mut b = StyledTextBuilder::new();
    b.push_bidi("abc", RunStyle::default(), 1);
    let text = b.build();
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);

    assert_near(seg.char_to_point(&FixedMetrics, 3).unwrap(), 0.0);
    assert_near(seg.char_to_point(&FixedMetrics, 0).unwrap(), 3.0 * LETTER);
    assert_near(seg.char_to_point(&FixedMetrics, 2).unwrap(), LETTER);
}

#[test]
fn range_extents_split_at_direction_boundaries() {
    let ctx = ctx();
    let mut b = StyledTextBuilder::new();
    b.push("ab", RunStyle::default());
    b.push_bidi("cd", RunStyle::default(), 1);
    let text = b.build();
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);

    // Selecting "bc" yields two visual rectangles: 'b' sits at 8..16 and
    // 'c', being the rightmost of the reversed run, at 24..32.
    let extents = seg.range_extents(&FixedMetrics, 1..3).unwrap();
    assert_eq!(extents.len(), 2);
    assert_near(extents[0].0, LETTER);
    assert_near(extents[0].1, 2.0 * LETTER);
    assert_near(extents[1].0, 3.0 * LETTER);
    assert_near(extents[1].1, 4.0 * LETTER);

    // A selection within one direction is a single rectangle.
    let extents = seg.range_extents(&FixedMetrics, 0..2).unwrap();
    assert_eq!(extents.len(), 1);
    assert_near(extents[0].0, 0.0);
    assert_near(extents[0].1, 2.0 * LETTER);
}

#[test]
fn insertion_inside_a_cluster_is_invalid() {
    let ctx = ctx();
    let text = plain("a\u{0301}b");
    let builder = SegmentBuilder::new(&ctx, &text);
    let seg = whole_segment(&builder, &text);

    assert_eq!(seg.is_valid_insertion_point(0), InsertionValidity::Valid);
    assert_eq!(seg.is_valid_insertion_point(1), InsertionValidity::Invalid);
    assert_eq!(seg.is_valid_insertion_point(2), InsertionValidity::Valid);
    assert_eq!(seg.is_valid_insertion_point(3), InsertionValidity::Valid);
    assert_eq!(seg.is_valid_insertion_point(9), InsertionValidity::Invalid);
}

#[test]
fn mid_word_segment_edges_are_not_preferred() {
    let ctx = ctx();
    let text = plain("abcd");
    let builder = SegmentBuilder::new(&ctx, &text);
    // An emergency break leaves a weightless boundary at offset 2.
    let seg = builder.build(
        0,
        2,
        BreakWeight::Mandatory,
        BreakWeight::None,
        BreakReason::Emergency,
        true,
    );
    assert_eq!(seg.is_valid_insertion_point(0), InsertionValidity::Valid);
    assert_eq!(
        seg.is_valid_insertion_point(2),
        InsertionValidity::NotPreferred
    );
}

#[test]
fn arrow_keys_skip_combining_marks() {
    let ctx = ctx();
    let text = plain("a\u{0301}bc");
    let builder = SegmentBuilder::new(&ctx, &text);
    let seg = whole_segment(&builder, &text);

    let step = |offset, forward| seg.arrow_key_position(at(offset), forward).map(|h| h.offset);
    assert_eq!(step(0, true), Some(2));
    assert_eq!(step(2, false), Some(0));
    assert_eq!(step(2, true), Some(3));
    assert_eq!(step(4, true), None);
}

#[test]
fn selection_may_end_where_the_caret_may_not() {
    let ctx = ctx();
    let text = plain("abcd");
    let builder = SegmentBuilder::new(&ctx, &text);
    let seg = builder.build(
        0,
        2,
        BreakWeight::Mandatory,
        BreakWeight::None,
        BreakReason::Emergency,
        true,
    );

    // The weightless edge is skipped by arrow movement but reachable when
    // extending a selection.
    assert_eq!(seg.arrow_key_position(at(1), true), None);
    assert_eq!(
        seg.extend_selection_position(at(1), true).map(|h| h.offset),
        Some(2)
    );
}

#[test]
fn arrow_movement_is_visual_in_rtl() {
    let ctx = ctx();
    let mut b = StyledTextBuilder::new();
    b.push_bidi("abc", RunStyle::default(), 1);
    let text = b.build();
    let builder = SegmentBuilder::new(&ctx, &text);
    let seg = whole_segment(&builder, &text);

    // Moving visually rightward decreases the logical offset.
    let step = |offset, forward| seg.arrow_key_position(at(offset), forward).map(|h| h.offset);
    assert_eq!(step(3, true), Some(2));
    assert_eq!(step(1, true), Some(0));
    assert_eq!(step(0, false), Some(1));
}

#[test]
fn arrow_movement_terminates_across_direction_boundaries() {
    let ctx = ctx();
    let mut b = StyledTextBuilder::new();
    b.push("ab", RunStyle::default());
    b.push_bidi("cd", RunStyle::default(), 1);
    let text = b.build();
    let builder = SegmentBuilder::new(&ctx, &text);
    let seg = whole_segment(&builder, &text);

    // Offset 2 exists at both sides of the direction boundary; affinity
    // tells them apart, so a full visual sweep visits every caret once and
    // stops at the trailing edge.
    let mut caret = at(0);
    let mut forward = Vec::new();
    while let Some(next) = seg.arrow_key_position(caret, true) {
        forward.push(next.offset);
        assert!(forward.len() <= text.len() + 2, "movement must terminate");
        caret = next;
    }
    assert_eq!(forward, [1, 2, 4, 3, 2]);
    assert!(
        !caret.associate_previous,
        "the trailing-edge caret belongs to the reversed run"
    );

    // The reverse sweep retraces the same carets back to the start.
    let mut backward = Vec::new();
    while let Some(prev) = seg.arrow_key_position(caret, false) {
        backward.push(prev.offset);
        assert!(backward.len() <= text.len() + 2, "movement must terminate");
        caret = prev;
    }
    assert_eq!(backward, [3, 4, 2, 1, 0]);
}

#[test]
fn stretch_values_sum_to_the_assigned_stretch() {
    let ctx = ctx();
    let text = plain("ab cd ef");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);
    assert_eq!(seg.stretch(), 0);
    assert_eq!(seg.stretch_values().iter().sum::<i32>(), 0);

    seg.set_stretch(100);
    let values = seg.stretch_values();
    assert_eq!(values.len(), text.len());
    assert_eq!(values.iter().sum::<i32>(), 100);
    assert_eq!(values[0], 0, "letters do not stretch");
    assert!(values[2] > 0, "spaces absorb the stretch");
    assert!(values[5] > 0);
}

#[test]
fn empty_segment_measures_to_nothing() {
    let ctx = ctx();
    let text = plain("abc");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = builder.build(
        1,
        0,
        BreakWeight::Whitespace,
        BreakWeight::Whitespace,
        BreakReason::None,
        false,
    );
    assert!(seg.is_empty());
    assert_near(seg.width(&FixedMetrics).unwrap(), 0.0);
    let hit = seg.point_to_char(&FixedMetrics, 10.0).unwrap();
    assert_eq!(hit.offset, 1);
}

#[test]
fn measurement_failure_propagates() {
    let ctx = ctx();
    let text = plain("abc");
    let builder = SegmentBuilder::new(&ctx, &text);
    let mut seg = whole_segment(&builder, &text);
    assert!(seg.width(&FailingDevice).is_err());
    assert!(!seg.is_measured());
    // A later query against a working device succeeds.
    assert_near(seg.width(&FixedMetrics).unwrap(), 3.0 * LETTER);
}

#[test]
fn build_line_walks_the_paragraph() {
    let ctx = ctx();
    let text = plain("hello world again");
    let builder = SegmentBuilder::new(&ctx, &text);

    let first = builder
        .build_line(&FixedMetrics, 0, 60.0, BreakWeight::Mandatory, true)
        .unwrap();
    assert_eq!(first.range(), 0..6);
    assert_eq!(first.break_reason(), BreakReason::Regular);
    assert_eq!(first.end_weight(), BreakWeight::Whitespace);
    assert!(first.ends_line());

    let second = builder
        .build_line(&FixedMetrics, 6, 60.0, first.end_weight(), true)
        .unwrap();
    assert_eq!(second.range(), 6..12);
    assert_eq!(second.start_weight(), BreakWeight::Whitespace);
    assert!(second.ends_line());

    let third = builder
        .build_line(&FixedMetrics, 12, 60.0, second.end_weight(), true)
        .unwrap();
    assert_eq!(third.range(), 12..17);
    assert_eq!(third.break_reason(), BreakReason::None);
    assert!(third.ends_line(), "the paragraph's last line ends it");
}
