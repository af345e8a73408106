//! Lifecycle properties checked against the headless platform.

use termscreen::core::{
    Context, HeadlessPlatform, LabelFormat, RipoffEdge, ScreenError, SoftLabels,
};

fn context(lines: u16, cols: u16) -> Context<HeadlessPlatform> {
    Context::new(HeadlessPlatform::new(lines, cols))
}

#[test]
fn test_drawable_plus_reserved_equals_physical() {
    for lines in [2u16, 3, 7, 24, 61] {
        for cols in [2u16, 10, 80, 133] {
            let mut ctx = context(lines, cols);
            let drawable_rows = ctx.open(&[]).unwrap().rows();
            let screen = ctx.screen().unwrap();
            assert_eq!(
                drawable_rows + screen.ripped_count() + screen.label_lines(),
                lines
            );
            assert_eq!(screen.drawable().cols(), cols);
        }
    }

    let mut ctx = context(24, 80).with_labels(SoftLabels::new(LabelFormat::ThreeTwoThree));
    ctx.ripoff_line(RipoffEdge::Top, |_, _| {}).unwrap();
    ctx.ripoff_line(RipoffEdge::Bottom, |_, _| {}).unwrap();
    let drawable_rows = ctx.open(&[]).unwrap().rows();
    let screen = ctx.screen().unwrap();
    assert_eq!(drawable_rows, 21);
    assert_eq!(
        drawable_rows + screen.ripped_count() + screen.label_lines(),
        24
    );
}

#[test]
fn test_top_ripoffs_stack_in_registration_order() {
    let mut ctx = context(24, 80);
    ctx.ripoff_line(RipoffEdge::Top, |w, _| {
        w.put_str(0, 0, "A");
    })
    .unwrap();
    ctx.ripoff_line(RipoffEdge::Top, |w, _| {
        w.put_str(0, 0, "B");
    })
    .unwrap();

    let win = ctx.open(&[]).unwrap();
    assert_eq!(win.origin(), (2, 0));

    let lines = ctx.screen().unwrap().ripped_lines();
    assert_eq!(lines[0].window.begy, 0);
    assert_eq!(lines[0].window.cell(0, 0).unwrap().ch, 'A');
    assert_eq!(lines[1].window.begy, 1);
    assert_eq!(lines[1].window.cell(0, 0).unwrap().ch, 'B');
}

#[test]
fn test_bottom_ripoff_ignores_top_registrations() {
    for top_first in [true, false] {
        let mut ctx = context(24, 80);
        if top_first {
            ctx.ripoff_line(RipoffEdge::Top, |_, _| {}).unwrap();
        }
        ctx.ripoff_line(RipoffEdge::Bottom, |_, _| {}).unwrap();
        if !top_first {
            ctx.ripoff_line(RipoffEdge::Top, |_, _| {}).unwrap();
        }

        let win = ctx.open(&[]).unwrap();
        assert_eq!(win.origin(), (1, 0));
        assert_eq!(win.rows(), 22);

        let screen = ctx.screen().unwrap();
        let bottom = screen
            .ripped_lines()
            .iter()
            .find(|l| l.edge == RipoffEdge::Bottom)
            .unwrap();
        assert_eq!(bottom.window.begy, 23);
        // Directly below the drawable area
        assert_eq!(screen.drawable().begy + screen.drawable().rows(), 23);
    }
}

#[test]
fn test_ripoff_capacity() {
    let mut ctx = context(24, 80);
    for _ in 0..5 {
        ctx.ripoff_line(RipoffEdge::Top, |_, _| {}).unwrap();
    }
    assert!(matches!(
        ctx.ripoff_line(RipoffEdge::Bottom, |_, _| {}),
        Err(ScreenError::CapacityExceeded)
    ));
}

#[test]
fn test_resize_preserves_overlap_and_discards_the_rest() {
    let mut ctx = context(24, 80);
    let win = ctx.open(&[]).unwrap();
    win.put_str(5, 10, "keep");
    win.put_str(20, 70, "gone");

    let screen = ctx.screen_mut().unwrap();
    screen.physical_mut().put_str(2, 3, "seen");
    screen.physical_mut().put_str(22, 75, "lost");

    ctx.platform_mut().set_size(10, 40);
    ctx.resize(0, 0).unwrap();
    ctx.platform_mut().set_size(24, 80);
    ctx.resize(0, 0).unwrap();

    let screen = ctx.screen().unwrap();
    let drawable = screen.drawable();
    assert_eq!(drawable.size(), (24, 80));
    assert_eq!(&drawable.row_text(5).unwrap()[10..14], "keep");
    assert_eq!(&drawable.row_text(20).unwrap()[70..74], "    ");

    let physical = screen.physical();
    assert_eq!(physical.size(), (24, 80));
    assert!(physical.full_redraw);
    assert_eq!(&physical.row_text(2).unwrap()[3..7], "seen");
    assert_eq!(&physical.row_text(22).unwrap()[75..79], "    ");
}

#[test]
fn test_teardown_twice_is_harmless() {
    let mut ctx = context(24, 80);
    ctx.open(&[]).unwrap();
    let id = ctx.screen().unwrap().id();

    ctx.close().unwrap();
    ctx.teardown(id);
    ctx.teardown(id);
    assert!(ctx.screen().is_none());
    assert!(ctx.close().is_ok());
    assert!(matches!(ctx.resize(0, 0), Err(ScreenError::NotOpen)));

    // A fresh open starts clean
    let win = ctx.open(&[]).unwrap();
    assert_eq!(win.size(), (24, 80));
}

#[test]
fn test_top_ripoff_end_to_end() {
    let mut ctx = context(24, 80);
    ctx.ripoff_line(RipoffEdge::Top, |w, _| {
        w.put_str(0, 0, "title");
    })
    .unwrap();

    let win = ctx.open(&[]).unwrap();
    assert_eq!(win.origin(), (1, 0));
    assert_eq!(win.size(), (23, 80));

    ctx.platform_mut().set_size(30, 80);
    assert!(ctx.is_resized());
    ctx.resize(0, 0).unwrap();

    let screen = ctx.screen().unwrap();
    assert_eq!(screen.drawable().size(), (29, 80));
    assert_eq!(screen.drawable().origin(), (1, 0));
    let strip = &screen.ripped_lines()[0].window;
    assert_eq!(strip.begy, 0);
    assert!(strip.row_text(0).unwrap().starts_with("title"));
}

#[test]
fn test_independent_contexts() {
    let mut a = context(24, 80);
    let mut b = context(10, 20);
    a.open(&[]).unwrap();
    b.open(&[]).unwrap();

    a.platform_mut().set_size(30, 90);
    a.resize(0, 0).unwrap();
    assert_eq!(a.screen().unwrap().size(), (30, 90));
    assert_eq!(b.screen().unwrap().size(), (10, 20));
}

#[test]
fn test_shadow_forces_redraw_after_grow() {
    let mut ctx = context(24, 80);
    ctx.open(&[]).unwrap();

    ctx.platform_mut().set_size(40, 132);
    ctx.resize(0, 0).unwrap();

    let screen = ctx.screen().unwrap();
    assert_eq!(screen.shadow().size(), (40, 132));
    assert!(screen.shadow().cells().iter().all(|c| c.attrs.is_unset()));
    assert!(screen.physical().full_redraw);
}

#[test]
fn test_preserved_screen_redraws_after_resize() {
    let mut ctx = context(24, 80);
    ctx.set_preserve(true);
    ctx.open(&[]).unwrap();
    {
        let screen = ctx.screen().unwrap();
        assert!(!screen.physical().full_redraw);
        assert!(!screen.drawable().is_touched());
    }

    ctx.platform_mut().set_size(24, 100);
    ctx.resize(0, 0).unwrap();

    let screen = ctx.screen().unwrap();
    assert!(screen.preserve());
    assert!(screen.physical().full_redraw);
    assert!(screen.drawable().is_touched());
    assert!(screen.shadow().cells().iter().all(|c| c.attrs.is_unset()));
}
