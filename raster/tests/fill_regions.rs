use raster::{flood_fill, FillOutcome, RasterBuffer, Rgba};

fn count(buffer: &RasterBuffer, color: Rgba) -> usize {
    buffer.snapshot().pixels().filter(|p| *p == color).count()
}

#[test]
fn fill_recolors_exactly_the_component() {
    let mut buffer = RasterBuffer::blank(40, 20);
    // vertical wall splits the buffer into two components
    buffer.fill_rect(15, 0, 16, 20, Rgba::BLACK);

    let outcome = flood_fill(&mut buffer, 2, 2, Rgba::RED);

    assert_eq!(outcome, FillOutcome::Filled { pixels: 15 * 20 });
    assert_eq!(count(&buffer, Rgba::RED), 15 * 20);
    assert_eq!(count(&buffer, Rgba::BLACK), 20);
    assert_eq!(count(&buffer, Rgba::WHITE), 24 * 20);
}

#[test]
fn diagonal_gaps_do_not_leak() {
    let mut buffer = RasterBuffer::blank(5, 5);
    // staircase of black pixels; the two white halves only touch diagonally
    for i in 0..5 {
        buffer.set_pixel(i, 4 - i, Rgba::BLACK);
    }

    let outcome = flood_fill(&mut buffer, 0, 0, Rgba::RED);

    assert_eq!(outcome.pixels(), 10);
    assert_eq!(buffer.get_pixel(4, 4), Some(Rgba::WHITE));
}

#[test]
fn refilling_is_a_noop() {
    let mut buffer = RasterBuffer::blank(10, 10);
    assert!(flood_fill(&mut buffer, 5, 5, Rgba::BLACK).changed());
    let before = buffer.clone();
    assert_eq!(
        flood_fill(&mut buffer, 5, 5, Rgba::BLACK),
        FillOutcome::Unchanged
    );
    assert_eq!(buffer, before);
}

#[test]
fn fill_over_previous_fill_changes_color() {
    let mut buffer = RasterBuffer::blank(10, 10);
    flood_fill(&mut buffer, 0, 0, Rgba::BLACK);
    let outcome = flood_fill(&mut buffer, 9, 9, Rgba::RED);
    assert_eq!(outcome, FillOutcome::Filled { pixels: 100 });
    assert_eq!(count(&buffer, Rgba::RED), 100);
}
