use protocol::{parse_request, Limits, Request};
use raster::{RasterBuffer, Rgba};

fn apply_all(buffer: &mut RasterBuffer, frames: &[&str]) -> usize {
    let limits = Limits::default();
    let mut applied = 0;
    for frame in frames {
        if let Ok(Request::Mutate(mutation)) = parse_request(frame, &limits) {
            if mutation.apply(buffer) {
                applied += 1;
            }
        }
    }
    applied
}

const SESSION: &[&str] = &[
    r##"{"type":"draw","points":[{"x":10,"y":10},{"x":120,"y":80}],"color":"#000000","brushSize":5}"##,
    r##"{"type":"draw","points":[{"x":50.5,"y":200.25}],"color":"#ff0000","brushSize":10}"##,
    r##"{"type":"fill","x":700,"y":400,"color":"#ff0000"}"##,
    r##"{"type":"draw","points":[{"x":0,"y":0},{"x":799,"y":479}],"color":"#ffffff","brushSize":2}"##,
    r##"{"type":"fill","x":5,"y":470,"color":"#000000"}"##,
];

#[test]
fn independent_replicas_converge() {
    let mut server = RasterBuffer::canvas();
    let mut client = RasterBuffer::canvas();

    apply_all(&mut server, SESSION);
    apply_all(&mut client, SESSION);

    assert_eq!(server, client);
}

#[test]
fn clear_resets_to_white() {
    let mut buffer = RasterBuffer::canvas();
    apply_all(&mut buffer, SESSION);
    apply_all(&mut buffer, &[r#"{"type":"clear"}"#]);
    assert_eq!(buffer, RasterBuffer::canvas());
}

#[test]
fn off_palette_actions_do_not_mutate() {
    let mut buffer = RasterBuffer::canvas();
    let applied = apply_all(
        &mut buffer,
        &[
            r##"{"type":"draw","points":[{"x":10,"y":10}],"color":"#00ff00","brushSize":5}"##,
            r##"{"type":"draw","points":[{"x":10,"y":10}],"color":"#000000","brushSize":4}"##,
            r##"{"type":"fill","x":10,"y":10,"color":"#0000ff"}"##,
        ],
    );
    assert_eq!(applied, 0);
    assert_eq!(buffer, RasterBuffer::canvas());
}

#[test]
fn two_by_two_stamp_from_repeated_point() {
    let mut buffer = RasterBuffer::canvas();
    apply_all(
        &mut buffer,
        &[r##"{"type":"draw","points":[{"x":10,"y":10},{"x":10,"y":10}],"color":"#000000","brushSize":2}"##],
    );

    let black: Vec<(u32, u32)> = buffer
        .snapshot()
        .pixels()
        .enumerate()
        .filter(|(_, p)| *p == Rgba::BLACK)
        .map(|(i, _)| (i as u32 % 800, i as u32 / 800))
        .collect();
    assert_eq!(black, vec![(9, 9), (10, 9), (9, 10), (10, 10)]);
}

#[test]
fn fill_red_on_blank_covers_everything() {
    let mut buffer = RasterBuffer::canvas();
    let applied = apply_all(
        &mut buffer,
        &[r##"{"type":"fill","x":400,"y":240,"color":"#ff0000"}"##],
    );
    assert_eq!(applied, 1);
    assert!(buffer.snapshot().pixels().all(|p| p == Rgba::RED));
}

#[test]
fn repeated_fill_is_not_a_change() {
    let mut buffer = RasterBuffer::canvas();
    let frame = r##"{"type":"fill","x":400,"y":240,"color":"#ffffff"}"##;
    assert_eq!(apply_all(&mut buffer, &[frame, frame]), 0);
}
