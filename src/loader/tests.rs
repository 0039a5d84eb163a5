use std::io::Cursor;
use std::thread;

use rand::Rng;

use super::*;
use crate::{ChromaFormat, FrameGeometry};

const FRAME: FrameConfig = FrameConfig {
    width: 4,
    height: 4,
    chroma: ChromaFormat::Yuv420,
};

/// `count` frames whose every byte of frame `i` is `i`.
fn numbered_frames(count: u8) -> Vec<u8> {
    let frame_size = FrameGeometry::new(FRAME).unwrap().frame_size();
    (0..count)
        .flat_map(|i| std::iter::repeat(i).take(frame_size))
        .collect()
}

fn loader(count: u8, fps: f64, output: OutputFormat) -> Loader<Cursor<Vec<u8>>> {
    let config = LoaderConfig {
        frame: FRAME,
        output,
        fps,
        ..LoaderConfig::default()
    };
    Loader::from_reader(Cursor::new(numbered_frames(count)), config).unwrap()
}

fn taken_index(loader: &Loader<Cursor<Vec<u8>>>) -> Option<u64> {
    loader.take_frame().map(|f| f.index())
}

#[test]
fn open_publishes_first_frame() {
    let loader = loader(10, 10.0, OutputFormat::Luminance);
    assert_eq!(loader.state(), PlaybackState::Stopped);
    assert!(!loader.eos());
    assert!((loader.duration() - 1.0).abs() < f64::EPSILON);

    let Some(DecodedFrame::Planar(frame)) = loader.take_frame() else {
        panic!("expected a planar frame");
    };
    assert_eq!(frame.index(), 0);
    assert!(frame.y().iter().all(|&b| b == 0));
    assert!(loader.take_frame().is_none());
}

#[test]
fn rgb_output_matches_converter() {
    let mut rng = rand::thread_rng();
    let raw: Vec<u8> = (0..24 * 2).map(|_| rng.gen()).collect();
    let config = LoaderConfig {
        frame: FRAME,
        output: OutputFormat::Rgb,
        strategy: ConversionStrategy::IntegerScaled,
        fps: 25.0,
    };
    let loader = Loader::from_reader(Cursor::new(raw.clone()), config).unwrap();

    let Some(DecodedFrame::Rgb {
        index,
        width,
        height,
        data,
    }) = loader.take_frame()
    else {
        panic!("expected an rgb frame");
    };
    assert_eq!((index, width, height), (0, 4, 4));

    let geometry = FrameGeometry::new(FRAME).unwrap();
    let expected = ColorConverter::new(ConversionStrategy::IntegerScaled)
        .convert_raster(&raw[..16], &raw[16..20], &raw[20..24], &geometry)
        .unwrap();
    assert_eq!(data, expected);
}

#[test]
fn tick_advances_only_while_playing() {
    let mut loader = loader(30, 30.0, OutputFormat::Luminance);
    assert_eq!(taken_index(&loader), Some(0));

    loader.tick().unwrap();
    assert_eq!(taken_index(&loader), None);

    loader.play();
    for expected in 1..30 {
        loader.tick().unwrap();
        assert_eq!(taken_index(&loader), Some(expected));
    }

    loader.pause();
    loader.tick().unwrap();
    assert_eq!(taken_index(&loader), None);
    assert_eq!(loader.state(), PlaybackState::Paused);
}

#[test]
fn untaken_frame_is_kept_over_newer_ones() {
    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    loader.play();
    loader.tick().unwrap();
    loader.tick().unwrap();
    loader.tick().unwrap();

    // Frame 0 from open was never taken.
    assert_eq!(taken_index(&loader), Some(0));
    loader.tick().unwrap();
    assert_eq!(taken_index(&loader), Some(4));
}

#[test]
fn playing_past_the_end_pauses() {
    let mut loader = loader(3, 10.0, OutputFormat::Luminance);
    loader.take_frame();
    loader.play();
    loader.tick().unwrap();
    assert_eq!(taken_index(&loader), Some(1));
    loader.tick().unwrap();
    assert_eq!(taken_index(&loader), Some(2));
    assert!(!loader.eos());

    loader.tick().unwrap();
    assert!(loader.eos());
    assert_eq!(loader.state(), PlaybackState::Paused);
    assert!((loader.position() - loader.duration()).abs() < f64::EPSILON);
    assert!(loader.source().is_eos());
    assert_eq!(taken_index(&loader), None);
}

#[test]
fn leaving_end_of_stream_republishes_frame() {
    let mut loader = loader(4, 10.0, OutputFormat::Luminance);
    loader.take_frame();

    loader.set_position(0.25).unwrap();
    assert_eq!(taken_index(&loader), Some(2));
    loader.set_position(5.0).unwrap();
    assert!(loader.eos());
    assert!(loader.source().is_eos());

    loader.set_position(0.25).unwrap();
    assert!(!loader.eos());
    assert!(!loader.source().is_eos());
    assert_eq!(taken_index(&loader), Some(2));
}

#[test]
fn seek_by_percent() {
    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    loader.take_frame();

    loader.seek(0.5).unwrap();
    assert!((loader.position() - 0.5).abs() < f64::EPSILON);
    assert_eq!(taken_index(&loader), Some(5));

    loader.seek(1.0).unwrap();
    assert!(loader.eos());

    loader.seek(0.25).unwrap();
    assert!(!loader.eos());
    assert_eq!(taken_index(&loader), Some(2));
}

#[test]
fn negative_position_rewinds() {
    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    loader.set_position(0.75).unwrap();
    loader.take_frame();

    loader.set_position(-3.0).unwrap();
    assert!(loader.position().abs() < f64::EPSILON);
    assert!(!loader.eos());
    assert_eq!(taken_index(&loader), Some(0));
}

#[test]
fn same_frame_is_not_decoded_twice() {
    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    loader.take_frame();
    loader.set_position(0.31).unwrap();
    assert_eq!(taken_index(&loader), Some(3));
    loader.set_position(0.35).unwrap();
    assert_eq!(taken_index(&loader), None);
}

#[test]
fn stop_rewinds_to_first_frame() {
    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    loader.play();
    loader.tick().unwrap();
    loader.tick().unwrap();
    loader.take_frame();

    loader.stop().unwrap();
    assert_eq!(loader.state(), PlaybackState::Stopped);
    assert!(loader.position().abs() < f64::EPSILON);
    assert_eq!(taken_index(&loader), Some(0));
}

#[test]
fn empty_stream_is_eos_at_open() {
    let loader = loader(0, 30.0, OutputFormat::Luminance);
    assert!(loader.eos());
    assert!(loader.duration().abs() < f64::EPSILON);
    assert!(loader.take_frame().is_none());
}

#[test]
fn frame_rate_is_validated() {
    for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let config = LoaderConfig {
            frame: FRAME,
            fps,
            ..LoaderConfig::default()
        };
        let result = Loader::from_reader(Cursor::new(numbered_frames(2)), config);
        assert!(matches!(result, Err(YuvError::InvalidFrameRate(_))));
    }

    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    assert!(matches!(
        loader.set_fps(0.0),
        Err(YuvError::InvalidFrameRate(_))
    ));
    assert!((loader.fps() - 10.0).abs() < f64::EPSILON);
}

#[test]
fn set_fps_recomputes_duration() {
    let mut loader = loader(10, 10.0, OutputFormat::Luminance);
    loader.set_position(0.9).unwrap();
    loader.set_fps(20.0).unwrap();
    assert!((loader.duration() - 0.5).abs() < f64::EPSILON);
    assert!((loader.position() - 0.5).abs() < f64::EPSILON);
    assert!(loader.eos());

    loader.set_fps(5.0).unwrap();
    loader.take_frame();
    loader.set_position(0.9).unwrap();
    assert!(!loader.eos());
    assert_eq!(taken_index(&loader), Some(4));
}

#[test]
fn consumer_on_another_thread() {
    let mut loader = loader(20, 20.0, OutputFormat::Luminance);
    let slot = loader.slot();
    let consumer = thread::spawn(move || {
        let mut seen = Vec::new();
        while seen.last() != Some(&19) {
            if let Some(frame) = slot.take() {
                seen.push(frame.index());
            } else {
                thread::yield_now();
            }
        }
        seen
    });

    loader.play();
    while !loader.eos() {
        // Let the consumer drain each frame before the next tick.
        while !loader.slot().is_empty() {
            thread::yield_now();
        }
        loader.tick().unwrap();
    }

    let seen = consumer.join().unwrap();
    assert_eq!(seen, (0..20).collect::<Vec<_>>());
}

#[test]
fn plane_sizes_follow_output() {
    let planar = loader(1, 30.0, OutputFormat::Luminance);
    let frame = planar.take_frame().unwrap();
    assert_eq!(frame.plane_sizes(), [(4, 4), (2, 2), (2, 2)]);

    let rgb = loader(1, 30.0, OutputFormat::Rgb);
    let frame = rgb.take_frame().unwrap();
    assert_eq!(frame.plane_sizes(), [(4, 4), (0, 0), (0, 0)]);
}

#[test]
fn output_format_parsing() {
    assert_eq!("rgb".parse::<OutputFormat>().unwrap(), OutputFormat::Rgb);
    assert_eq!(
        "luminance".parse::<OutputFormat>().unwrap(),
        OutputFormat::Luminance
    );
    assert!(matches!(
        "rgba".parse::<OutputFormat>(),
        Err(YuvError::UnsupportedOutputFormat(f)) if f == "rgba"
    ));
    assert_eq!(OutputFormat::Rgb.to_string(), "rgb");
}
