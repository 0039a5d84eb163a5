use yuvist::{ColorConverter, ConversionStrategy};

fn main() {
    let converter = ColorConverter::default();
    compare(&converter, ConversionStrategy::IntegerScaled);
    compare(&converter, ConversionStrategy::FixedPointTable);
}

/// Converts every 8-bit YUV triple with `strategy` and reports its deviation
/// from the floating-point reference.
fn compare(converter: &ColorConverter, strategy: ConversionStrategy) {
    // deltas[channel][d] counts samples off by `d`
    let mut deltas = [[0u64; 256]; 3];

    for y in 0..=255u8 {
        for u in 0..=255u8 {
            for v in 0..=255u8 {
                let expected =
                    converter.convert_pixel_with(ConversionStrategy::FloatingPoint, y, u, v);
                let actual = converter.convert_pixel_with(strategy, y, u, v);
                for (c, (e, a)) in expected.iter().zip(&actual).enumerate() {
                    deltas[c][usize::from(e.abs_diff(*a))] += 1;
                }
            }
        }
    }

    println!("{strategy} vs float:");
    for (label, counts) in ["R", "G", "B"].iter().zip(&deltas) {
        let max = counts.iter().rposition(|&n| n > 0).unwrap_or(0);
        let off: u64 = counts[1..].iter().sum();
        println!("  {label}: max delta {max}, {off} of {} samples differ", 1u64 << 24);
    }
}
